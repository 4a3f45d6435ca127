use crate::config::AppConfig;
use crate::core::error::FxError;
use crate::core::source::normalize_key;
use crate::fetcher::{FetchOutcome, SnapshotFetcher};
use crate::providers::ecb;
use anyhow::Result;

/// Downloads a fresh snapshot for `source` into the configured data directory.
pub async fn fetch(config: &AppConfig, source: &str) -> Result<FetchOutcome> {
    let fetcher = match normalize_key(source).as_str() {
        ecb::SOURCE_KEY => SnapshotFetcher::new(config.ecb_url(), config.data_directory()?),
        _ => {
            return Err(FxError::InvalidSourceKey {
                key: source.to_string(),
                valid: config.exchange.valid_sources.clone(),
            }
            .into());
        }
    };

    fetcher.download().await
}
