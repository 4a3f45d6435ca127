use crate::config::AppConfig;
use crate::exchange::{Exchange, ExchangeOptions};
use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::debug;

/// A single conversion requested from the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertRequest {
    pub date: String,
    pub base: String,
    pub counter: String,
    pub source: Option<String>,
    pub store: Option<PathBuf>,
    /// Fail instead of falling back when the date is missing.
    pub strict: bool,
}

impl ConvertRequest {
    fn exchange_options(&self) -> ExchangeOptions {
        ExchangeOptions {
            source: self.source.clone(),
            store: self.store.clone(),
            permissive: self.strict.then_some(false),
        }
    }
}

pub async fn convert(config: &AppConfig, request: &ConvertRequest) -> Result<f64> {
    let exchange = Exchange::with_options(config, request.exchange_options())?;
    debug!(configuration = ?exchange.configuration(), "Exchange configured");

    exchange
        .convert_at_date(request.date.as_str(), &request.base, &request.counter)
        .await
        .with_context(|| {
            format!(
                "Failed to convert {} to {} on {}",
                request.base, request.counter, request.date
            )
        })
}
