use crate::core::error::Result;
use crate::core::rate_set::RateSet;
use crate::core::source::{RateSource, SourceOptions};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};
use tracing::debug;

/// Keeps the first rate set fetched for each snapshot path, so that repeated
/// conversions reuse one fetch. Concurrent callers for the same path wait on a
/// single fetch; failures are not kept.
pub struct CachingRateSource<T: RateSource> {
    inner: T,
    cache: Mutex<HashMap<Option<PathBuf>, Arc<OnceCell<RateSet>>>>,
}

impl<T: RateSource> CachingRateSource<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            cache: Mutex::new(HashMap::new()),
        }
    }

    async fn cell_for(&self, key: &Option<PathBuf>) -> Arc<OnceCell<RateSet>> {
        let mut cache = self.cache.lock().await;
        Arc::clone(cache.entry(key.clone()).or_default())
    }
}

#[async_trait]
impl<T: RateSource> RateSource for CachingRateSource<T> {
    async fn fetch_rate_set(&self, options: &SourceOptions) -> Result<RateSet> {
        let cell = self.cell_for(&options.cache_path).await;
        if let Some(cached) = cell.get() {
            debug!("Cache hit for rate set: {:?}", options.cache_path);
            return Ok(cached.clone());
        }

        let rate_set = cell
            .get_or_try_init(|| async {
                debug!("Cache miss for rate set: {:?}", options.cache_path);
                self.inner.fetch_rate_set(options).await
            })
            .await?;
        Ok(rate_set.clone())
    }
}
