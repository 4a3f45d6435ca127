//! Rate source abstractions

use crate::core::error::{FxError, Result};
use crate::core::rate_set::RateSet;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

/// What a resolver hands a source for one query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceOptions {
    /// Local snapshot to read instead of fetching, when it exists.
    pub cache_path: Option<PathBuf>,
    pub permissive: bool,
}

#[async_trait]
pub trait RateSource: Send + Sync {
    async fn fetch_rate_set(&self, options: &SourceOptions) -> Result<RateSet>;
}

/// Source keys are matched case-insensitively.
pub fn normalize_key(key: &str) -> String {
    key.trim().to_ascii_lowercase()
}

/// Maps source keys to the sources that serve them.
#[derive(Default, Clone)]
pub struct SourceRegistry {
    sources: HashMap<String, Arc<dyn RateSource>>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, key: &str, source: Arc<dyn RateSource>) -> &mut Self {
        self.sources.insert(normalize_key(key), source);
        self
    }

    pub fn resolve(&self, key: &str) -> Result<Arc<dyn RateSource>> {
        self.sources
            .get(&normalize_key(key))
            .cloned()
            .ok_or_else(|| FxError::UnknownSourceProvider(key.to_string()))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.sources.contains_key(&normalize_key(key))
    }
}

impl std::fmt::Debug for SourceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceRegistry")
            .field("keys", &self.sources.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EmptySource;

    #[async_trait]
    impl RateSource for EmptySource {
        async fn fetch_rate_set(&self, _options: &SourceOptions) -> Result<RateSet> {
            Ok(RateSet::new())
        }
    }

    #[tokio::test]
    async fn test_registry_resolves_registered_key() {
        let mut registry = SourceRegistry::new();
        registry.register("ECB", Arc::new(EmptySource));

        assert!(registry.contains("ecb"));
        let source = registry.resolve("Ecb").unwrap();
        let set = source
            .fetch_rate_set(&SourceOptions::default())
            .await
            .unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn test_registry_rejects_unknown_key() {
        let registry = SourceRegistry::new();
        let err = registry.resolve("boe").err().unwrap();
        assert_eq!(err, FxError::UnknownSourceProvider("boe".to_string()));
    }
}
