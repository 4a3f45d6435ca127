pub mod caching;
pub mod ecb;

use crate::config::AppConfig;
use crate::core::source::SourceRegistry;
use std::sync::Arc;

/// Registry holding every source this build knows how to serve.
pub fn default_registry(config: &AppConfig) -> SourceRegistry {
    let mut registry = SourceRegistry::new();
    registry.register(
        ecb::SOURCE_KEY,
        Arc::new(ecb::EcbSource::new(config.ecb_url())),
    );
    registry
}
