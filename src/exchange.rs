//! Exchange configuration and rate resolution

use crate::config::{AppConfig, ExchangeDefaults};
use crate::core::currency::TransactionDate;
use crate::core::error::{FxError, Result};
use crate::core::source::{SourceOptions, SourceRegistry, normalize_key};
use crate::providers::default_registry;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// Settings one exchange resolves with. The source key is checked against the
/// known keys on every assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct ExchangeConfiguration {
    defaults: ExchangeDefaults,
    source: String,
    cache_path: Option<PathBuf>,
    permissive: bool,
}

impl ExchangeConfiguration {
    pub fn new(defaults: &ExchangeDefaults) -> Self {
        Self {
            defaults: defaults.clone(),
            source: normalize_key(&defaults.default_source),
            cache_path: defaults.default_store_path.clone(),
            permissive: defaults.default_permissive,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn cache_path(&self) -> Option<&Path> {
        self.cache_path.as_deref()
    }

    pub fn permissive(&self) -> bool {
        self.permissive
    }

    pub fn set_source(&mut self, key: &str) -> Result<()> {
        let normalized = normalize_key(key);
        if !self
            .defaults
            .valid_sources
            .iter()
            .any(|valid| normalize_key(valid) == normalized)
        {
            return Err(FxError::InvalidSourceKey {
                key: key.to_string(),
                valid: self.defaults.valid_sources.clone(),
            });
        }
        self.source = normalized;
        Ok(())
    }

    pub fn set_cache_path<P: Into<PathBuf>>(&mut self, path: P) {
        self.cache_path = Some(path.into());
    }

    pub fn clear_cache_path(&mut self) {
        self.cache_path = None;
    }

    pub fn set_permissive(&mut self, permissive: bool) {
        self.permissive = permissive;
    }

    pub fn reset(&mut self) {
        *self = Self::new(&self.defaults);
    }

    pub fn source_options(&self) -> SourceOptions {
        SourceOptions {
            cache_path: self.cache_path.clone(),
            permissive: self.permissive,
        }
    }
}

/// Overrides applied on top of the defaults when building an exchange.
#[derive(Debug, Clone, Default)]
pub struct ExchangeOptions {
    pub source: Option<String>,
    pub store: Option<PathBuf>,
    pub permissive: Option<bool>,
}

/// Resolves the rate between two currencies on a date.
///
/// Every call asks the configured source for a fresh rate set; wrap a source
/// in [`crate::providers::caching::CachingRateSource`] to reuse one.
#[derive(Debug)]
pub struct Exchange {
    configuration: ExchangeConfiguration,
    registry: SourceRegistry,
}

impl Exchange {
    pub fn new(config: &AppConfig) -> Self {
        Self::with_registry(config, default_registry(config))
    }

    pub fn with_registry(config: &AppConfig, registry: SourceRegistry) -> Self {
        Self {
            configuration: ExchangeConfiguration::new(&config.exchange),
            registry,
        }
    }

    pub fn with_options(config: &AppConfig, options: ExchangeOptions) -> Result<Self> {
        let mut exchange = Self::new(config);
        exchange.apply(options)?;
        Ok(exchange)
    }

    pub fn apply(&mut self, options: ExchangeOptions) -> Result<&mut Self> {
        self.configure(|config| {
            if let Some(source) = &options.source {
                config.set_source(source)?;
            }
            if let Some(store) = options.store {
                config.set_cache_path(store);
            }
            if let Some(permissive) = options.permissive {
                config.set_permissive(permissive);
            }
            Ok(())
        })
    }

    /// Runs a batch of configuration changes. The batch applies as a whole:
    /// when `f` fails, none of its changes are kept.
    pub fn configure<F>(&mut self, f: F) -> Result<&mut Self>
    where
        F: FnOnce(&mut ExchangeConfiguration) -> Result<()>,
    {
        let mut staged = self.configuration.clone();
        f(&mut staged)?;
        self.configuration = staged;
        Ok(self)
    }

    pub fn configuration(&self) -> &ExchangeConfiguration {
        &self.configuration
    }

    pub fn configuration_mut(&mut self) -> &mut ExchangeConfiguration {
        &mut self.configuration
    }

    pub fn reset(&mut self) {
        self.configuration.reset();
    }

    /// Units of `counter` per one unit of `base` on `date`, at full precision.
    #[instrument(
        name = "RateAtDate",
        skip(self, date),
        fields(source = %self.configuration.source)
    )]
    pub async fn rate_at_date(
        &self,
        date: impl Into<TransactionDate> + Send,
        base: &str,
        counter: &str,
    ) -> Result<Decimal> {
        let date = date.into();
        let source = self.registry.resolve(&self.configuration.source)?;
        let options = self.configuration.source_options();

        let rate_set = source.fetch_rate_set(&options).await?;
        let pair = rate_set.resolve_pair(&date, base, counter, options.permissive)?;

        let not_found = |code: &str| FxError::CurrencyNotFound {
            code: code.to_string(),
            date: pair.date,
        };
        let counter_rate = pair.counter.ok_or_else(|| not_found(counter))?.rate();
        let base_rate = pair.base.ok_or_else(|| not_found(base))?.rate();

        if base_rate.is_zero() {
            return Err(FxError::ZeroRate {
                code: base.to_string(),
                date: pair.date,
            });
        }
        let rate = counter_rate
            .checked_div(base_rate)
            .ok_or_else(|| FxError::RateOverflow {
                base: base.to_string(),
                counter: counter.to_string(),
                date: pair.date,
            })?;
        debug!(%date, on = %pair.date, %rate, "Resolved rate");
        Ok(rate)
    }

    /// Same as [`Exchange::rate_at_date`], narrowed to a float.
    pub async fn convert_at_date(
        &self,
        date: impl Into<TransactionDate> + Send,
        base: &str,
        counter: &str,
    ) -> Result<f64> {
        let rate = self.rate_at_date(date, base, counter).await?;
        rate.to_f64().ok_or(FxError::NotRepresentable(rate))
    }
}
