use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

/// Overrides the default snapshot read by the exchange.
pub const DATA_PATH_ENV: &str = "FXRATE_DATA_PATH";
/// Overrides the directory snapshots are downloaded into.
pub const DATA_DIRECTORY_ENV: &str = "FXRATE_DATA_DIRECTORY";

pub const DEFAULT_ECB_URL: &str =
    "https://www.ecb.europa.eu/stats/eurofxref/eurofxref-hist-90d.xml";

fn default_source() -> String {
    "ecb".to_string()
}

fn default_permissive() -> bool {
    true
}

fn default_valid_sources() -> Vec<String> {
    vec![default_source()]
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ExchangeDefaults {
    #[serde(default = "default_source")]
    pub default_source: String,
    #[serde(default)]
    pub default_store_path: Option<PathBuf>,
    #[serde(default = "default_permissive")]
    pub default_permissive: bool,
    #[serde(default = "default_valid_sources")]
    pub valid_sources: Vec<String>,
}

impl Default for ExchangeDefaults {
    fn default() -> Self {
        ExchangeDefaults {
            default_source: default_source(),
            default_store_path: None,
            default_permissive: default_permissive(),
            valid_sources: default_valid_sources(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct EcbSourceConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SourcesConfig {
    pub ecb: Option<EcbSourceConfig>,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        SourcesConfig {
            ecb: Some(EcbSourceConfig {
                url: DEFAULT_ECB_URL.to_string(),
            }),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct FetcherConfig {
    pub data_directory: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub exchange: ExchangeDefaults,
    #[serde(default)]
    pub sources: SourcesConfig,
    #[serde(default)]
    pub fetcher: FetcherConfig,
}

impl AppConfig {
    /// Loads settings for an entry point: the given file, or the default file
    /// when present, then environment overrides on top.
    pub fn resolve(config_path: Option<&str>) -> Result<Self> {
        let config = match config_path {
            Some(path) => Self::load_from_path(path)?,
            None => Self::load()?,
        };
        Ok(config.with_overrides(
            std::env::var(DATA_PATH_ENV).ok(),
            std::env::var(DATA_DIRECTORY_ENV).ok(),
        ))
    }

    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!("No config at {}, using defaults", config_path.display());
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("org", "fxrate", "fxrate")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    /// Applies the snapshot path and download directory overrides. Empty values
    /// are ignored.
    pub fn with_overrides(
        mut self,
        data_path: Option<String>,
        data_directory: Option<String>,
    ) -> Self {
        if let Some(path) = data_path.filter(|p| !p.trim().is_empty()) {
            debug!(%path, "Overriding default store path");
            self.exchange.default_store_path = Some(PathBuf::from(path));
        }
        if let Some(dir) = data_directory.filter(|d| !d.trim().is_empty()) {
            debug!(%dir, "Overriding fetcher data directory");
            self.fetcher.data_directory = Some(PathBuf::from(dir));
        }
        self
    }

    pub fn ecb_url(&self) -> &str {
        self.sources
            .ecb
            .as_ref()
            .map_or(DEFAULT_ECB_URL, |ecb| &ecb.url)
    }

    /// Where downloaded snapshots go, falling back to the working directory.
    pub fn data_directory(&self) -> Result<PathBuf> {
        match &self.fetcher.data_directory {
            Some(dir) => Ok(dir.clone()),
            None => std::env::current_dir().context("Could not determine working directory"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
exchange:
  default_source: ecb
  default_store_path: /tmp/rates/2017-07-21.xml
  default_permissive: false
  valid_sources: [ecb, boe]
sources:
  ecb:
    url: "http://example.com/ecb.xml"
fetcher:
  data_directory: /tmp/rates
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.exchange.default_source, "ecb");
        assert_eq!(
            config.exchange.default_store_path,
            Some(PathBuf::from("/tmp/rates/2017-07-21.xml"))
        );
        assert!(!config.exchange.default_permissive);
        assert_eq!(config.exchange.valid_sources, vec!["ecb", "boe"]);
        assert_eq!(config.ecb_url(), "http://example.com/ecb.xml");
        assert_eq!(
            config.data_directory().unwrap(),
            PathBuf::from("/tmp/rates")
        );
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config: AppConfig = serde_yaml::from_str("exchange:\n  default_permissive: false\n")
            .expect("Failed to deserialize");
        assert_eq!(config.exchange.default_source, "ecb");
        assert!(config.exchange.default_store_path.is_none());
        assert!(!config.exchange.default_permissive);
        assert_eq!(config.exchange.valid_sources, vec!["ecb"]);
        assert_eq!(config.ecb_url(), DEFAULT_ECB_URL);
        assert!(config.fetcher.data_directory.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::default().with_overrides(
            Some("/data/2017-07-21.xml".to_string()),
            Some("".to_string()),
        );
        assert_eq!(
            config.exchange.default_store_path,
            Some(PathBuf::from("/data/2017-07-21.xml"))
        );
        assert!(config.fetcher.data_directory.is_none());
    }

    #[test]
    fn test_load_from_missing_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = AppConfig::load_from_path(dir.path().join("missing.yaml"));
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to read config file")
        );
    }
}
