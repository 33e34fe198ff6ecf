//! Configuration Loader
//!
//! Loads and validates configuration from TOML files matching config.toml
//! structure. Every section is optional; the defaults reproduce the standard
//! repository layout, so the tool also runs with no config file at all.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::domain::support::parse_version;

/// Main configuration structure matching config.toml
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsSection,
    #[serde(default)]
    pub firmware: FirmwareSection,
    #[serde(default)]
    pub marketcap: MarketcapSection,
}

/// Input and output file locations
#[derive(Debug, Clone, Deserialize)]
pub struct PathsSection {
    /// The merged details document (read and rewritten in place)
    #[serde(default = "default_details_file")]
    pub details_file: String,

    /// On-disk market snapshot cache
    #[serde(default = "default_marketcap_cache")]
    pub marketcap_cache: String,

    /// Curated coin definitions, one JSON object keyed by shortcut
    #[serde(default = "default_coin_definitions")]
    pub coin_definitions: String,

    /// Firmware support manifest
    #[serde(default = "default_support_manifest")]
    pub support_manifest: String,

    /// ERC20 token definition tree, one directory per chain
    #[serde(default = "default_eth_tokens_dir")]
    pub eth_tokens_dir: String,

    /// NEM mosaic definitions
    #[serde(default = "default_mosaics_file")]
    pub mosaics_file: String,
}

fn default_details_file() -> String {
    "coins_details.json".to_string()
}

fn default_marketcap_cache() -> String {
    "coinmarketcap.json".to_string()
}

fn default_coin_definitions() -> String {
    "defs/coins.json".to_string()
}

fn default_support_manifest() -> String {
    "defs/support.json".to_string()
}

fn default_eth_tokens_dir() -> String {
    "defs/ethereum/tokens".to_string()
}

fn default_mosaics_file() -> String {
    "defs/nem_mosaics.json".to_string()
}

impl Default for PathsSection {
    fn default() -> Self {
        Self {
            details_file: default_details_file(),
            marketcap_cache: default_marketcap_cache(),
            coin_definitions: default_coin_definitions(),
            support_manifest: default_support_manifest(),
            eth_tokens_dir: default_eth_tokens_dir(),
            mosaics_file: default_mosaics_file(),
        }
    }
}

impl PathsSection {
    pub fn details_path(&self) -> PathBuf {
        expand(&self.details_file)
    }

    pub fn marketcap_cache_path(&self) -> PathBuf {
        expand(&self.marketcap_cache)
    }

    pub fn coin_definitions_path(&self) -> PathBuf {
        expand(&self.coin_definitions)
    }

    pub fn support_manifest_path(&self) -> PathBuf {
        expand(&self.support_manifest)
    }

    pub fn eth_tokens_path(&self) -> PathBuf {
        expand(&self.eth_tokens_dir)
    }

    pub fn mosaics_path(&self) -> PathBuf {
        expand(&self.mosaics_file)
    }
}

fn expand(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).into_owned())
}

/// Latest released firmware versions, per device generation
#[derive(Debug, Clone, Deserialize)]
pub struct FirmwareSection {
    #[serde(default = "default_t1_latest")]
    pub t1_latest: String,

    #[serde(default = "default_t2_latest")]
    pub t2_latest: String,
}

fn default_t1_latest() -> String {
    "1.6.2".to_string()
}

fn default_t2_latest() -> String {
    "2.0.7".to_string()
}

impl Default for FirmwareSection {
    fn default() -> Self {
        Self {
            t1_latest: default_t1_latest(),
            t2_latest: default_t2_latest(),
        }
    }
}

/// Market data provider settings
#[derive(Debug, Clone, Deserialize)]
pub struct MarketcapSection {
    /// Ticker API base URL
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Entries per ticker page (the provider caps this at 100)
    #[serde(default = "default_page_limit")]
    pub page_limit: u64,

    /// Pause between ticker pages, in milliseconds
    #[serde(default = "default_page_pause_ms")]
    pub page_pause_ms: u64,

    /// Snapshot age before a refetch, in seconds
    #[serde(default = "default_cache_max_age_secs")]
    pub cache_max_age_secs: u64,

    /// HTTP timeout, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_api_url() -> String {
    "https://api.coinmarketcap.com/v2".to_string()
}

fn default_page_limit() -> u64 {
    100
}

fn default_page_pause_ms() -> u64 {
    1000
}

fn default_cache_max_age_secs() -> u64 {
    3600
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for MarketcapSection {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            page_limit: default_page_limit(),
            page_pause_ms: default_page_pause_ms(),
            cache_max_age_secs: default_cache_max_age_secs(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl MarketcapSection {
    /// Get API URL with environment variable override
    /// Checks COINDEX_API_URL env var first, falls back to config value
    pub fn get_api_url(&self) -> String {
        std::env::var("COINDEX_API_URL").unwrap_or_else(|_| self.api_url.clone())
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Load configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// Load configuration, falling back to the defaults when the file is absent
pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    if !path.exists() {
        tracing::info!("{}: no config file, using defaults", path.display());
        let config = Config::default();
        config.validate()?;
        return Ok(config);
    }
    load_config(path)
}

impl Config {
    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Validate paths section
        let paths = [
            ("details_file", &self.paths.details_file),
            ("marketcap_cache", &self.paths.marketcap_cache),
            ("coin_definitions", &self.paths.coin_definitions),
            ("support_manifest", &self.paths.support_manifest),
            ("eth_tokens_dir", &self.paths.eth_tokens_dir),
            ("mosaics_file", &self.paths.mosaics_file),
        ];
        for (name, value) in paths {
            if value.is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "{} cannot be empty",
                    name
                )));
            }
        }

        // Validate firmware section
        parse_version(&self.firmware.t1_latest).map_err(|_| {
            ConfigError::ValidationError(format!(
                "t1_latest is not a version: {}",
                self.firmware.t1_latest
            ))
        })?;
        parse_version(&self.firmware.t2_latest).map_err(|_| {
            ConfigError::ValidationError(format!(
                "t2_latest is not a version: {}",
                self.firmware.t2_latest
            ))
        })?;

        // Validate marketcap section
        if self.marketcap.api_url.is_empty() {
            return Err(ConfigError::ValidationError(
                "api_url cannot be empty".to_string(),
            ));
        }

        if self.marketcap.page_limit == 0 || self.marketcap.page_limit > 100 {
            return Err(ConfigError::ValidationError(format!(
                "page_limit must be 1-100, got {}",
                self.marketcap.page_limit
            )));
        }

        if self.marketcap.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "timeout_secs must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_valid_config() -> String {
        r#"
[paths]
details_file = "out/coins_details.json"
marketcap_cache = "out/coinmarketcap.json"
coin_definitions = "defs/coins.json"
support_manifest = "defs/support.json"
eth_tokens_dir = "defs/ethereum/tokens"
mosaics_file = "defs/nem_mosaics.json"

[firmware]
t1_latest = "1.6.2"
t2_latest = "2.0.7"

[marketcap]
api_url = "https://api.coinmarketcap.com/v2"
page_limit = 100
page_pause_ms = 1000
cache_max_age_secs = 3600
timeout_secs = 30
"#
        .to_string()
    }

    #[test]
    fn test_load_valid_config() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(create_valid_config().as_bytes()).unwrap();

        let config = load_config(file.path()).unwrap();

        assert_eq!(config.paths.details_file, "out/coins_details.json");
        assert_eq!(config.firmware.t1_latest, "1.6.2");
        assert_eq!(config.marketcap.page_limit, 100);
        assert_eq!(config.marketcap.cache_max_age_secs, 3600);
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_config("/nonexistent/path/config.toml");
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), ConfigError::IoError(_)));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = load_or_default("/nonexistent/path/config.toml").unwrap();
        assert_eq!(config.paths.details_file, "coins_details.json");
        assert_eq!(config.firmware.t2_latest, "2.0.7");
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let partial = r#"
[firmware]
t1_latest = "1.7.1"
"#;
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(partial.as_bytes()).unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.firmware.t1_latest, "1.7.1");
        assert_eq!(config.firmware.t2_latest, "2.0.7");
        assert_eq!(config.paths.marketcap_cache, "coinmarketcap.json");
        assert_eq!(config.marketcap.page_pause_ms, 1000);
    }

    #[test]
    fn test_invalid_firmware_version() {
        let invalid = r#"
[firmware]
t1_latest = "latest-and-greatest"
"#;
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(invalid.as_bytes()).unwrap();

        let result = load_config(file.path());
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::ValidationError(_)
        ));
    }

    #[test]
    fn test_invalid_page_limit() {
        let invalid = r#"
[marketcap]
page_limit = 0
"#;
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(invalid.as_bytes()).unwrap();

        let result = load_config(file.path());
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::ValidationError(_)
        ));
    }

    #[test]
    fn test_empty_path_rejected() {
        let invalid = r#"
[paths]
details_file = ""
"#;
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(invalid.as_bytes()).unwrap();

        let result = load_config(file.path());
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::ValidationError(_)
        ));
    }

    #[test]
    fn test_malformed_toml() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"[paths\nbroken").unwrap();

        let result = load_config(file.path());
        assert!(matches!(result.unwrap_err(), ConfigError::ParseError(_)));
    }

    #[test]
    fn test_path_accessors() {
        let config = Config::default();
        assert_eq!(
            config.paths.details_path(),
            PathBuf::from("coins_details.json")
        );
        assert_eq!(
            config.paths.eth_tokens_path(),
            PathBuf::from("defs/ethereum/tokens")
        );
    }
}
