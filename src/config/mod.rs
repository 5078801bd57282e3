//! Configuration management.
//!
//! Configuration is read from a TOML file and can be overridden with
//! `POPCORN_`-prefixed environment variables (sections separated by `__`,
//! e.g. `POPCORN_PROVIDER__TIMEOUT_SECS=10`).
//!
//! ```toml
//! [provider]
//! api_key = "your-omdb-key"
//! base_url = "https://www.omdbapi.com"
//! timeout_secs = 30
//!
//! [search]
//! min_query_len = 3
//!
//! [storage]
//! data_dir = "~/.local/share/popcorn"
//!
//! [logging]
//! level = "warn"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Key bundled with the application, used when none is configured
pub const DEFAULT_API_KEY: &str = "f5fcf426";

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Movie provider settings
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Search behaviour
    #[serde(default)]
    pub search: SearchConfig,

    /// Where the watch list is kept
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Movie provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// OMDb access key
    #[serde(default = "default_api_key")]
    pub api_key: String,

    /// Base URL of the OMDb API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: default_api_key(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ProviderConfig {
    /// Request timeout as a duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_api_key() -> String {
    std::env::var("OMDB_API_KEY").unwrap_or_else(|_| DEFAULT_API_KEY.to_string())
}

fn default_base_url() -> String {
    "https://www.omdbapi.com".to_string()
}

fn default_timeout_secs() -> u64 {
    crate::utils::DEFAULT_TIMEOUT.as_secs()
}

/// Search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Queries shorter than this (in characters) never reach the provider
    #[serde(default = "default_min_query_len")]
    pub min_query_len: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            min_query_len: default_min_query_len(),
        }
    }
}

fn default_min_query_len() -> usize {
    3
}

/// Storage configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding `watched.json`; the platform data directory when unset
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

impl StorageConfig {
    /// Resolved data directory
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(default_data_dir)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Config {
    /// Save configuration to a TOML file, creating parent directories
    pub fn save(&self, path: &Path) -> Result<(), ConfigFileError> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigFileError::Serialize(e.to_string()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigFileError::Io(e.to_string()))?;
        }
        std::fs::write(path, content).map_err(|e| ConfigFileError::Io(e.to_string()))
    }
}

/// Configuration file errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigFileError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Serialize error: {0}")]
    Serialize(String),
}

/// Load configuration from a file, with environment overrides
pub fn load_config(path: &Path) -> Result<Config, config::ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::from(path))
        .add_source(environment())
        .build()?;

    settings.try_deserialize()
}

/// Get the default configuration, with environment overrides applied
pub fn get_config() -> Result<Config, config::ConfigError> {
    let settings = config::Config::builder()
        .add_source(environment())
        .build()?;

    settings.try_deserialize()
}

fn environment() -> config::Environment {
    config::Environment::with_prefix("POPCORN")
        .prefix_separator("_")
        .separator("__")
}

/// Find a configuration file: `./popcorn.toml`, then the user config directory
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from("popcorn.toml");
    if local.is_file() {
        return Some(local);
    }

    let user = default_config_path();
    user.is_file().then_some(user)
}

/// Path of the per-user configuration file
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from(".config"))
        .join("popcorn")
        .join("config.toml")
}

/// Platform data directory for popcorn
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("popcorn"))
        .unwrap_or_else(|| PathBuf::from(".popcorn"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.search.min_query_len, 3);
        assert_eq!(config.provider.base_url, "https://www.omdbapi.com");
        assert_eq!(config.provider.timeout(), Duration::from_secs(30));
        assert!(!config.provider.api_key.is_empty());
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_load_config_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("popcorn.toml");

        std::fs::write(
            &path,
            r#"
[provider]
api_key = "test-key"
base_url = "http://localhost:9999"
timeout_secs = 5

[search]
min_query_len = 2

[storage]
data_dir = "/tmp/popcorn-data"
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.provider.api_key, "test-key");
        assert_eq!(config.provider.base_url, "http://localhost:9999");
        assert_eq!(config.provider.timeout_secs, 5);
        assert_eq!(config.search.min_query_len, 2);
        assert_eq!(
            config.storage.data_dir(),
            PathBuf::from("/tmp/popcorn-data")
        );
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.provider.api_key = "saved-key".to_string();
        config.search.min_query_len = 4;
        config.save(&path).unwrap();

        let loaded = load_config(&path).unwrap();
        assert_eq!(loaded.provider.api_key, "saved-key");
        assert_eq!(loaded.search.min_query_len, 4);
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = load_config(Path::new("/nonexistent/popcorn.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_invalid_toml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("invalid.toml");
        std::fs::write(&path, "invalid = toml = content").unwrap();

        assert!(load_config(&path).is_err());
    }
}
