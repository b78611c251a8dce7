//! Application configuration loading from config.toml
//!
//! Every section and key is optional: a missing file or a partial one falls back
//! to defaults, so the binary runs against a local backend with no setup.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

/// Default location of the configuration file
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Configuration structure representing the entire config.toml file
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub backend: BackendConfig,
    pub list: ListConfig,
}

/// Where the article backend lives and how long to wait for it
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL every resource path is appended to
    pub base_url: String,
    /// Per-request timeout
    pub timeout_seconds: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: super::backend::DEFAULT_BACKEND_URL.to_string(),
            timeout_seconds: 30,
        }
    }
}

/// Article list settings
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ListConfig {
    /// Rows per page; `None` leaves it to the backend
    pub per_page: Option<u32>,
}

/// Loads configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file exists but cannot be read
/// - The TOML syntax is invalid
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path = path.as_ref();
    if !path.exists() {
        info!("No config file at {}, using defaults", path.display());
        return Ok(AppConfig::default());
    }

    debug!("Loading configuration from {}", path.display());
    let contents = std::fs::read_to_string(path).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads configuration from the default location (./config.toml) and applies the
/// `ARTICLE_BACKEND_URL` override.
pub fn load_default_config() -> Result<AppConfig> {
    let mut config = load_config(DEFAULT_CONFIG_PATH)?;
    config.backend.base_url = super::backend::get_backend_url(&config.backend.base_url);
    Ok(config)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
            [backend]
            base_url = "https://erp.example.com"
            timeout_seconds = 10

            [list]
            per_page = 50
        "#;

        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.backend.base_url, "https://erp.example.com");
        assert_eq!(config.backend.timeout_seconds, 10);
        assert_eq!(config.list.per_page, Some(50));
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let toml_str = r#"
            [backend]
            base_url = "https://erp.example.com"
        "#;

        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.backend.timeout_seconds, 30);
        assert_eq!(config.list, ListConfig::default());
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = load_config("does/not/exist/config.toml").unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_invalid_toml_is_a_config_error() {
        let path = std::env::temp_dir().join("article-desk-invalid-config.toml");
        std::fs::write(&path, "[backend\nbase_url = ").unwrap();

        let result = load_config(&path);
        std::fs::remove_file(&path).ok();
        assert!(matches!(result, Err(Error::Config { .. })));
    }
}
