use crate::core::types::PortfolioItem;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

/// Environment variable that overrides the configured API base URL.
pub const API_URL_ENV: &str = "ETF_API_URL";
pub const DEFAULT_API_URL: &str = "http://localhost:8000";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

fn default_base_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            base_url: default_base_url(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ApiConfig {
    /// Replaces the base URL with the environment override when one is set.
    pub fn with_env_override(self, env_value: Option<String>) -> Self {
        match env_value.map(|v| v.trim().to_string()) {
            Some(url) if !url.is_empty() => {
                debug!(base_url = %url, "Using API base URL from {}", API_URL_ENV);
                ApiConfig {
                    base_url: url,
                    ..self
                }
            }
            _ => self,
        }
    }

    pub fn apply_env(self) -> Self {
        self.with_env_override(std::env::var(API_URL_ENV).ok())
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub portfolio: Vec<PortfolioItem>,
}

impl AppConfig {
    /// Loads the config from the default location, falling back to defaults
    /// when no config file has been created yet.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(path = %config_path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("io", "etf-helper", "etf-helper")
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
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
api:
  base_url: "http://etf.example.com"
  timeout_secs: 3
portfolio:
  - id: "p1"
    etfCode: "069500"
    etfName: "KODEX 200"
    quantity: 10
    avgPrice: 30000
  - id: "p2"
    etf_code: "091160"
    etf_name: "KODEX 반도체"
    quantity: 5.5
    avg_price: 11000
    current_price: 12500
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.api.base_url, "http://etf.example.com");
        assert_eq!(config.api.timeout_secs, 3);
        assert_eq!(config.portfolio.len(), 2);
        assert_eq!(config.portfolio[0].etf_code, "069500");
        assert!(config.portfolio[0].current_price.is_none());
        assert_eq!(config.portfolio[1].etf_name, "KODEX 반도체");
        assert_eq!(config.portfolio[1].quantity, 5.5);
        assert_eq!(config.portfolio[1].current_price, Some(12500.0));
    }

    #[test]
    fn test_config_defaults() {
        let config: AppConfig = serde_yaml::from_str("portfolio: []").unwrap();
        assert_eq!(config.api, ApiConfig::default());
        assert_eq!(config.api.base_url, DEFAULT_API_URL);

        let partial: AppConfig = serde_yaml::from_str("api:\n  timeout_secs: 1\n").unwrap();
        assert_eq!(partial.api.base_url, DEFAULT_API_URL);
        assert_eq!(partial.api.timeout_secs, 1);
    }

    #[test]
    fn test_env_override() {
        let config = ApiConfig::default();

        let overridden = config
            .clone()
            .with_env_override(Some("http://api.internal:9000".to_string()));
        assert_eq!(overridden.base_url, "http://api.internal:9000");
        assert_eq!(overridden.timeout_secs, config.timeout_secs);

        assert_eq!(config.clone().with_env_override(None), config);
        assert_eq!(
            config.clone().with_env_override(Some("  ".to_string())),
            config
        );
    }

    #[test]
    fn test_load_from_missing_path_fails() {
        let result = AppConfig::load_from_path("/nonexistent/etf-helper/config.yaml");
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to read config file")
        );
    }
}
