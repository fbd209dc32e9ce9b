//! Configuration management for the fraud monitor

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Base URL used when nothing has been configured
pub const DEFAULT_ENDPOINT_URL: &str = "http://localhost:5000";

/// Number of cases the scoring model is expected to flag
pub const DEFAULT_FRAUD_QUOTA: usize = 11;

/// Main application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub prediction: PredictionConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
    #[serde(default)]
    pub settings: SettingsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Prediction endpoint configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PredictionConfig {
    /// Base URL of the scoring service, `/predict` is appended
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// How many transactions the fallback heuristic flags
    #[serde(default = "default_fraud_quota")]
    pub fallback_fraud_count: usize,
}

fn default_base_url() -> String {
    DEFAULT_ENDPOINT_URL.to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_fraud_quota() -> usize {
    DEFAULT_FRAUD_QUOTA
}

impl PredictionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
            fallback_fraud_count: default_fraud_quota(),
        }
    }
}

/// Dashboard data configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    /// Number of mock transactions generated when no import file is given
    #[serde(default = "default_mock_transactions")]
    pub mock_transactions: usize,
    /// Seed for the mock generator; random when absent
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_mock_transactions() -> usize {
    150
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            mock_transactions: default_mock_transactions(),
            seed: None,
        }
    }
}

/// Endpoint settings persistence
#[derive(Debug, Clone, Deserialize)]
pub struct SettingsConfig {
    /// File holding the operator-chosen endpoint URL
    #[serde(default = "default_settings_path")]
    pub path: String,
}

fn default_settings_path() -> String {
    "config/endpoint.json".to_string()
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            path: default_settings_path(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (json, pretty)
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/config.toml")
    }

    /// Load configuration from a specific path, with `FRAUD_MONITOR__*` overrides.
    ///
    /// A missing file is not an error; defaults apply.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()).required(false))
            .add_source(Environment::with_prefix("FRAUD_MONITOR").separator("__"))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.prediction.base_url, "http://localhost:5000");
        assert_eq!(config.prediction.timeout(), Duration::from_secs(10));
        assert_eq!(config.prediction.fallback_fraud_count, 11);
        assert_eq!(config.dashboard.mock_transactions, 150);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[prediction]\nfallback_fraud_count = 5\n").unwrap();

        let config = AppConfig::load_from_path(file.path()).unwrap();
        assert_eq!(config.prediction.fallback_fraud_count, 5);
        assert_eq!(config.prediction.timeout_ms, 10_000);
        assert_eq!(config.settings.path, "config/endpoint.json");
    }

    #[test]
    fn test_missing_file_is_default() {
        let config = AppConfig::load_from_path("does/not/exist.toml").unwrap();
        assert_eq!(config.prediction.base_url, DEFAULT_ENDPOINT_URL);
    }
}
