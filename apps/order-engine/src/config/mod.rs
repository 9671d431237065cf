//! Configuration module for the order engine.
//!
//! Provides YAML configuration loading with serde defaults for every
//! section, so an empty file (or no file) yields a fully usable config.
//!
//! # Usage
//!
//! ```rust,ignore
//! use order_engine::config::load_config;
//!
//! // Load from default path (config.yaml)
//! let config = load_config(None)?;
//!
//! // Load from custom path
//! let config = load_config(Some("custom/config.yaml"))?;
//! ```

mod gateway;
mod observability;
mod reconciliation;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use gateway::GatewayConfig;
pub use observability::{LoggingConfig, ObservabilityConfig};
pub use reconciliation::ReconciliationConfig;

/// Default configuration file path.
const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        /// Path to the config file.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Failed to parse YAML configuration.
    #[error("Failed to parse config YAML: {0}")]
    ParseError(#[from] serde_yaml_bw::Error),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
    /// Venue gateway configuration.
    #[serde(default)]
    pub gateway: GatewayConfig,
    /// Reconciliation configuration.
    #[serde(default)]
    pub reconciliation: ReconciliationConfig,
}

/// Load configuration from a YAML file.
///
/// With `None`, the default path is used; a missing default file yields
/// the default configuration rather than an error.
///
/// # Errors
///
/// Returns `ConfigError` if an explicitly given file cannot be read, or if
/// the YAML does not parse.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let (path, explicit) = match path {
        Some(p) => (p, true),
        None => (DEFAULT_CONFIG_PATH, false),
    };

    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(source) if !explicit && source.kind() == std::io::ErrorKind::NotFound => {
            return Ok(Config::default());
        }
        Err(source) => {
            return Err(ConfigError::ReadError {
                path: path.to_string(),
                source,
            });
        }
    };

    Ok(serde_yaml_bw::from_str(&contents)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_complete() {
        let config = Config::default();
        assert_eq!(config.gateway.call_timeout_ms, 5000);
        assert_eq!(config.reconciliation.interval_secs, 300);
        assert_eq!(config.observability.logging.level, "info");
    }

    #[test]
    fn parses_partial_yaml() {
        let yaml = "reconciliation:\n  interval_secs: 60\n";
        let config: Config = serde_yaml_bw::from_str(yaml).unwrap();
        assert_eq!(config.reconciliation.interval_secs, 60);
        // Untouched sections keep their defaults
        assert_eq!(config.gateway.call_timeout_ms, 5000);
    }

    #[test]
    fn missing_default_file_falls_back_to_defaults() {
        let config = load_config(None).unwrap();
        assert_eq!(config.gateway.call_timeout_ms, 5000);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let result = load_config(Some("does/not/exist.yaml"));
        assert!(matches!(result, Err(ConfigError::ReadError { .. })));
    }
}
