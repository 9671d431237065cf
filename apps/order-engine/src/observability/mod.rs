//! Structured logging for the order engine.
//!
//! Builds a `tracing-subscriber` registry from `LoggingConfig`. The
//! `RUST_LOG` environment variable, when set, overrides the configured
//! level filter.

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Error type for logging initialization.
#[derive(Debug, Error)]
pub enum ObservabilityError {
    /// Failed to initialize the tracing subscriber.
    #[error("failed to initialize tracing subscriber: {0}")]
    SubscriberError(String),
}

/// Initialize global structured logging.
///
/// Call once at startup; a second call fails because the global
/// subscriber is already set.
///
/// # Errors
///
/// Returns `ObservabilityError` if a global subscriber is already
/// installed.
pub fn init_logging(config: &LoggingConfig) -> Result<(), ObservabilityError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.clone()));

    let result = if config.format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .try_init()
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).try_init()
    };

    result.map_err(|e| ObservabilityError::SubscriberError(e.to_string()))
}
