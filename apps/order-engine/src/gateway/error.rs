//! Error types for venue gateway operations.

use thiserror::Error;

/// Errors from venue gateway operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// The gateway is disconnected; calls fail fast instead of blocking.
    #[error("Gateway unavailable: {0}")]
    Unavailable(String),

    /// A gateway call did not return within the bounded timeout.
    ///
    /// The true outcome at the venue is unknown; callers must leave local
    /// state untouched and let reconciliation discover it.
    #[error("Gateway call timed out after {timeout_ms}ms")]
    Timeout {
        /// The timeout that elapsed, in milliseconds.
        timeout_ms: u64,
    },

    /// The venue API returned an error.
    #[error("Venue API error: {code} - {message}")]
    Api {
        /// Error code from the venue.
        code: String,
        /// Error message from the venue.
        message: String,
    },

    /// The venue rejected the order at submission.
    #[error("Order rejected by venue: {0}")]
    OrderRejected(String),

    /// The venue has no record of this order id.
    #[error("Order not found at venue: {0}")]
    OrderNotFound(String),
}

impl GatewayError {
    /// Returns true for transient failures that reconciliation heals.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::Timeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_display() {
        let err = GatewayError::Timeout { timeout_ms: 5000 };
        assert!(format!("{err}").contains("5000"));
    }

    #[test]
    fn transient_classification() {
        assert!(GatewayError::Unavailable("down".to_string()).is_transient());
        assert!(GatewayError::Timeout { timeout_ms: 1 }.is_transient());
        assert!(!GatewayError::OrderRejected("bad".to_string()).is_transient());
        assert!(!GatewayError::OrderNotFound("x".to_string()).is_transient());
    }
}
