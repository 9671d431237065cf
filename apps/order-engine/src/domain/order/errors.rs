//! Order aggregate errors.

use thiserror::Error;

use super::value_objects::OrderStatus;

/// Errors raised by order lifecycle transitions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    /// Invalid state transition attempted.
    #[error("Invalid order state transition: {from} -> {to}: {reason}")]
    InvalidStateTransition {
        /// Current order status.
        from: OrderStatus,
        /// Attempted status.
        to: OrderStatus,
        /// Reason for failure.
        reason: String,
    },

    /// Order cannot receive fills in its current state.
    #[error("Cannot fill order in status: {status}")]
    CannotFill {
        /// Current status.
        status: OrderStatus,
    },

    /// Order cannot be cancelled in its current state.
    #[error("Cannot cancel order in status: {status}")]
    CannotCancel {
        /// Current status.
        status: OrderStatus,
    },

    /// The order carries an anomaly flag and is frozen from automatic
    /// mutation.
    #[error("Order is frozen pending manual review: {detail}")]
    Frozen {
        /// What froze the order.
        detail: String,
    },

    /// Invalid order parameters.
    #[error("Invalid order parameter '{field}': {message}")]
    InvalidParameters {
        /// Field with the invalid value.
        field: String,
        /// Error message.
        message: String,
    },
}
