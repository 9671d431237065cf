//! Per-operation errors for the lifecycle manager.

use thiserror::Error;

use crate::domain::order::{OrderError, OrderStatus, StoreError};
use crate::gateway::GatewayError;

/// Errors from order creation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CreateOrderError {
    /// The request is malformed; nothing was persisted.
    #[error("Validation failed: {0}")]
    Validation(OrderError),

    /// The symbol does not resolve to a tradable instrument.
    #[error("Unknown instrument: {symbol}")]
    UnknownInstrument {
        /// The unresolvable symbol.
        symbol: String,
    },

    /// Persistence failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors from order submission.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitOrderError {
    /// No order with this id.
    #[error("Order not found: {order_id}")]
    NotFound {
        /// The unknown order id.
        order_id: String,
    },

    /// The order is not PENDING; a second submit is rejected here.
    #[error("Order cannot be submitted in status: {status}")]
    InvalidState {
        /// Current order status.
        status: OrderStatus,
    },

    /// The gateway call failed; the order's resulting state depends on the
    /// failure: unavailability and venue errors move it to ERROR, a
    /// client-side timeout leaves it PENDING for reconciliation.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// Persistence failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors from order cancellation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CancelOrderError {
    /// No order with this id.
    #[error("Order not found: {order_id}")]
    NotFound {
        /// The unknown order id.
        order_id: String,
    },

    /// The order is not cancelable in its current status.
    #[error("Order cannot be cancelled in status: {status}")]
    InvalidState {
        /// Current order status.
        status: OrderStatus,
    },

    /// The gateway call failed; local state is unchanged because
    /// cancellation is not assumed successful until confirmed.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// Persistence failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors from order rejection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectOrderError {
    /// No order with this id.
    #[error("Order not found: {order_id}")]
    NotFound {
        /// The unknown order id.
        order_id: String,
    },

    /// The order is already terminal.
    #[error("Order cannot be rejected in status: {status}")]
    InvalidState {
        /// Current order status.
        status: OrderStatus,
    },

    /// Persistence failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Outcome of applying one execution event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionOutcome {
    /// The fill was applied (possibly clamped, with the anomaly recorded).
    Applied,
    /// The execution id was already applied; state unchanged.
    Duplicate,
    /// No local order matches the venue order id; logged and ignored.
    Unknown,
    /// The order cannot receive the fill (terminal or frozen); logged.
    Skipped,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submit_error_display() {
        let err = SubmitOrderError::InvalidState {
            status: OrderStatus::Submitted,
        };
        assert!(format!("{err}").contains("SUBMITTED"));
    }

    #[test]
    fn gateway_error_converts() {
        let err: SubmitOrderError = GatewayError::Timeout { timeout_ms: 5000 }.into();
        assert!(matches!(err, SubmitOrderError::Gateway(_)));
    }

    #[test]
    fn create_error_display() {
        let err = CreateOrderError::UnknownInstrument {
            symbol: "XXXX".to_string(),
        };
        assert!(format!("{err}").contains("XXXX"));
    }
}
