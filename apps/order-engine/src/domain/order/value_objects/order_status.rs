//! Order status in the lifecycle.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of an order.
///
/// `Pending` is the only initial state. `Filled`, `Cancelled`, `Rejected`
/// and `Error` are terminal: once reached, the order is frozen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Created and persisted locally, not yet submitted to the venue.
    Pending,
    /// Accepted by the venue, has a venue order id.
    Submitted,
    /// Some quantity filled, more outstanding.
    PartiallyFilled,
    /// Completely filled.
    Filled,
    /// Cancelled before completion (locally or at the venue).
    Cancelled,
    /// Rejected by the venue.
    Rejected,
    /// Submission failed before the venue accepted the order.
    Error,
}

impl OrderStatus {
    /// Returns true if the order is in a terminal state.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Filled | Self::Cancelled | Self::Rejected | Self::Error
        )
    }

    /// Returns true if the order is still active (may still change).
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Pending | Self::Submitted | Self::PartiallyFilled)
    }

    /// Returns true if the order can be cancelled.
    #[must_use]
    pub const fn is_cancelable(&self) -> bool {
        matches!(self, Self::Pending | Self::Submitted | Self::PartiallyFilled)
    }

    /// Returns true if the order can receive fills.
    #[must_use]
    pub const fn can_fill(&self) -> bool {
        matches!(self, Self::Submitted | Self::PartiallyFilled)
    }

    /// Returns true if the order has reached the venue.
    ///
    /// Orders that never reached the venue (`Pending`, `Error` before
    /// submission) have no venue order id and nothing to reconcile.
    #[must_use]
    pub const fn reached_venue(&self) -> bool {
        matches!(
            self,
            Self::Submitted | Self::PartiallyFilled | Self::Filled | Self::Cancelled | Self::Rejected
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Submitted => write!(f, "SUBMITTED"),
            Self::PartiallyFilled => write!(f, "PARTIALLY_FILLED"),
            Self::Filled => write!(f, "FILLED"),
            Self::Cancelled => write!(f, "CANCELLED"),
            Self::Rejected => write!(f, "REJECTED"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(OrderStatus::Pending, false)]
    #[test_case(OrderStatus::Submitted, false)]
    #[test_case(OrderStatus::PartiallyFilled, false)]
    #[test_case(OrderStatus::Filled, true)]
    #[test_case(OrderStatus::Cancelled, true)]
    #[test_case(OrderStatus::Rejected, true)]
    #[test_case(OrderStatus::Error, true)]
    fn order_status_is_terminal(status: OrderStatus, expected: bool) {
        assert_eq!(status.is_terminal(), expected);
    }

    #[test]
    fn order_status_is_active() {
        assert!(OrderStatus::Pending.is_active());
        assert!(OrderStatus::Submitted.is_active());
        assert!(OrderStatus::PartiallyFilled.is_active());
        assert!(!OrderStatus::Filled.is_active());
        assert!(!OrderStatus::Error.is_active());
    }

    #[test]
    fn order_status_is_cancelable() {
        assert!(OrderStatus::Pending.is_cancelable());
        assert!(OrderStatus::Submitted.is_cancelable());
        assert!(OrderStatus::PartiallyFilled.is_cancelable());
        assert!(!OrderStatus::Filled.is_cancelable());
        assert!(!OrderStatus::Rejected.is_cancelable());
    }

    #[test]
    fn order_status_can_fill() {
        assert!(!OrderStatus::Pending.can_fill());
        assert!(OrderStatus::Submitted.can_fill());
        assert!(OrderStatus::PartiallyFilled.can_fill());
        assert!(!OrderStatus::Filled.can_fill());
    }

    #[test]
    fn order_status_reached_venue() {
        assert!(!OrderStatus::Pending.reached_venue());
        assert!(!OrderStatus::Error.reached_venue());
        assert!(OrderStatus::Submitted.reached_venue());
        assert!(OrderStatus::Filled.reached_venue());
    }

    #[test]
    fn order_status_display() {
        assert_eq!(
            format!("{}", OrderStatus::PartiallyFilled),
            "PARTIALLY_FILLED"
        );
        assert_eq!(format!("{}", OrderStatus::Error), "ERROR");
    }

    #[test]
    fn order_status_serde() {
        let json = serde_json::to_string(&OrderStatus::PartiallyFilled).unwrap();
        assert_eq!(json, "\"PARTIALLY_FILLED\"");

        let parsed: OrderStatus = serde_json::from_str("\"FILLED\"").unwrap();
        assert_eq!(parsed, OrderStatus::Filled);
    }
}
