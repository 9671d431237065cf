//! Order kind (market/limit/stop/stop-limit).

use serde::{Deserialize, Serialize};
use std::fmt;

/// How an order is priced at the venue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderKind {
    /// Execute immediately at the best available price.
    Market,
    /// Execute at the limit price or better.
    Limit,
    /// Become a market order once the stop price trades.
    Stop,
    /// Become a limit order once the stop price trades.
    StopLimit,
}

impl OrderKind {
    /// Returns true if this kind requires a limit price.
    #[must_use]
    pub const fn requires_limit_price(&self) -> bool {
        matches!(self, Self::Limit | Self::StopLimit)
    }

    /// Returns true if this kind requires a stop price.
    #[must_use]
    pub const fn requires_stop_price(&self) -> bool {
        matches!(self, Self::Stop | Self::StopLimit)
    }
}

impl fmt::Display for OrderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Market => write!(f, "MARKET"),
            Self::Limit => write!(f, "LIMIT"),
            Self::Stop => write!(f, "STOP"),
            Self::StopLimit => write!(f, "STOP_LIMIT"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_kind_limit_price_requirements() {
        assert!(!OrderKind::Market.requires_limit_price());
        assert!(OrderKind::Limit.requires_limit_price());
        assert!(!OrderKind::Stop.requires_limit_price());
        assert!(OrderKind::StopLimit.requires_limit_price());
    }

    #[test]
    fn order_kind_stop_price_requirements() {
        assert!(!OrderKind::Market.requires_stop_price());
        assert!(!OrderKind::Limit.requires_stop_price());
        assert!(OrderKind::Stop.requires_stop_price());
        assert!(OrderKind::StopLimit.requires_stop_price());
    }

    #[test]
    fn order_kind_display() {
        assert_eq!(format!("{}", OrderKind::StopLimit), "STOP_LIMIT");
    }

    #[test]
    fn order_kind_serde() {
        let parsed: OrderKind = serde_json::from_str("\"STOP_LIMIT\"").unwrap();
        assert_eq!(parsed, OrderKind::StopLimit);
    }
}
