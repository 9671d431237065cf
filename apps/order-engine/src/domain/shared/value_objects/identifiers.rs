//! Strongly-typed identifiers for domain entities.
//!
//! These prevent mixing up IDs from different contexts.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new identifier from a string.
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Generate a new unique identifier using UUID v4.
            #[must_use]
            pub fn generate() -> Self {
                Self(uuid::Uuid::new_v4().to_string())
            }

            /// Get the inner string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume and return the inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

define_id!(
    OrderId,
    "Unique identifier for an order (engine internal, doubles as the client idempotency key)."
);
define_id!(VenueOrderId, "Venue's unique identifier for an order.");
define_id!(
    InstrumentId,
    "Identifier for a tradeable instrument resolved through the catalog."
);
define_id!(StrategyId, "Identifier of the strategy that originated an order.");
define_id!(
    ExecutionId,
    "Venue-assigned identifier of a single execution event."
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_id_new_and_display() {
        let id = OrderId::new("ord-123");
        assert_eq!(id.as_str(), "ord-123");
        assert_eq!(format!("{id}"), "ord-123");
    }

    #[test]
    fn order_id_generate_is_unique() {
        let id1 = OrderId::generate();
        let id2 = OrderId::generate();
        assert_ne!(id1, id2);
    }

    #[test]
    fn order_id_from_string() {
        let id: OrderId = "ord-123".into();
        assert_eq!(id.as_str(), "ord-123");

        let id: OrderId = String::from("ord-456").into();
        assert_eq!(id.as_str(), "ord-456");
    }

    #[test]
    fn order_id_into_inner() {
        let id = OrderId::new("ord-123");
        assert_eq!(id.into_inner(), "ord-123");
    }

    #[test]
    fn venue_order_id_new_and_display() {
        let id = VenueOrderId::new("venue-ord-abc");
        assert_eq!(id.as_str(), "venue-ord-abc");
    }

    #[test]
    fn execution_id_equality() {
        let id1 = ExecutionId::new("exec-1");
        let id2 = ExecutionId::new("exec-1");
        let id3 = ExecutionId::new("exec-2");
        assert_eq!(id1, id2);
        assert_ne!(id1, id3);
    }

    #[test]
    fn strategy_id_new() {
        let id = StrategyId::new("mean-reversion-v2");
        assert_eq!(id.as_str(), "mean-reversion-v2");
    }

    #[test]
    fn instrument_id_new() {
        let id = InstrumentId::new("AAPL");
        assert_eq!(id.as_str(), "AAPL");
    }
}
