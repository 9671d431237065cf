//! Incremental fill from a venue execution.

use serde::{Deserialize, Serialize};

use crate::domain::shared::{ExecutionId, Money, Quantity, Timestamp};

/// A single incremental execution of an order at the venue.
///
/// Quantity and commission are deltas, not cumulative totals. The
/// venue-assigned execution id makes duplicate delivery detectable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fill {
    /// Venue-assigned id of this execution event.
    pub execution_id: ExecutionId,
    /// Quantity filled in this execution.
    pub quantity: Quantity,
    /// Price at which this fill occurred.
    pub price: Money,
    /// Commission charged for this fill.
    pub commission: Money,
    /// When the fill occurred at the venue.
    pub occurred_at: Timestamp,
}

impl Fill {
    /// Create a new fill.
    #[must_use]
    pub fn new(
        execution_id: impl Into<ExecutionId>,
        quantity: Quantity,
        price: Money,
        occurred_at: Timestamp,
    ) -> Self {
        Self {
            execution_id: execution_id.into(),
            quantity,
            price,
            commission: Money::ZERO,
            occurred_at,
        }
    }

    /// Attach a commission delta to the fill.
    #[must_use]
    pub fn with_commission(mut self, commission: Money) -> Self {
        self.commission = commission;
        self
    }

    /// Notional value of this fill.
    #[must_use]
    pub fn notional(&self) -> Money {
        Money::new(self.price.amount() * self.quantity.amount())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn make_fill() -> Fill {
        Fill::new(
            ExecutionId::new("exec-1"),
            Quantity::from_i64(4),
            Money::new(dec!(12.50)),
            Timestamp::now(),
        )
    }

    #[test]
    fn fill_new_defaults() {
        let fill = make_fill();
        assert_eq!(fill.execution_id.as_str(), "exec-1");
        assert_eq!(fill.commission, Money::ZERO);
    }

    #[test]
    fn fill_with_commission() {
        let fill = make_fill().with_commission(Money::new(dec!(0.35)));
        assert_eq!(fill.commission, Money::new(dec!(0.35)));
    }

    #[test]
    fn fill_notional() {
        let fill = make_fill();
        assert_eq!(fill.notional(), Money::new(dec!(50.00)));
    }

    #[test]
    fn fill_serde_roundtrip() {
        let fill = make_fill().with_commission(Money::new(dec!(1)));
        let json = serde_json::to_string(&fill).unwrap();
        let parsed: Fill = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, fill);
    }
}
