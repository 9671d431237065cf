//! Execution-progress bookkeeping for an order.

use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Fill;
use crate::domain::shared::{ExecutionId, Money, Quantity, Timestamp};

/// Outcome of applying a fill to the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillApplication {
    /// The fill was applied in full.
    Applied,
    /// The fill would have exceeded the order quantity; the excess was
    /// clamped away and only the remaining quantity applied.
    Clamped,
    /// The execution id was seen before; nothing changed.
    Duplicate,
}

/// Cumulative fill state for an order.
///
/// Maintains the invariant `order_qty = cum_qty + leaves_qty` with
/// `cum_qty` monotonically non-decreasing, a volume-weighted average fill
/// price, and accrued commission. Applied execution ids are remembered so
/// that duplicate delivery of the same event never double-counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillState {
    order_qty: Quantity,
    cum_qty: Quantity,
    leaves_qty: Quantity,
    avg_px: Money,
    commission: Money,
    applied: HashSet<ExecutionId>,
    last_fill_at: Option<Timestamp>,
}

impl FillState {
    /// Create a new, unfilled state for an order of the given quantity.
    #[must_use]
    pub fn new(order_qty: Quantity) -> Self {
        Self {
            order_qty,
            cum_qty: Quantity::ZERO,
            leaves_qty: order_qty,
            avg_px: Money::ZERO,
            commission: Money::ZERO,
            applied: HashSet::new(),
            last_fill_at: None,
        }
    }

    /// Original order quantity.
    #[must_use]
    pub const fn order_qty(&self) -> Quantity {
        self.order_qty
    }

    /// Cumulative quantity filled.
    #[must_use]
    pub const fn cum_qty(&self) -> Quantity {
        self.cum_qty
    }

    /// Remaining quantity open for execution.
    #[must_use]
    pub const fn leaves_qty(&self) -> Quantity {
        self.leaves_qty
    }

    /// Volume-weighted average fill price.
    ///
    /// Zero until the first fill is applied.
    #[must_use]
    pub const fn avg_px(&self) -> Money {
        self.avg_px
    }

    /// Commission accrued across all fills.
    #[must_use]
    pub const fn commission(&self) -> Money {
        self.commission
    }

    /// Timestamp of the most recent fill.
    #[must_use]
    pub const fn last_fill_at(&self) -> Option<Timestamp> {
        self.last_fill_at
    }

    /// Returns true if a fill with this execution id was already applied.
    #[must_use]
    pub fn has_applied(&self, execution_id: &ExecutionId) -> bool {
        self.applied.contains(execution_id)
    }

    /// Apply an execution fill to this state.
    ///
    /// Duplicate execution ids are ignored. A fill exceeding the remaining
    /// quantity is clamped to it; the caller decides how to flag the
    /// overfill. VWAP and commission are updated from the applied portion.
    pub fn apply_fill(&mut self, fill: Fill) -> FillApplication {
        if self.applied.contains(&fill.execution_id) {
            return FillApplication::Duplicate;
        }

        let applied_qty = fill.quantity.min(self.leaves_qty);
        let clamped = applied_qty < fill.quantity;

        let new_cum = self.cum_qty + applied_qty;
        if new_cum.amount() > Decimal::ZERO {
            // VWAP: new_avg = (old_avg * old_cum + price * applied) / new_cum
            let old_value = self.avg_px.amount() * self.cum_qty.amount();
            let fill_value = fill.price.amount() * applied_qty.amount();
            self.avg_px = Money::new((old_value + fill_value) / new_cum.amount());
        }

        self.cum_qty = new_cum;
        self.leaves_qty = self.order_qty - self.cum_qty;
        self.commission = self.commission + fill.commission;
        self.last_fill_at = Some(fill.occurred_at);
        self.applied.insert(fill.execution_id);

        debug_assert!(self.verify_invariant());

        if clamped {
            FillApplication::Clamped
        } else {
            FillApplication::Applied
        }
    }

    /// Returns true if the order is completely filled.
    #[must_use]
    pub fn is_filled(&self) -> bool {
        self.leaves_qty.is_zero()
    }

    /// Returns true if some but not all quantity is filled.
    #[must_use]
    pub fn is_partial(&self) -> bool {
        self.cum_qty.is_positive() && self.leaves_qty.is_positive()
    }

    /// Verify the bookkeeping invariant `order_qty = cum_qty + leaves_qty`.
    #[must_use]
    pub fn verify_invariant(&self) -> bool {
        self.order_qty == self.cum_qty + self.leaves_qty && self.cum_qty <= self.order_qty
    }

    /// Total notional value filled so far.
    #[must_use]
    pub fn filled_notional(&self) -> Money {
        Money::new(self.avg_px.amount() * self.cum_qty.amount())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn make_fill(id: &str, qty: i64, price: Decimal) -> Fill {
        Fill::new(
            ExecutionId::new(id),
            Quantity::from_i64(qty),
            Money::new(price),
            Timestamp::now(),
        )
    }

    #[test]
    fn fill_state_starts_empty() {
        let state = FillState::new(Quantity::from_i64(10));
        assert_eq!(state.cum_qty(), Quantity::ZERO);
        assert_eq!(state.leaves_qty(), Quantity::from_i64(10));
        assert_eq!(state.avg_px(), Money::ZERO);
        assert!(!state.is_filled());
        assert!(!state.is_partial());
    }

    #[test]
    fn fill_state_partial_then_filled() {
        let mut state = FillState::new(Quantity::from_i64(10));

        assert_eq!(
            state.apply_fill(make_fill("e1", 4, dec!(10.00))),
            FillApplication::Applied
        );
        assert!(state.is_partial());

        assert_eq!(
            state.apply_fill(make_fill("e2", 6, dec!(11.00))),
            FillApplication::Applied
        );
        assert!(state.is_filled());

        // Weighted mean of 4@10 and 6@11
        assert_eq!(state.avg_px(), Money::new(dec!(10.60)));
    }

    #[test]
    fn fill_state_duplicate_execution_id_is_noop() {
        let mut state = FillState::new(Quantity::from_i64(10));

        state.apply_fill(make_fill("e1", 4, dec!(10.00)));
        let snapshot = state.clone();

        assert_eq!(
            state.apply_fill(make_fill("e1", 4, dec!(10.00))),
            FillApplication::Duplicate
        );
        assert_eq!(state, snapshot);
    }

    #[test]
    fn fill_state_overfill_is_clamped() {
        let mut state = FillState::new(Quantity::from_i64(10));

        state.apply_fill(make_fill("e1", 8, dec!(10.00)));
        assert_eq!(
            state.apply_fill(make_fill("e2", 5, dec!(10.00))),
            FillApplication::Clamped
        );

        assert_eq!(state.cum_qty(), Quantity::from_i64(10));
        assert_eq!(state.leaves_qty(), Quantity::ZERO);
        assert!(state.is_filled());
        assert!(state.verify_invariant());
    }

    #[test]
    fn fill_state_commission_accrues() {
        let mut state = FillState::new(Quantity::from_i64(10));

        state.apply_fill(make_fill("e1", 4, dec!(10)).with_commission(Money::new(dec!(0.40))));
        state.apply_fill(make_fill("e2", 6, dec!(10)).with_commission(Money::new(dec!(0.60))));

        assert_eq!(state.commission(), Money::new(dec!(1.00)));
    }

    #[test]
    fn fill_state_filled_notional() {
        let mut state = FillState::new(Quantity::from_i64(10));
        state.apply_fill(make_fill("e1", 10, dec!(12.50)));
        assert_eq!(state.filled_notional(), Money::new(dec!(125.00)));
    }

    #[test]
    fn fill_state_serde_roundtrip() {
        let mut state = FillState::new(Quantity::from_i64(10));
        state.apply_fill(make_fill("e1", 4, dec!(10.00)));

        let json = serde_json::to_string(&state).unwrap();
        let parsed: FillState = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, state);
        assert!(parsed.has_applied(&ExecutionId::new("e1")));
    }

    proptest! {
        /// Cumulative quantity never decreases and never exceeds the order
        /// quantity, whatever sequence of fills arrives.
        #[test]
        fn fill_state_monotone_and_bounded(fills in prop::collection::vec((1i64..50, 1i64..10_000), 1..20)) {
            let order_qty = Quantity::from_i64(100);
            let mut state = FillState::new(order_qty);
            let mut prev_cum = Quantity::ZERO;

            for (i, (qty, cents)) in fills.into_iter().enumerate() {
                let fill = Fill::new(
                    ExecutionId::new(format!("e{i}")),
                    Quantity::from_i64(qty),
                    Money::from_cents(cents),
                    Timestamp::now(),
                );
                state.apply_fill(fill);

                prop_assert!(state.cum_qty() >= prev_cum);
                prop_assert!(state.cum_qty() <= order_qty);
                prop_assert!(state.verify_invariant());
                prev_cum = state.cum_qty();
            }
        }
    }
}
