//! Read-only statistics rollups over the order store.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::order::Order;
use crate::domain::shared::{Money, Quantity};

/// Rollup for one instrument.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentStatistics {
    /// Orders ever created for the instrument.
    pub total_orders: usize,
    /// Orders that reached FILLED.
    pub filled_count: usize,
    /// Orders still active.
    pub open_count: usize,
    /// Total quantity filled across all orders.
    pub total_volume: Quantity,
    /// Commission accrued across all orders.
    pub total_commission: Money,
}

/// Engine-wide order statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStatistics {
    /// Orders ever created.
    pub total_orders: usize,
    /// Orders that reached FILLED.
    pub filled_count: usize,
    /// Orders still active.
    pub open_count: usize,
    /// Filled orders as a fraction of all orders (0 when empty).
    pub fill_rate: Decimal,
    /// Total quantity filled across all orders.
    pub total_volume: Quantity,
    /// Commission accrued across all orders.
    pub total_commission: Money,
    /// Per-instrument breakdown, keyed by symbol.
    pub per_instrument: HashMap<String, InstrumentStatistics>,
}

impl OrderStatistics {
    /// Compute statistics over a set of orders.
    #[must_use]
    pub fn from_orders(orders: &[Order]) -> Self {
        let mut stats = Self {
            total_orders: orders.len(),
            ..Self::default()
        };

        for order in orders {
            let filled = order.status() == crate::domain::order::OrderStatus::Filled;
            let open = order.status().is_active();

            if filled {
                stats.filled_count += 1;
            }
            if open {
                stats.open_count += 1;
            }
            stats.total_volume = stats.total_volume + order.fill().cum_qty();
            stats.total_commission = stats.total_commission + order.fill().commission();

            let entry = stats
                .per_instrument
                .entry(order.symbol().as_str().to_string())
                .or_default();
            entry.total_orders += 1;
            if filled {
                entry.filled_count += 1;
            }
            if open {
                entry.open_count += 1;
            }
            entry.total_volume = entry.total_volume + order.fill().cum_qty();
            entry.total_commission = entry.total_commission + order.fill().commission();
        }

        if stats.total_orders > 0 {
            stats.fill_rate =
                Decimal::from(stats.filled_count) / Decimal::from(stats.total_orders);
        }

        stats
    }
}
