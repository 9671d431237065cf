//! Order repository port.
//!
//! Defines the persistence abstraction for orders. Implemented by adapters
//! in the store module; the engine is the only writer and goes through the
//! per-order serialization discipline of the lifecycle manager.

use async_trait::async_trait;
use thiserror::Error;

use super::aggregate::Order;
use super::value_objects::OrderStatus;
use crate::domain::shared::{OrderId, Symbol, VenueOrderId};

/// Errors from order persistence.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Order not found.
    #[error("Order not found: {order_id}")]
    NotFound {
        /// Order ID that was looked up.
        order_id: String,
    },

    /// A different order already holds this venue order id.
    #[error("Duplicate venue order id: {venue_order_id}")]
    DuplicateVenueId {
        /// The conflicting venue order id.
        venue_order_id: String,
    },

    /// A local order id was inserted twice.
    #[error("Duplicate order id: {order_id}")]
    DuplicateOrderId {
        /// The conflicting order id.
        order_id: String,
    },
}

/// Filter for order listings.
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    /// Only orders for this symbol.
    pub symbol: Option<Symbol>,
    /// Only orders in this status.
    pub status: Option<OrderStatus>,
    /// Maximum number of orders to return.
    pub limit: Option<usize>,
}

impl OrderFilter {
    /// Filter matching every order.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Restrict to a symbol.
    #[must_use]
    pub fn with_symbol(mut self, symbol: Symbol) -> Self {
        self.symbol = Some(symbol);
        self
    }

    /// Restrict to a status.
    #[must_use]
    pub fn with_status(mut self, status: OrderStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Bound the result count.
    #[must_use]
    pub const fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Repository trait for Order persistence.
///
/// Orders are never deleted: terminal orders remain for history and
/// statistics. The venue order id carries a unique constraint once set.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Insert a newly created order.
    ///
    /// # Errors
    ///
    /// Returns error if the order id already exists or the venue id is
    /// already taken by another order.
    async fn insert(&self, order: &Order) -> Result<(), StoreError>;

    /// Update an existing order.
    ///
    /// # Errors
    ///
    /// Returns error if the order does not exist or the venue id is
    /// already taken by another order.
    async fn update(&self, order: &Order) -> Result<(), StoreError>;

    /// Find an order by its local ID.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    async fn get(&self, id: &OrderId) -> Result<Option<Order>, StoreError>;

    /// Find an order by the venue's order ID.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    async fn get_by_venue_id(&self, venue_id: &VenueOrderId)
    -> Result<Option<Order>, StoreError>;

    /// List orders matching the filter, newest first.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    async fn list(&self, filter: &OrderFilter) -> Result<Vec<Order>, StoreError>;

    /// List all active (non-terminal) orders.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    async fn list_active(&self) -> Result<Vec<Order>, StoreError>;

    /// Total number of orders ever stored.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    async fn count(&self) -> Result<usize, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_builder() {
        let filter = OrderFilter::all()
            .with_symbol(Symbol::new("AAPL"))
            .with_status(OrderStatus::Filled)
            .with_limit(5);

        assert_eq!(filter.symbol.unwrap().as_str(), "AAPL");
        assert_eq!(filter.status, Some(OrderStatus::Filled));
        assert_eq!(filter.limit, Some(5));
    }

    #[test]
    fn store_error_display() {
        let err = StoreError::DuplicateVenueId {
            venue_order_id: "ven-1".to_string(),
        };
        assert!(format!("{err}").contains("ven-1"));
    }
}
