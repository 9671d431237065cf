//! In-memory order store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::order::{Order, OrderFilter, OrderRepository, StoreError};
use crate::domain::shared::{OrderId, VenueOrderId};

/// In-memory implementation of the order repository.
///
/// Orders are indexed by local id with a secondary unique index on the
/// venue order id. Terminal orders are retained; nothing is ever deleted.
#[derive(Debug, Default)]
pub struct InMemoryOrderStore {
    orders: RwLock<HashMap<OrderId, Order>>,
    venue_index: RwLock<HashMap<VenueOrderId, OrderId>>,
}

impl InMemoryOrderStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderStore {
    async fn insert(&self, order: &Order) -> Result<(), StoreError> {
        let mut orders = self.orders.write().await;
        let mut index = self.venue_index.write().await;

        if orders.contains_key(order.id()) {
            return Err(StoreError::DuplicateOrderId {
                order_id: order.id().as_str().to_string(),
            });
        }

        if let Some(venue_id) = order.venue_order_id() {
            if index.contains_key(venue_id) {
                return Err(StoreError::DuplicateVenueId {
                    venue_order_id: venue_id.as_str().to_string(),
                });
            }
            index.insert(venue_id.clone(), order.id().clone());
        }

        orders.insert(order.id().clone(), order.clone());
        Ok(())
    }

    async fn update(&self, order: &Order) -> Result<(), StoreError> {
        let mut orders = self.orders.write().await;
        let mut index = self.venue_index.write().await;

        if !orders.contains_key(order.id()) {
            return Err(StoreError::NotFound {
                order_id: order.id().as_str().to_string(),
            });
        }

        if let Some(venue_id) = order.venue_order_id() {
            match index.get(venue_id) {
                Some(owner) if owner != order.id() => {
                    return Err(StoreError::DuplicateVenueId {
                        venue_order_id: venue_id.as_str().to_string(),
                    });
                }
                Some(_) => {}
                None => {
                    index.insert(venue_id.clone(), order.id().clone());
                }
            }
        }

        orders.insert(order.id().clone(), order.clone());
        Ok(())
    }

    async fn get(&self, id: &OrderId) -> Result<Option<Order>, StoreError> {
        Ok(self.orders.read().await.get(id).cloned())
    }

    async fn get_by_venue_id(
        &self,
        venue_id: &VenueOrderId,
    ) -> Result<Option<Order>, StoreError> {
        let index = self.venue_index.read().await;
        let Some(order_id) = index.get(venue_id) else {
            return Ok(None);
        };
        Ok(self.orders.read().await.get(order_id).cloned())
    }

    async fn list(&self, filter: &OrderFilter) -> Result<Vec<Order>, StoreError> {
        let orders = self.orders.read().await;

        let mut matching: Vec<Order> = orders
            .values()
            .filter(|o| filter.symbol.as_ref().is_none_or(|s| o.symbol() == s))
            .filter(|o| filter.status.is_none_or(|s| o.status() == s))
            .cloned()
            .collect();

        // Newest first; order id breaks ties deterministically
        matching.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| b.id().as_str().cmp(a.id().as_str()))
        });

        if let Some(limit) = filter.limit {
            matching.truncate(limit);
        }

        Ok(matching)
    }

    async fn list_active(&self) -> Result<Vec<Order>, StoreError> {
        let orders = self.orders.read().await;
        Ok(orders
            .values()
            .filter(|o| o.status().is_active())
            .cloned()
            .collect())
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.orders.read().await.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::{
        CreateOrderCommand, OrderKind, OrderSide, OrderStatus, TradeMode,
    };
    use crate::domain::shared::{InstrumentId, Money, Quantity, Symbol};
    use rust_decimal_macros::dec;

    fn make_order(symbol: &str) -> Order {
        Order::new(
            CreateOrderCommand {
                symbol: Symbol::new(symbol),
                side: OrderSide::Buy,
                kind: OrderKind::Limit,
                quantity: Quantity::from_i64(10),
                limit_price: Some(Money::new(dec!(150.00))),
                stop_price: None,
                mode: TradeMode::Simulated,
                strategy_id: None,
                annotation: None,
            },
            InstrumentId::new(symbol),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn insert_and_get() {
        let store = InMemoryOrderStore::new();
        let order = make_order("AAPL");

        store.insert(&order).await.unwrap();

        let found = store.get(order.id()).await.unwrap();
        assert_eq!(found.unwrap().id(), order.id());
    }

    #[tokio::test]
    async fn insert_duplicate_order_id_fails() {
        let store = InMemoryOrderStore::new();
        let order = make_order("AAPL");

        store.insert(&order).await.unwrap();
        let err = store.insert(&order).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateOrderId { .. }));
    }

    #[tokio::test]
    async fn update_unknown_order_fails() {
        let store = InMemoryOrderStore::new();
        let order = make_order("AAPL");

        let err = store.update(&order).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn venue_id_index_lookup() {
        let store = InMemoryOrderStore::new();
        let mut order = make_order("AAPL");
        store.insert(&order).await.unwrap();

        order.accept(VenueOrderId::new("ven-1")).unwrap();
        store.update(&order).await.unwrap();

        let found = store
            .get_by_venue_id(&VenueOrderId::new("ven-1"))
            .await
            .unwrap();
        assert_eq!(found.unwrap().id(), order.id());
    }

    #[tokio::test]
    async fn venue_id_unique_constraint() {
        let store = InMemoryOrderStore::new();

        let mut first = make_order("AAPL");
        store.insert(&first).await.unwrap();
        first.accept(VenueOrderId::new("ven-1")).unwrap();
        store.update(&first).await.unwrap();

        let mut second = make_order("MSFT");
        store.insert(&second).await.unwrap();
        second.accept(VenueOrderId::new("ven-1")).unwrap();

        let err = store.update(&second).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateVenueId { .. }));
    }

    #[tokio::test]
    async fn list_filters_and_orders_newest_first() {
        let store = InMemoryOrderStore::new();

        let aapl1 = make_order("AAPL");
        store.insert(&aapl1).await.unwrap();
        let msft = make_order("MSFT");
        store.insert(&msft).await.unwrap();
        let aapl2 = make_order("AAPL");
        store.insert(&aapl2).await.unwrap();

        let all = store.list(&OrderFilter::all()).await.unwrap();
        assert_eq!(all.len(), 3);
        for pair in all.windows(2) {
            assert!(pair[0].created_at() >= pair[1].created_at());
        }

        let aapl_only = store
            .list(&OrderFilter::all().with_symbol(Symbol::new("AAPL")))
            .await
            .unwrap();
        assert_eq!(aapl_only.len(), 2);

        let limited = store
            .list(&OrderFilter::all().with_limit(1))
            .await
            .unwrap();
        assert_eq!(limited.len(), 1);
    }

    #[tokio::test]
    async fn list_by_status() {
        let store = InMemoryOrderStore::new();

        let pending = make_order("AAPL");
        store.insert(&pending).await.unwrap();

        let mut submitted = make_order("MSFT");
        store.insert(&submitted).await.unwrap();
        submitted.accept(VenueOrderId::new("ven-1")).unwrap();
        store.update(&submitted).await.unwrap();

        let found = store
            .list(&OrderFilter::all().with_status(OrderStatus::Submitted))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id(), submitted.id());
    }

    #[tokio::test]
    async fn list_active_excludes_terminal() {
        let store = InMemoryOrderStore::new();

        let active = make_order("AAPL");
        store.insert(&active).await.unwrap();

        let mut errored = make_order("MSFT");
        store.insert(&errored).await.unwrap();
        errored.fail_submission("venue unreachable").unwrap();
        store.update(&errored).await.unwrap();

        let found = store.list_active().await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id(), active.id());
        assert_eq!(store.count().await.unwrap(), 2);
    }
}
