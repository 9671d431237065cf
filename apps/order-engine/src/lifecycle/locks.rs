//! Per-order serialization tokens.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::OwnedMutexGuard;

use crate::domain::shared::OrderId;

/// Map of per-order async mutexes.
///
/// Every mutation of a given order happens under that order's token, so
/// mutations are serialized per order id without any global lock. The
/// lifecycle manager and the reconciliation loop share one map.
#[derive(Debug, Default)]
pub struct OrderLockMap {
    locks: Mutex<HashMap<OrderId, Arc<tokio::sync::Mutex<()>>>>,
}

impl OrderLockMap {
    /// Create an empty lock map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the exclusive token for an order, creating it on first use.
    pub async fn acquire(&self, order_id: &OrderId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self
                .locks
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            Arc::clone(
                map.entry(order_id.clone())
                    .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(()))),
            )
        };
        lock.lock_owned().await
    }
}
