//! Order lifecycle manager.
//!
//! Validates and creates orders, drives state transitions, issues
//! submit/cancel calls to the venue gateway, and applies execution events
//! from the venue stream. All mutations of a given order are serialized
//! through the shared per-order lock map.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::BoxStream;
use tokio_stream::StreamExt;
use tracing::{debug, info, warn};

use super::errors::{
    CancelOrderError, CreateOrderError, ExecutionOutcome, RejectOrderError, SubmitOrderError,
};
use super::locks::OrderLockMap;
use super::stats::OrderStatistics;
use crate::domain::order::{
    CancelReason, CreateOrderCommand, Order, OrderError, OrderFilter, OrderRepository,
    RejectReason, StoreError, TransitionActor,
};
use crate::domain::shared::OrderId;
use crate::gateway::{BrokerGateway, ExecutionEvent, GatewayError, OrderTicket};
use crate::instruments::InstrumentCatalog;

const DEFAULT_GATEWAY_TIMEOUT: Duration = Duration::from_secs(5);

/// Central manager for the order lifecycle.
///
/// Generic over the gateway type so venue integrations can be swapped and
/// tests can inject a scriptable double. The store and the instrument
/// catalog are injected as trait objects.
pub struct OrderLifecycleManager<G: BrokerGateway> {
    gateway: Arc<G>,
    store: Arc<dyn OrderRepository>,
    catalog: Arc<dyn InstrumentCatalog>,
    locks: Arc<OrderLockMap>,
    gateway_timeout: Duration,
}

impl<G: BrokerGateway> OrderLifecycleManager<G> {
    /// Create a new lifecycle manager with the default gateway timeout.
    #[must_use]
    pub fn new(
        gateway: Arc<G>,
        store: Arc<dyn OrderRepository>,
        catalog: Arc<dyn InstrumentCatalog>,
    ) -> Self {
        Self {
            gateway,
            store,
            catalog,
            locks: Arc::new(OrderLockMap::new()),
            gateway_timeout: DEFAULT_GATEWAY_TIMEOUT,
        }
    }

    /// Override the bounded timeout applied to gateway calls.
    #[must_use]
    pub fn with_gateway_timeout(mut self, timeout: Duration) -> Self {
        self.gateway_timeout = timeout;
        self
    }

    pub(crate) fn gateway_arc(&self) -> Arc<G> {
        Arc::clone(&self.gateway)
    }

    pub(crate) fn store_arc(&self) -> Arc<dyn OrderRepository> {
        Arc::clone(&self.store)
    }

    pub(crate) fn locks_arc(&self) -> Arc<OrderLockMap> {
        Arc::clone(&self.locks)
    }

    pub(crate) const fn gateway_timeout(&self) -> Duration {
        self.gateway_timeout
    }

    /// Validate and persist a new PENDING order.
    ///
    /// Submission is a separate explicit step so a create can be reviewed
    /// or retried before money moves.
    ///
    /// # Errors
    ///
    /// Returns `CreateOrderError::Validation` or `::UnknownInstrument`
    /// without persisting anything.
    pub async fn create_order(&self, cmd: CreateOrderCommand) -> Result<OrderId, CreateOrderError> {
        let instrument_id = self.catalog.resolve(&cmd.symbol).ok_or_else(|| {
            CreateOrderError::UnknownInstrument {
                symbol: cmd.symbol.as_str().to_string(),
            }
        })?;

        let mut order = Order::new(cmd, instrument_id).map_err(CreateOrderError::Validation)?;
        self.store.insert(&order).await?;
        Self::log_events(&mut order);

        info!(
            order_id = %order.id(),
            symbol = %order.symbol(),
            side = %order.side(),
            kind = %order.kind(),
            quantity = %order.quantity(),
            mode = %order.mode(),
            "Order created"
        );

        Ok(order.id().clone())
    }

    /// Submit a PENDING order to the venue.
    ///
    /// The order's exclusive token is held across the gateway call (which
    /// is bounded by the configured timeout), so concurrent submits of the
    /// same order produce exactly one gateway call; the loser observes
    /// SUBMITTED and fails with `InvalidState`.
    ///
    /// On venue acceptance the order becomes SUBMITTED with the venue id
    /// recorded. On gateway unavailability or a venue error it becomes
    /// ERROR. On a client-side timeout it stays PENDING: the true outcome
    /// is unknown and reconciliation will discover it.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `InvalidState`, or the gateway failure.
    pub async fn submit_order(&self, order_id: &OrderId) -> Result<(), SubmitOrderError> {
        let _guard = self.locks.acquire(order_id).await;

        let mut order =
            self.store
                .get(order_id)
                .await?
                .ok_or_else(|| SubmitOrderError::NotFound {
                    order_id: order_id.as_str().to_string(),
                })?;

        if order.status() != crate::domain::order::OrderStatus::Pending {
            return Err(SubmitOrderError::InvalidState {
                status: order.status(),
            });
        }

        let ticket = OrderTicket {
            client_ref: order.id().clone(),
            symbol: order.symbol().clone(),
            side: order.side(),
            kind: order.kind(),
            quantity: order.quantity(),
            limit_price: order.limit_price(),
            stop_price: order.stop_price(),
            mode: order.mode(),
        };

        info!(
            order_id = %order.id(),
            venue = self.gateway.venue_name(),
            symbol = %ticket.symbol,
            "Submitting order to venue"
        );

        match self.call_gateway(self.gateway.submit_order(&ticket)).await {
            Ok(venue_order_id) => {
                order
                    .accept(venue_order_id.clone())
                    .map_err(|_| SubmitOrderError::InvalidState {
                        status: order.status(),
                    })?;
                self.store.update(&order).await?;
                Self::log_events(&mut order);

                info!(
                    order_id = %order.id(),
                    venue_order_id = %venue_order_id,
                    "Order accepted by venue"
                );
                Ok(())
            }
            Err(timeout @ GatewayError::Timeout { .. }) => {
                // Outcome unknown: the venue may or may not have the order.
                // Leave PENDING and let reconciliation discover the truth.
                warn!(
                    order_id = %order.id(),
                    venue = self.gateway.venue_name(),
                    "Submit timed out; order left PENDING for reconciliation"
                );
                Err(SubmitOrderError::Gateway(timeout))
            }
            Err(error) => {
                order
                    .fail_submission(error.to_string())
                    .map_err(|_| SubmitOrderError::InvalidState {
                        status: order.status(),
                    })?;
                self.store.update(&order).await?;
                Self::log_events(&mut order);

                warn!(
                    order_id = %order.id(),
                    venue = self.gateway.venue_name(),
                    error = %error,
                    "Submit failed; order moved to ERROR"
                );
                Err(SubmitOrderError::Gateway(error))
            }
        }
    }

    /// Cancel an order.
    ///
    /// A PENDING order (never seen by the venue) cancels locally. A
    /// SUBMITTED or PARTIALLY_FILLED order requires venue confirmation
    /// first; on gateway failure local state is left unchanged, because an
    /// in-flight fill racing the cancel must not be discarded.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `InvalidState`, or the gateway failure.
    pub async fn cancel_order(&self, order_id: &OrderId) -> Result<(), CancelOrderError> {
        let _guard = self.locks.acquire(order_id).await;

        let mut order =
            self.store
                .get(order_id)
                .await?
                .ok_or_else(|| CancelOrderError::NotFound {
                    order_id: order_id.as_str().to_string(),
                })?;

        if !order.status().is_cancelable() {
            return Err(CancelOrderError::InvalidState {
                status: order.status(),
            });
        }

        if let Some(venue_order_id) = order.venue_order_id().cloned() {
            self.call_gateway(self.gateway.cancel_order(&venue_order_id))
                .await
                .inspect_err(|error| {
                    warn!(
                        order_id = %order.id(),
                        venue_order_id = %venue_order_id,
                        error = %error,
                        "Cancel not confirmed; order state unchanged"
                    );
                })?;
        }

        order
            .cancel(CancelReason::user_requested(), TransitionActor::Lifecycle)
            .map_err(|e| match e {
                OrderError::CannotCancel { status } => CancelOrderError::InvalidState { status },
                _ => CancelOrderError::InvalidState {
                    status: order.status(),
                },
            })?;
        self.store.update(&order).await?;
        Self::log_events(&mut order);

        info!(order_id = %order.id(), "Order cancelled");
        Ok(())
    }

    /// Reject a non-terminal order with the venue-reported reason.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or `InvalidState`.
    pub async fn reject_order(
        &self,
        order_id: &OrderId,
        reason: RejectReason,
    ) -> Result<(), RejectOrderError> {
        let _guard = self.locks.acquire(order_id).await;

        let mut order =
            self.store
                .get(order_id)
                .await?
                .ok_or_else(|| RejectOrderError::NotFound {
                    order_id: order_id.as_str().to_string(),
                })?;

        order
            .reject(reason, TransitionActor::Lifecycle)
            .map_err(|_| RejectOrderError::InvalidState {
                status: order.status(),
            })?;
        self.store.update(&order).await?;
        Self::log_events(&mut order);

        info!(order_id = %order.id(), "Order rejected");
        Ok(())
    }

    /// Apply one execution event from the venue stream.
    ///
    /// Safe under at-least-once delivery: duplicates are detected by
    /// execution id and ignored. An event for an untracked order is logged
    /// and dropped, never fatal: it can arrive after reconciliation already
    /// closed the order.
    ///
    /// # Errors
    ///
    /// Returns an error only when persistence fails.
    pub async fn apply_execution(
        &self,
        event: &ExecutionEvent,
    ) -> Result<ExecutionOutcome, StoreError> {
        let Some(resolved) = self.store.get_by_venue_id(&event.venue_order_id).await? else {
            warn!(
                venue_order_id = %event.venue_order_id,
                execution_id = %event.fill.execution_id,
                "Execution event for untracked order ignored"
            );
            return Ok(ExecutionOutcome::Unknown);
        };

        let order_id = resolved.id().clone();
        let _guard = self.locks.acquire(&order_id).await;

        // Re-read under the token; the order may have moved since resolution
        let Some(mut order) = self.store.get(&order_id).await? else {
            return Ok(ExecutionOutcome::Unknown);
        };

        match order.apply_fill(event.fill.clone(), TransitionActor::Lifecycle) {
            Ok(crate::domain::order::FillApplication::Duplicate) => {
                debug!(
                    order_id = %order_id,
                    execution_id = %event.fill.execution_id,
                    "Duplicate execution event ignored"
                );
                Ok(ExecutionOutcome::Duplicate)
            }
            Ok(application) => {
                self.store.update(&order).await?;
                Self::log_events(&mut order);

                if application == crate::domain::order::FillApplication::Clamped {
                    warn!(
                        order_id = %order_id,
                        execution_id = %event.fill.execution_id,
                        "Overfill clamped; order flagged for manual review"
                    );
                }
                Ok(ExecutionOutcome::Applied)
            }
            Err(error) => {
                warn!(
                    order_id = %order_id,
                    execution_id = %event.fill.execution_id,
                    error = %error,
                    "Execution event not applicable; skipped"
                );
                Ok(ExecutionOutcome::Skipped)
            }
        }
    }

    /// Consume the gateway's execution stream until it ends.
    ///
    /// Store failures are logged and the stream continues; a single bad
    /// event must not stall fills for every other order.
    pub async fn run_execution_stream(&self, mut stream: BoxStream<'static, ExecutionEvent>) {
        while let Some(event) = stream.next().await {
            if let Err(error) = self.apply_execution(&event).await {
                warn!(
                    venue_order_id = %event.venue_order_id,
                    error = %error,
                    "Failed to apply execution event"
                );
            }
        }
        debug!("Execution stream ended");
    }

    /// Fetch one order by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the store query fails.
    pub async fn get_order(&self, order_id: &OrderId) -> Result<Option<Order>, StoreError> {
        self.store.get(order_id).await
    }

    /// List orders matching the filter, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store query fails.
    pub async fn list_orders(&self, filter: &OrderFilter) -> Result<Vec<Order>, StoreError> {
        self.store.list(filter).await
    }

    /// Compute engine-wide statistics with a per-instrument breakdown.
    ///
    /// # Errors
    ///
    /// Returns an error if the store query fails.
    pub async fn statistics(&self) -> Result<OrderStatistics, StoreError> {
        let orders = self.store.list(&OrderFilter::all()).await?;
        Ok(OrderStatistics::from_orders(&orders))
    }

    /// Run a gateway call under the bounded timeout.
    async fn call_gateway<T>(
        &self,
        call: impl Future<Output = Result<T, GatewayError>>,
    ) -> Result<T, GatewayError> {
        match tokio::time::timeout(self.gateway_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(GatewayError::Timeout {
                timeout_ms: u64::try_from(self.gateway_timeout.as_millis()).unwrap_or(u64::MAX),
            }),
        }
    }

    fn log_events(order: &mut Order) {
        for event in order.drain_events() {
            debug!(
                order_id = %event.order_id(),
                event = event.event_type(),
                "Order event"
            );
        }
    }
}
