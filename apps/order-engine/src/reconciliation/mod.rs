//! Order reconciliation against the venue.
//!
//! Periodic and on-demand healing of drift between the order store and the
//! venue's view, caused by connection loss or missed events. The policy,
//! highest priority first:
//!
//! 1. Venue reports FILLED but local is not: apply the missing fill
//!    deltas re-derived from the venue record, never invented.
//! 2. Venue has no record of a SUBMITTED/PARTIALLY_FILLED order: move it
//!    to CANCELLED, annotated `reconciled-missing`.
//! 3. Venue reports REJECTED and local disagrees: move to REJECTED.
//! 4. Local SUBMITTED without a venue order id: flag an anomaly, never
//!    guess.
//!
//! A pass never regresses a terminal local state and never fabricates fill
//! progress the venue did not confirm.

mod error;
mod report;

pub use error::ReconciliationError;
pub use report::{Correction, CorrectionKind, ReconciliationReport};

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tracing::{debug, info, warn};

use crate::config::ReconciliationConfig;
use crate::domain::order::{
    Anomaly, CancelReason, Fill, Order, OrderRepository, OrderStatus, RejectReason,
    TransitionActor,
};
use crate::domain::shared::{ExecutionId, Money, Timestamp, VenueOrderId};
use crate::gateway::{BrokerGateway, GatewayError, VenueOrderReport, VenueOrderStatus};
use crate::lifecycle::{OrderLifecycleManager, OrderLockMap};

/// Running tallies of a single pass, folded into the final report.
struct PassState {
    corrections: Vec<Correction>,
    anomalies_flagged: usize,
    orders_checked: usize,
}

/// Reconciles local order state against the venue's authoritative view.
///
/// Shares the gateway, store, and per-order lock map with the lifecycle
/// manager it is built from, so corrective transitions obey the same
/// per-order serialization as direct ones. Venue queries are made without
/// holding any order's token; tokens are only taken to commit.
pub struct Reconciler<G: BrokerGateway> {
    gateway: Arc<G>,
    store: Arc<dyn OrderRepository>,
    locks: Arc<OrderLockMap>,
    gateway_timeout: Duration,
    config: ReconciliationConfig,
}

impl<G: BrokerGateway> Reconciler<G> {
    /// Create a reconciler sharing the manager's gateway, store, and locks.
    #[must_use]
    pub fn new(manager: &OrderLifecycleManager<G>, config: ReconciliationConfig) -> Self {
        Self {
            gateway: manager.gateway_arc(),
            store: manager.store_arc(),
            locks: manager.locks_arc(),
            gateway_timeout: manager.gateway_timeout(),
            config,
        }
    }

    /// Run one reconciliation pass over all non-terminal orders.
    ///
    /// PENDING orders with no venue id are excluded; there is nothing to
    /// reconcile. Transient gateway failures on a single order skip that
    /// order; a failure to fetch the venue's open-order set aborts the
    /// pass with nothing changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the venue's open-order set cannot be fetched or
    /// the store fails.
    pub async fn reconcile_once(&self) -> Result<ReconciliationReport, ReconciliationError> {
        let started = std::time::Instant::now();
        debug!(venue = self.gateway.venue_name(), "Starting reconciliation pass");

        let open_orders = self.call_gateway(self.gateway.open_orders()).await?;
        let open_by_id: HashMap<VenueOrderId, VenueOrderReport> = open_orders
            .into_iter()
            .map(|r| (r.venue_order_id.clone(), r))
            .collect();

        let mut pass = PassState {
            corrections: Vec::new(),
            anomalies_flagged: 0,
            orders_checked: 0,
        };

        for order in self.store.list_active().await? {
            if order.status() == OrderStatus::Pending {
                continue;
            }
            pass.orders_checked += 1;

            let Some(venue_id) = order.venue_order_id().cloned() else {
                self.flag_missing_venue_id(&order, &mut pass).await?;
                continue;
            };

            let report = match open_by_id.get(&venue_id) {
                Some(report) => Some(report.clone()),
                None => match self.call_gateway(self.gateway.order_status(&venue_id)).await {
                    Ok(report) => Some(report),
                    Err(GatewayError::OrderNotFound(_)) => None,
                    Err(error) => {
                        warn!(
                            order_id = %order.id(),
                            venue_order_id = %venue_id,
                            error = %error,
                            "Venue status query failed; order skipped this pass"
                        );
                        continue;
                    }
                },
            };

            match report {
                None => {
                    self.cancel_missing(order.id(), &venue_id, &mut pass).await?;
                }
                Some(report) => match report.status {
                    VenueOrderStatus::Filled
                    | VenueOrderStatus::Open
                    | VenueOrderStatus::PartiallyFilled => {
                        self.sync_fills(order.id(), &venue_id, &report, &mut pass).await?;
                    }
                    VenueOrderStatus::Cancelled => {
                        self.cancel_from_venue(order.id(), &venue_id, &mut pass).await?;
                    }
                    VenueOrderStatus::Rejected => {
                        self.reject_from_venue(order.id(), &venue_id, &mut pass).await?;
                    }
                },
            }
        }

        let report = ReconciliationReport {
            corrections: pass.corrections,
            anomalies_flagged: pass.anomalies_flagged,
            orders_checked: pass.orders_checked,
            completed_at: Timestamp::now(),
            duration_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        };

        info!(
            checked = report.orders_checked,
            corrected = report.corrected(),
            anomalies = report.anomalies_flagged,
            duration_ms = report.duration_ms,
            "Reconciliation pass completed"
        );

        Ok(report)
    }

    /// Drive periodic reconciliation until the task is cancelled.
    ///
    /// Each interval carries random jitter so multiple engine instances do
    /// not poll the venue in lockstep. Failed passes are logged and
    /// retried on the next tick.
    pub async fn run_periodic(&self) {
        loop {
            let jitter_ms = if self.config.jitter_ms == 0 {
                0
            } else {
                rand::rng().random_range(0..self.config.jitter_ms)
            };
            tokio::time::sleep(self.config.interval() + Duration::from_millis(jitter_ms)).await;

            if let Err(error) = self.reconcile_once().await {
                warn!(error = %error, "Reconciliation pass skipped");
            }
        }
    }

    /// Policy 4: SUBMITTED with no venue order id should not happen.
    async fn flag_missing_venue_id(
        &self,
        order: &Order,
        pass: &mut PassState,
    ) -> Result<(), ReconciliationError> {
        let _guard = self.locks.acquire(order.id()).await;
        let Some(mut fresh) = self.store.get(order.id()).await? else {
            return Ok(());
        };

        if fresh.status().is_terminal() || fresh.venue_order_id().is_some() {
            return Ok(());
        }
        if fresh.anomaly().is_some() {
            return Ok(());
        }

        warn!(
            order_id = %fresh.id(),
            status = %fresh.status(),
            "Order reached the venue-facing state without a venue id; flagged"
        );
        fresh.mark_anomalous(
            Anomaly::Reconciliation,
            "SUBMITTED without a venue order id",
        );
        self.store.update(&fresh).await?;
        pass.anomalies_flagged += 1;
        Ok(())
    }

    /// Policy 2: the venue no longer has the order.
    async fn cancel_missing(
        &self,
        order_id: &crate::domain::shared::OrderId,
        venue_id: &VenueOrderId,
        pass: &mut PassState,
    ) -> Result<(), ReconciliationError> {
        let _guard = self.locks.acquire(order_id).await;
        let Some(mut fresh) = self.store.get(order_id).await? else {
            return Ok(());
        };
        if fresh.status().is_terminal() {
            return Ok(());
        }

        fresh.annotate(CancelReason::RECONCILED_MISSING);
        match fresh.cancel(CancelReason::reconciled_missing(), TransitionActor::Reconciliation) {
            Ok(()) => {
                self.store.update(&fresh).await?;
                info!(
                    order_id = %order_id,
                    venue_order_id = %venue_id,
                    "Venue has no record of order; moved to CANCELLED"
                );
                pass.corrections.push(Correction {
                    order_id: order_id.clone(),
                    venue_order_id: Some(venue_id.clone()),
                    kind: CorrectionKind::CancelledMissing,
                    detail: "no venue record".to_string(),
                });
            }
            Err(error) => {
                warn!(order_id = %order_id, error = %error, "Corrective cancel refused");
            }
        }
        Ok(())
    }

    /// The venue reports the order cancelled.
    async fn cancel_from_venue(
        &self,
        order_id: &crate::domain::shared::OrderId,
        venue_id: &VenueOrderId,
        pass: &mut PassState,
    ) -> Result<(), ReconciliationError> {
        let _guard = self.locks.acquire(order_id).await;
        let Some(mut fresh) = self.store.get(order_id).await? else {
            return Ok(());
        };
        if fresh.status().is_terminal() {
            return Ok(());
        }

        match fresh.cancel(
            CancelReason::new("venue-cancelled"),
            TransitionActor::Reconciliation,
        ) {
            Ok(()) => {
                self.store.update(&fresh).await?;
                info!(
                    order_id = %order_id,
                    venue_order_id = %venue_id,
                    "Venue reports order cancelled; local state synced"
                );
                pass.corrections.push(Correction {
                    order_id: order_id.clone(),
                    venue_order_id: Some(venue_id.clone()),
                    kind: CorrectionKind::CancelledFromVenue,
                    detail: "venue reports cancelled".to_string(),
                });
            }
            Err(error) => {
                warn!(order_id = %order_id, error = %error, "Corrective cancel refused");
            }
        }
        Ok(())
    }

    /// Policy 3: the venue reports the order rejected.
    async fn reject_from_venue(
        &self,
        order_id: &crate::domain::shared::OrderId,
        venue_id: &VenueOrderId,
        pass: &mut PassState,
    ) -> Result<(), ReconciliationError> {
        let _guard = self.locks.acquire(order_id).await;
        let Some(mut fresh) = self.store.get(order_id).await? else {
            return Ok(());
        };
        if fresh.status().is_terminal() {
            return Ok(());
        }

        match fresh.reject(RejectReason::reconciled(), TransitionActor::Reconciliation) {
            Ok(()) => {
                self.store.update(&fresh).await?;
                info!(
                    order_id = %order_id,
                    venue_order_id = %venue_id,
                    "Venue reports order rejected; local state synced"
                );
                pass.corrections.push(Correction {
                    order_id: order_id.clone(),
                    venue_order_id: Some(venue_id.clone()),
                    kind: CorrectionKind::RejectedFromVenue,
                    detail: "venue reports rejected".to_string(),
                });
            }
            Err(error) => {
                warn!(order_id = %order_id, error = %error, "Corrective reject refused");
            }
        }
        Ok(())
    }

    /// Policy 1 (and partial-gap closing): apply fill deltas the venue
    /// confirms but the local record is missing.
    ///
    /// The delta quantity and price are re-derived from the venue's
    /// cumulative quantity and VWAP so the local VWAP lands exactly on the
    /// venue's. The synthetic execution id is deterministic per
    /// (venue order, cumulative quantity), so repeated passes are
    /// idempotent.
    async fn sync_fills(
        &self,
        order_id: &crate::domain::shared::OrderId,
        venue_id: &VenueOrderId,
        report: &VenueOrderReport,
        pass: &mut PassState,
    ) -> Result<(), ReconciliationError> {
        let _guard = self.locks.acquire(order_id).await;
        let Some(mut fresh) = self.store.get(order_id).await? else {
            return Ok(());
        };
        if fresh.status().is_terminal() {
            return Ok(());
        }

        let local_cum = fresh.fill().cum_qty();
        let remote_cum = report.filled_quantity;

        if remote_cum < local_cum {
            warn!(
                order_id = %order_id,
                venue_order_id = %venue_id,
                local = %local_cum,
                remote = %remote_cum,
                "Venue reports less filled than local; flagged for review"
            );
            fresh.mark_anomalous(
                Anomaly::Reconciliation,
                format!("venue filled {remote_cum} behind local {local_cum}"),
            );
            self.store.update(&fresh).await?;
            pass.anomalies_flagged += 1;
            return Ok(());
        }

        if remote_cum == local_cum {
            return Ok(());
        }

        let delta = remote_cum - local_cum;
        let delta_value = report.avg_fill_price.amount() * remote_cum.amount()
            - fresh.fill().avg_px().amount() * local_cum.amount();
        let delta_price = Money::new(delta_value / delta.amount());

        let fill = Fill::new(
            ExecutionId::new(format!("recon-{venue_id}-{remote_cum}")),
            delta,
            delta_price,
            Timestamp::now(),
        );

        match fresh.apply_fill(fill, TransitionActor::Reconciliation) {
            Ok(crate::domain::order::FillApplication::Duplicate) => Ok(()),
            Ok(_) => {
                self.store.update(&fresh).await?;
                info!(
                    order_id = %order_id,
                    venue_order_id = %venue_id,
                    delta = %delta,
                    new_status = %fresh.status(),
                    "Missing fill deltas applied from venue record"
                );
                pass.corrections.push(Correction {
                    order_id: order_id.clone(),
                    venue_order_id: Some(venue_id.clone()),
                    kind: CorrectionKind::FilledFromVenue,
                    detail: format!("applied missing fill of {delta} from venue record"),
                });
                Ok(())
            }
            Err(error) => {
                warn!(order_id = %order_id, error = %error, "Corrective fill refused");
                Ok(())
            }
        }
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
}
