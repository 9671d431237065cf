//! Order aggregate root.
//!
//! The Order aggregate owns the lifecycle state machine from creation
//! through terminal outcome. All mutation goes through transition methods
//! that enforce the machine; a terminal or anomalous order is frozen.

use serde::{Deserialize, Serialize};

use super::errors::OrderError;
use super::events::{
    OrderCancelled, OrderCreated, OrderEvent, OrderFailed, OrderFilled, OrderPartiallyFilled,
    OrderRejected, OrderSubmitted, TransitionActor,
};
use super::value_objects::{
    Anomaly, CancelReason, Fill, FillApplication, FillState, OrderKind, OrderSide, OrderStatus,
    RejectReason, TradeMode,
};
use crate::domain::shared::{InstrumentId, Money, OrderId, Quantity, StrategyId, Symbol, Timestamp, VenueOrderId};

/// Command to create a new order.
#[derive(Debug, Clone)]
pub struct CreateOrderCommand {
    /// Symbol to trade.
    pub symbol: Symbol,
    /// Order side.
    pub side: OrderSide,
    /// Order kind.
    pub kind: OrderKind,
    /// Quantity to trade (whole units).
    pub quantity: Quantity,
    /// Limit price (required for Limit/StopLimit).
    pub limit_price: Option<Money>,
    /// Stop price (required for Stop/StopLimit).
    pub stop_price: Option<Money>,
    /// Simulated or real-money execution.
    pub mode: TradeMode,
    /// Strategy that originated the order, if any.
    pub strategy_id: Option<StrategyId>,
    /// Free-text annotation.
    pub annotation: Option<String>,
}

impl CreateOrderCommand {
    /// Validate the command parameters.
    ///
    /// # Errors
    ///
    /// Returns error if required parameters are missing or invalid.
    /// Nothing is persisted on failure.
    pub fn validate(&self) -> Result<(), OrderError> {
        self.symbol
            .validate()
            .map_err(|e| OrderError::InvalidParameters {
                field: "symbol".to_string(),
                message: e.to_string(),
            })?;

        self.quantity
            .validate_for_order()
            .map_err(|e| OrderError::InvalidParameters {
                field: "quantity".to_string(),
                message: e.to_string(),
            })?;

        if self.kind.requires_limit_price() && self.limit_price.is_none() {
            return Err(OrderError::InvalidParameters {
                field: "limit_price".to_string(),
                message: format!("Limit price required for {} orders", self.kind),
            });
        }

        if self.kind.requires_stop_price() && self.stop_price.is_none() {
            return Err(OrderError::InvalidParameters {
                field: "stop_price".to_string(),
                message: format!("Stop price required for {} orders", self.kind),
            });
        }

        if let Some(price) = &self.limit_price {
            price
                .validate_as_price()
                .map_err(|e| OrderError::InvalidParameters {
                    field: "limit_price".to_string(),
                    message: e.to_string(),
                })?;
        }

        if let Some(price) = &self.stop_price {
            price
                .validate_as_price()
                .map_err(|e| OrderError::InvalidParameters {
                    field: "stop_price".to_string(),
                    message: e.to_string(),
                })?;
        }

        Ok(())
    }
}

/// Order aggregate root.
///
/// Mutated only through transition methods; terminal orders are frozen, and
/// orders flagged with an anomaly reject further automatic mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    symbol: Symbol,
    instrument_id: InstrumentId,
    side: OrderSide,
    kind: OrderKind,
    quantity: Quantity,
    limit_price: Option<Money>,
    stop_price: Option<Money>,
    mode: TradeMode,
    status: OrderStatus,
    fill: FillState,
    venue_order_id: Option<VenueOrderId>,
    strategy_id: Option<StrategyId>,
    annotation: Option<String>,
    status_message: Option<String>,
    anomaly: Option<Anomaly>,
    #[serde(skip)]
    events: Vec<OrderEvent>,
    created_at: Timestamp,
    submitted_at: Option<Timestamp>,
    filled_at: Option<Timestamp>,
    updated_at: Timestamp,
}

impl Order {
    /// Create a new PENDING order from a validated command.
    ///
    /// `instrument_id` is the catalog-resolved reference for the command's
    /// symbol. Generates an `OrderCreated` event.
    ///
    /// # Errors
    ///
    /// Returns error if command validation fails.
    pub fn new(cmd: CreateOrderCommand, instrument_id: InstrumentId) -> Result<Self, OrderError> {
        cmd.validate()?;

        let id = OrderId::generate();
        let now = Timestamp::now();

        let mut order = Self {
            id: id.clone(),
            symbol: cmd.symbol.clone(),
            instrument_id,
            side: cmd.side,
            kind: cmd.kind,
            quantity: cmd.quantity,
            limit_price: cmd.limit_price,
            stop_price: cmd.stop_price,
            mode: cmd.mode,
            status: OrderStatus::Pending,
            fill: FillState::new(cmd.quantity),
            venue_order_id: None,
            strategy_id: cmd.strategy_id,
            annotation: cmd.annotation,
            status_message: None,
            anomaly: None,
            events: Vec::new(),
            created_at: now,
            submitted_at: None,
            filled_at: None,
            updated_at: now,
        };

        order.events.push(OrderEvent::Created(OrderCreated {
            order_id: id,
            symbol: cmd.symbol,
            side: cmd.side,
            quantity: cmd.quantity,
            occurred_at: now,
        }));

        Ok(order)
    }

    // ========================================================================
    // Getters
    // ========================================================================

    /// Get the order ID.
    #[must_use]
    pub const fn id(&self) -> &OrderId {
        &self.id
    }

    /// Get the symbol.
    #[must_use]
    pub const fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    /// Get the resolved instrument reference.
    #[must_use]
    pub const fn instrument_id(&self) -> &InstrumentId {
        &self.instrument_id
    }

    /// Get the order side.
    #[must_use]
    pub const fn side(&self) -> OrderSide {
        self.side
    }

    /// Get the order kind.
    #[must_use]
    pub const fn kind(&self) -> OrderKind {
        self.kind
    }

    /// Get the order quantity.
    #[must_use]
    pub const fn quantity(&self) -> Quantity {
        self.quantity
    }

    /// Get the limit price.
    #[must_use]
    pub const fn limit_price(&self) -> Option<Money> {
        self.limit_price
    }

    /// Get the stop price.
    #[must_use]
    pub const fn stop_price(&self) -> Option<Money> {
        self.stop_price
    }

    /// Get the trade mode.
    #[must_use]
    pub const fn mode(&self) -> TradeMode {
        self.mode
    }

    /// Get the current status.
    #[must_use]
    pub const fn status(&self) -> OrderStatus {
        self.status
    }

    /// Get the fill state.
    #[must_use]
    pub const fn fill(&self) -> &FillState {
        &self.fill
    }

    /// Get the venue order ID, if the order reached the venue.
    #[must_use]
    pub const fn venue_order_id(&self) -> Option<&VenueOrderId> {
        self.venue_order_id.as_ref()
    }

    /// Get the originating strategy, if any.
    #[must_use]
    pub const fn strategy_id(&self) -> Option<&StrategyId> {
        self.strategy_id.as_ref()
    }

    /// Get the annotation, if any.
    #[must_use]
    pub fn annotation(&self) -> Option<&str> {
        self.annotation.as_deref()
    }

    /// Get the status message, if any.
    #[must_use]
    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    /// Get the anomaly flag, if any.
    #[must_use]
    pub const fn anomaly(&self) -> Option<Anomaly> {
        self.anomaly
    }

    /// Get the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Get the submission timestamp, if the order reached the venue.
    #[must_use]
    pub const fn submitted_at(&self) -> Option<Timestamp> {
        self.submitted_at
    }

    /// Get the fill-completion timestamp, if the order filled.
    #[must_use]
    pub const fn filled_at(&self) -> Option<Timestamp> {
        self.filled_at
    }

    /// Get the last update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    /// Returns true if no further automatic mutation is permitted.
    #[must_use]
    pub const fn is_frozen(&self) -> bool {
        self.status.is_terminal() || self.anomaly.is_some()
    }

    // ========================================================================
    // State transitions
    // ========================================================================

    /// Mark the order accepted by the venue.
    ///
    /// Records the venue order id and the submission timestamp, both set
    /// exactly once. Generates an `OrderSubmitted` event.
    ///
    /// # Errors
    ///
    /// Returns error unless the order is PENDING.
    pub fn accept(&mut self, venue_order_id: VenueOrderId) -> Result<(), OrderError> {
        if self.status != OrderStatus::Pending {
            return Err(OrderError::InvalidStateTransition {
                from: self.status,
                to: OrderStatus::Submitted,
                reason: "Only a PENDING order can be submitted".to_string(),
            });
        }

        let now = Timestamp::now();
        self.venue_order_id = Some(venue_order_id.clone());
        self.status = OrderStatus::Submitted;
        self.submitted_at = Some(now);
        self.updated_at = now;

        self.events.push(OrderEvent::Submitted(OrderSubmitted {
            order_id: self.id.clone(),
            venue_order_id,
            occurred_at: now,
        }));

        Ok(())
    }

    /// Mark submission as failed before the venue accepted the order.
    ///
    /// The order moves to ERROR with the failure message recorded; the
    /// venue order id stays unset. Generates an `OrderFailed` event.
    ///
    /// # Errors
    ///
    /// Returns error unless the order is PENDING.
    pub fn fail_submission(&mut self, message: impl Into<String>) -> Result<(), OrderError> {
        if self.status != OrderStatus::Pending {
            return Err(OrderError::InvalidStateTransition {
                from: self.status,
                to: OrderStatus::Error,
                reason: "Only a PENDING order can fail submission".to_string(),
            });
        }

        let message = message.into();
        let now = Timestamp::now();
        self.status = OrderStatus::Error;
        self.status_message = Some(message.clone());
        self.updated_at = now;

        self.events.push(OrderEvent::Failed(OrderFailed {
            order_id: self.id.clone(),
            message,
            occurred_at: now,
        }));

        Ok(())
    }

    /// Apply an execution fill to the order.
    ///
    /// Idempotent per execution id: a duplicate returns
    /// `FillApplication::Duplicate` without changing state or emitting
    /// events. A fill exceeding the remaining quantity is clamped and the
    /// order is flagged with `Anomaly::Overfill`. The fill-completion
    /// timestamp is set only on the transition into FILLED.
    ///
    /// # Errors
    ///
    /// Returns error if the order is frozen or cannot receive fills.
    pub fn apply_fill(
        &mut self,
        fill: Fill,
        actor: TransitionActor,
    ) -> Result<FillApplication, OrderError> {
        if let Some(anomaly) = self.anomaly {
            return Err(OrderError::Frozen {
                detail: format!("anomaly: {anomaly}"),
            });
        }
        if !self.status.can_fill() {
            return Err(OrderError::CannotFill {
                status: self.status,
            });
        }

        let fill_qty = fill.quantity;
        let fill_price = fill.price;

        let application = self.fill.apply_fill(fill);
        if application == FillApplication::Duplicate {
            return Ok(application);
        }

        let now = Timestamp::now();
        self.updated_at = now;

        if application == FillApplication::Clamped {
            self.anomaly = Some(Anomaly::Overfill);
            self.status_message = Some(format!(
                "Overfill clamped: fill of {fill_qty} exceeded remaining quantity"
            ));
        }

        self.events
            .push(OrderEvent::PartiallyFilled(OrderPartiallyFilled {
                order_id: self.id.clone(),
                fill_quantity: fill_qty,
                fill_price,
                cumulative_quantity: self.fill.cum_qty(),
                leaves_quantity: self.fill.leaves_qty(),
                vwap: self.fill.avg_px(),
                actor,
                occurred_at: now,
            }));

        if self.fill.is_filled() {
            self.status = OrderStatus::Filled;
            if self.filled_at.is_none() {
                self.filled_at = Some(now);
            }
            self.events.push(OrderEvent::Filled(OrderFilled {
                order_id: self.id.clone(),
                total_quantity: self.quantity,
                average_price: self.fill.avg_px(),
                actor,
                occurred_at: now,
            }));
        } else {
            self.status = OrderStatus::PartiallyFilled;
        }

        Ok(application)
    }

    /// Cancel the order.
    ///
    /// Partial fill data survives cancellation. Generates an
    /// `OrderCancelled` event.
    ///
    /// # Errors
    ///
    /// Returns error if the order is not cancelable, or if it is frozen by
    /// an anomaly and the caller is the reconciliation loop (anomalous
    /// orders require manual review).
    pub fn cancel(&mut self, reason: CancelReason, actor: TransitionActor) -> Result<(), OrderError> {
        if let Some(anomaly) = self.anomaly {
            if actor == TransitionActor::Reconciliation {
                return Err(OrderError::Frozen {
                    detail: format!("anomaly: {anomaly}"),
                });
            }
        }
        if !self.status.is_cancelable() {
            return Err(OrderError::CannotCancel {
                status: self.status,
            });
        }

        let now = Timestamp::now();
        self.status = OrderStatus::Cancelled;
        self.updated_at = now;

        self.events.push(OrderEvent::Cancelled(OrderCancelled {
            order_id: self.id.clone(),
            reason,
            filled_quantity: self.fill.cum_qty(),
            actor,
            occurred_at: now,
        }));

        Ok(())
    }

    /// Reject the order.
    ///
    /// Any non-terminal order can be rejected when the venue reports it.
    /// Generates an `OrderRejected` event.
    ///
    /// # Errors
    ///
    /// Returns error if the order is already terminal, or frozen by an
    /// anomaly when the reconciliation loop is the caller.
    pub fn reject(&mut self, reason: RejectReason, actor: TransitionActor) -> Result<(), OrderError> {
        if let Some(anomaly) = self.anomaly {
            if actor == TransitionActor::Reconciliation {
                return Err(OrderError::Frozen {
                    detail: format!("anomaly: {anomaly}"),
                });
            }
        }
        if self.status.is_terminal() {
            return Err(OrderError::InvalidStateTransition {
                from: self.status,
                to: OrderStatus::Rejected,
                reason: "Cannot reject a terminal order".to_string(),
            });
        }

        let now = Timestamp::now();
        self.status = OrderStatus::Rejected;
        self.status_message = Some(reason.as_str().to_string());
        self.updated_at = now;

        self.events.push(OrderEvent::Rejected(OrderRejected {
            order_id: self.id.clone(),
            reason,
            actor,
            occurred_at: now,
        }));

        Ok(())
    }

    /// Flag the order with a data-integrity anomaly.
    ///
    /// Freezes the order from further automatic mutation. The flag is
    /// never cleared automatically.
    pub fn mark_anomalous(&mut self, anomaly: Anomaly, note: impl Into<String>) {
        self.anomaly = Some(anomaly);
        self.status_message = Some(note.into());
        self.updated_at = Timestamp::now();
    }

    /// Replace the free-text annotation.
    pub fn annotate(&mut self, text: impl Into<String>) {
        self.annotation = Some(text.into());
        self.updated_at = Timestamp::now();
    }

    // ========================================================================
    // Events
    // ========================================================================

    /// Drain accumulated domain events.
    pub fn drain_events(&mut self) -> Vec<OrderEvent> {
        std::mem::take(&mut self.events)
    }

    /// Get pending events without draining.
    #[must_use]
    pub fn pending_events(&self) -> &[OrderEvent] {
        &self.events
    }
}
