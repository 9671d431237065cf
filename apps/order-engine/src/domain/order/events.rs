//! Domain events for order lifecycle transitions.
//!
//! Events capture state transitions for audit and downstream consumers.
//! Each transition records which actor drove it so corrective transitions
//! made by reconciliation are distinguishable from direct ones.

use serde::{Deserialize, Serialize};

use super::value_objects::{CancelReason, OrderSide, RejectReason};
use crate::domain::shared::{Money, OrderId, Quantity, Symbol, Timestamp, VenueOrderId};

/// Who drove a state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransitionActor {
    /// A direct call through the lifecycle manager.
    Lifecycle,
    /// A corrective transition made by the reconciliation loop.
    Reconciliation,
}

/// All possible order events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderEvent {
    /// Order created and persisted as PENDING.
    Created(OrderCreated),
    /// Order accepted by the venue.
    Submitted(OrderSubmitted),
    /// Order partially filled.
    PartiallyFilled(OrderPartiallyFilled),
    /// Order completely filled.
    Filled(OrderFilled),
    /// Order cancelled.
    Cancelled(OrderCancelled),
    /// Order rejected by the venue.
    Rejected(OrderRejected),
    /// Submission failed before the venue accepted the order.
    Failed(OrderFailed),
}

impl OrderEvent {
    /// Get the order ID for this event.
    #[must_use]
    pub fn order_id(&self) -> &OrderId {
        match self {
            Self::Created(e) => &e.order_id,
            Self::Submitted(e) => &e.order_id,
            Self::PartiallyFilled(e) => &e.order_id,
            Self::Filled(e) => &e.order_id,
            Self::Cancelled(e) => &e.order_id,
            Self::Rejected(e) => &e.order_id,
            Self::Failed(e) => &e.order_id,
        }
    }

    /// Get the timestamp when this event occurred.
    #[must_use]
    pub fn occurred_at(&self) -> Timestamp {
        match self {
            Self::Created(e) => e.occurred_at,
            Self::Submitted(e) => e.occurred_at,
            Self::PartiallyFilled(e) => e.occurred_at,
            Self::Filled(e) => e.occurred_at,
            Self::Cancelled(e) => e.occurred_at,
            Self::Rejected(e) => e.occurred_at,
            Self::Failed(e) => e.occurred_at,
        }
    }

    /// Get the event type name.
    #[must_use]
    pub const fn event_type(&self) -> &'static str {
        match self {
            Self::Created(_) => "ORDER_CREATED",
            Self::Submitted(_) => "ORDER_SUBMITTED",
            Self::PartiallyFilled(_) => "ORDER_PARTIALLY_FILLED",
            Self::Filled(_) => "ORDER_FILLED",
            Self::Cancelled(_) => "ORDER_CANCELLED",
            Self::Rejected(_) => "ORDER_REJECTED",
            Self::Failed(_) => "ORDER_FAILED",
        }
    }
}

/// Event: order created and persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCreated {
    /// Order ID.
    pub order_id: OrderId,
    /// Symbol.
    pub symbol: Symbol,
    /// Side.
    pub side: OrderSide,
    /// Quantity.
    pub quantity: Quantity,
    /// When the event occurred.
    pub occurred_at: Timestamp,
}

/// Event: order accepted by the venue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSubmitted {
    /// Order ID.
    pub order_id: OrderId,
    /// Venue's order ID.
    pub venue_order_id: VenueOrderId,
    /// When the event occurred.
    pub occurred_at: Timestamp,
}

/// Event: order partially filled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPartiallyFilled {
    /// Order ID.
    pub order_id: OrderId,
    /// Fill quantity for this execution.
    pub fill_quantity: Quantity,
    /// Fill price for this execution.
    pub fill_price: Money,
    /// Cumulative quantity filled.
    pub cumulative_quantity: Quantity,
    /// Remaining quantity to fill.
    pub leaves_quantity: Quantity,
    /// Volume-weighted average price.
    pub vwap: Money,
    /// Who drove the transition.
    pub actor: TransitionActor,
    /// When the event occurred.
    pub occurred_at: Timestamp,
}

/// Event: order completely filled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderFilled {
    /// Order ID.
    pub order_id: OrderId,
    /// Total quantity filled.
    pub total_quantity: Quantity,
    /// Average fill price (VWAP).
    pub average_price: Money,
    /// Who drove the transition.
    pub actor: TransitionActor,
    /// When the event occurred.
    pub occurred_at: Timestamp,
}

/// Event: order cancelled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCancelled {
    /// Order ID.
    pub order_id: OrderId,
    /// Reason for cancellation.
    pub reason: CancelReason,
    /// Quantity that was filled before cancellation.
    pub filled_quantity: Quantity,
    /// Who drove the transition.
    pub actor: TransitionActor,
    /// When the event occurred.
    pub occurred_at: Timestamp,
}

/// Event: order rejected by the venue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRejected {
    /// Order ID.
    pub order_id: OrderId,
    /// Reason for rejection.
    pub reason: RejectReason,
    /// Who drove the transition.
    pub actor: TransitionActor,
    /// When the event occurred.
    pub occurred_at: Timestamp,
}

/// Event: submission failed before the venue accepted the order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderFailed {
    /// Order ID.
    pub order_id: OrderId,
    /// What went wrong.
    pub message: String,
    /// When the event occurred.
    pub occurred_at: Timestamp,
}
