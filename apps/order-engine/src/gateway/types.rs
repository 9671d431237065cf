//! Wire types exchanged with the venue gateway.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::order::{Fill, OrderKind, OrderSide, TradeMode};
use crate::domain::shared::{Money, OrderId, Quantity, Symbol, VenueOrderId};

/// Connection state of the gateway.
///
/// An explicit two-state machine; every gateway call while `Disconnected`
/// fails fast with `GatewayError::Unavailable` rather than blocking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConnectionState {
    /// No session with the venue.
    Disconnected,
    /// Live session with the venue.
    Connected,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "DISCONNECTED"),
            Self::Connected => write!(f, "CONNECTED"),
        }
    }
}

/// Order submission ticket sent to the venue.
///
/// `client_ref` is the engine's order id, doubling as the client-generated
/// idempotency key for venues that deduplicate on client order ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTicket {
    /// Engine order id, echoed to the venue.
    pub client_ref: OrderId,
    /// Symbol to trade.
    pub symbol: Symbol,
    /// Order side.
    pub side: OrderSide,
    /// Order kind.
    pub kind: OrderKind,
    /// Quantity to trade.
    pub quantity: Quantity,
    /// Limit price, for limit kinds.
    pub limit_price: Option<Money>,
    /// Stop price, for stop kinds.
    pub stop_price: Option<Money>,
    /// Which venue account to target.
    pub mode: TradeMode,
}

/// Order status as reported by the venue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VenueOrderStatus {
    /// Accepted and resting, nothing filled yet.
    Open,
    /// Some quantity filled.
    PartiallyFilled,
    /// Completely filled.
    Filled,
    /// Cancelled at the venue.
    Cancelled,
    /// Rejected by the venue.
    Rejected,
}

impl VenueOrderStatus {
    /// Returns true if the venue still considers the order workable.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        matches!(self, Self::Open | Self::PartiallyFilled)
    }
}

impl fmt::Display for VenueOrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "OPEN"),
            Self::PartiallyFilled => write!(f, "PARTIALLY_FILLED"),
            Self::Filled => write!(f, "FILLED"),
            Self::Cancelled => write!(f, "CANCELLED"),
            Self::Rejected => write!(f, "REJECTED"),
        }
    }
}

/// The venue's view of one order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenueOrderReport {
    /// Venue's order id.
    pub venue_order_id: VenueOrderId,
    /// Status at the venue.
    pub status: VenueOrderStatus,
    /// Cumulative quantity filled at the venue.
    pub filled_quantity: Quantity,
    /// Volume-weighted average fill price at the venue.
    pub avg_fill_price: Money,
}

/// Asynchronous execution notification from the venue stream.
///
/// Delivery is at-least-once from connection time; consumers deduplicate
/// on the fill's execution id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionEvent {
    /// Venue order id the execution belongs to.
    pub venue_order_id: VenueOrderId,
    /// The incremental fill.
    pub fill: Fill,
}
