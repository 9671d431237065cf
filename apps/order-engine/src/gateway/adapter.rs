//! Venue gateway trait definition.
//!
//! This module defines the `BrokerGateway` trait that all venue
//! integrations must implement. The gateway is a capability object with an
//! explicit connect/disconnect lifecycle, injected into the lifecycle
//! manager so it can be substituted with a test double.

use async_trait::async_trait;
use futures::stream::BoxStream;

use super::GatewayError;
use super::types::{ConnectionState, ExecutionEvent, OrderTicket, VenueOrderReport};
use crate::domain::shared::VenueOrderId;

/// Trait for venue gateway adapters.
///
/// # Connection model
///
/// Connection state is a two-state machine (`Disconnected`, `Connected`).
/// Every order operation while `Disconnected` MUST fail fast with
/// `GatewayError::Unavailable` rather than block; the lifecycle manager
/// maps this to ERROR or retained-PENDING rather than crashing.
///
/// # Execution stream
///
/// `execution_events` yields an unbounded sequence of fill notifications.
/// After a reconnect the stream restarts from connection time, so delivery
/// is at-least-once; consumers deduplicate on execution ids.
#[async_trait]
pub trait BrokerGateway: Send + Sync {
    /// Open a session with the venue.
    ///
    /// # Errors
    ///
    /// Returns an error if the venue cannot be reached or rejects the
    /// session.
    async fn connect(&self) -> Result<(), GatewayError>;

    /// Close the session with the venue.
    ///
    /// # Errors
    ///
    /// Returns an error if teardown fails; the gateway is considered
    /// disconnected regardless.
    async fn disconnect(&self) -> Result<(), GatewayError>;

    /// Current connection state.
    fn connection_state(&self) -> ConnectionState;

    /// Submit an order to the venue.
    ///
    /// # Errors
    ///
    /// Returns an error if the gateway is disconnected, the venue rejects
    /// the order, or the API call fails.
    async fn submit_order(&self, ticket: &OrderTicket) -> Result<VenueOrderId, GatewayError>;

    /// Cancel an order at the venue.
    ///
    /// Cancellation is not assumed successful until confirmed: an in-flight
    /// fill racing a cancel must not be discarded.
    ///
    /// # Errors
    ///
    /// Returns an error if the gateway is disconnected, the order is not
    /// known to the venue, or the API call fails.
    async fn cancel_order(&self, venue_order_id: &VenueOrderId) -> Result<(), GatewayError>;

    /// The venue's current set of open (workable) orders.
    ///
    /// # Errors
    ///
    /// Returns an error if the gateway is disconnected or the API call
    /// fails.
    async fn open_orders(&self) -> Result<Vec<VenueOrderReport>, GatewayError>;

    /// The venue's view of a single order.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::OrderNotFound` if the venue no longer has a
    /// record of the order (cancelled/expired and aged out).
    async fn order_status(
        &self,
        venue_order_id: &VenueOrderId,
    ) -> Result<VenueOrderReport, GatewayError>;

    /// Lazy stream of execution notifications.
    ///
    /// # Errors
    ///
    /// Returns an error if the gateway is disconnected.
    async fn execution_events(&self) -> Result<BoxStream<'static, ExecutionEvent>, GatewayError>;

    /// Venue name for logging and diagnostics.
    fn venue_name(&self) -> &'static str;
}
