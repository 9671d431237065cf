// Allow unwrap/expect in tests - tests should panic on unexpected errors
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::too_many_lines,
        clippy::match_same_arms,
        clippy::needless_pass_by_value,
        clippy::default_trait_access,
        clippy::items_after_statements
    )
)]

//! Order Engine - Rust Core Library
//!
//! Order lifecycle and broker reconciliation engine. The engine owns the
//! state machine for an order from creation through terminal outcome,
//! submits orders to an execution venue, absorbs asynchronous fill and
//! rejection notifications, and periodically reconciles local state
//! against the venue's view to heal drift from connection loss or missed
//! events.
//!
//! # Architecture
//!
//! - **Domain**: the `Order` aggregate and its value objects; the state
//!   machine and fill bookkeeping live here with no infrastructure
//!   dependencies.
//! - **Gateway**: the `BrokerGateway` capability trait with an explicit
//!   connect/disconnect lifecycle, plus a scriptable mock.
//! - **Store**: the `OrderRepository` port and its in-memory adapter; the
//!   local store is the source of truth when the venue is unreachable.
//! - **Lifecycle**: the `OrderLifecycleManager` drives transitions with
//!   per-order serialization and bounded gateway timeouts.
//! - **Reconciliation**: the `Reconciler` diffs local state against the
//!   venue and heals drift without ever regressing terminal state or
//!   fabricating fills.
//! - **Signal**: the restricted condition-expression language strategy
//!   rules cross the boundary in.
//!
//! # Consistency model
//!
//! Two independently-mutable stores (local database, remote venue) must
//! agree under partial failure without losing or duplicating financial
//! state. Execution events are applied idempotently by execution id;
//! submits are serialized per order; client-side timeouts leave orders in
//! their pre-call state for reconciliation to resolve.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

/// Configuration loading.
pub mod config;

/// Domain layer - core business logic.
pub mod domain;

/// Venue gateway capability surface.
pub mod gateway;

/// Instrument catalog port.
pub mod instruments;

/// Order lifecycle management.
pub mod lifecycle;

/// Structured logging setup.
pub mod observability;

/// Drift healing against the venue.
pub mod reconciliation;

/// Strategy-signal boundary expressions.
pub mod signal;

/// Order store adapters.
pub mod store;

// Domain re-exports
pub use domain::order::{
    Anomaly, CancelReason, CreateOrderCommand, Fill, FillState, Order, OrderError, OrderEvent,
    OrderFilter, OrderKind, OrderRepository, OrderSide, OrderStatus, RejectReason, StoreError,
    TradeMode, TransitionActor,
};
pub use domain::shared::{
    ExecutionId, InstrumentId, Money, OrderId, Quantity, StrategyId, Symbol, Timestamp,
    VenueOrderId,
};

// Component re-exports
pub use config::{Config, ConfigError, load_config};
pub use gateway::{
    BrokerGateway, ConnectionState, ExecutionEvent, GatewayError, MockBrokerGateway, OrderTicket,
    VenueOrderReport, VenueOrderStatus,
};
pub use instruments::{InstrumentCatalog, StaticInstrumentCatalog};
pub use lifecycle::{
    CancelOrderError, CreateOrderError, ExecutionOutcome, OrderLifecycleManager, OrderStatistics,
    SubmitOrderError,
};
pub use reconciliation::{ReconciliationError, ReconciliationReport, Reconciler};
pub use signal::{CmpOp, Condition, ExprError, SignalRule};
pub use store::InMemoryOrderStore;
