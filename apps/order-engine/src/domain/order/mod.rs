//! Order aggregate, value objects, events, errors, and repository port.

mod aggregate;
mod errors;
mod events;
mod repository;
mod value_objects;

pub use aggregate::{CreateOrderCommand, Order};
pub use errors::OrderError;
pub use events::{
    OrderCancelled, OrderCreated, OrderEvent, OrderFailed, OrderFilled, OrderPartiallyFilled,
    OrderRejected, OrderSubmitted, TransitionActor,
};
pub use repository::{OrderFilter, OrderRepository, StoreError};
pub use value_objects::{
    Anomaly, CancelReason, Fill, FillApplication, FillState, OrderKind, OrderSide, OrderStatus,
    RejectReason, TradeMode,
};
