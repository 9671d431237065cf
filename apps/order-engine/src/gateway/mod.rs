//! Venue gateway: capability surface consumed by the lifecycle manager and
//! the reconciliation loop.

mod adapter;
mod error;
mod mock;
mod types;

pub use adapter::BrokerGateway;
pub use error::GatewayError;
pub use mock::MockBrokerGateway;
pub use types::{
    ConnectionState, ExecutionEvent, OrderTicket, VenueOrderReport, VenueOrderStatus,
};
