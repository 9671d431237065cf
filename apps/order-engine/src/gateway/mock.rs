//! Mock venue gateway for testing.
//!
//! This module provides a scriptable implementation of `BrokerGateway`
//! that returns simulated responses without network I/O. Tests drive the
//! venue's view directly: injected failures, delayed submissions, pushed
//! execution events, and edits to the simulated order book.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::BoxStream;
use tokio_stream::wrappers::UnboundedReceiverStream;

use super::adapter::BrokerGateway;
use super::error::GatewayError;
use super::types::{
    ConnectionState, ExecutionEvent, OrderTicket, VenueOrderReport, VenueOrderStatus,
};
use crate::domain::shared::{Money, Quantity, VenueOrderId};

/// Scriptable mock venue gateway.
///
/// Venue order ids are generated sequentially starting from 1. The mock
/// starts `Disconnected`; use [`MockBrokerGateway::connected`] for a
/// ready-to-use instance.
pub struct MockBrokerGateway {
    connected: AtomicBool,
    order_counter: AtomicU64,
    submissions: Mutex<Vec<OrderTicket>>,
    orders: Mutex<HashMap<VenueOrderId, VenueOrderReport>>,
    submit_failure: Mutex<Option<GatewayError>>,
    cancel_failure: Mutex<Option<GatewayError>>,
    submit_delay: Mutex<Option<Duration>>,
    exec_tx: tokio::sync::mpsc::UnboundedSender<ExecutionEvent>,
    exec_rx: Mutex<Option<tokio::sync::mpsc::UnboundedReceiver<ExecutionEvent>>>,
}

impl MockBrokerGateway {
    /// Create a new, disconnected mock gateway.
    #[must_use]
    pub fn new() -> Self {
        let (exec_tx, exec_rx) = tokio::sync::mpsc::unbounded_channel();
        Self {
            connected: AtomicBool::new(false),
            order_counter: AtomicU64::new(1),
            submissions: Mutex::new(Vec::new()),
            orders: Mutex::new(HashMap::new()),
            submit_failure: Mutex::new(None),
            cancel_failure: Mutex::new(None),
            submit_delay: Mutex::new(None),
            exec_tx,
            exec_rx: Mutex::new(Some(exec_rx)),
        }
    }

    /// Create a mock gateway that is already connected.
    #[must_use]
    pub fn connected() -> Self {
        let gateway = Self::new();
        gateway.connected.store(true, Ordering::SeqCst);
        gateway
    }

    /// Fail the next `submit_order` call with the given error.
    pub fn fail_next_submit(&self, error: GatewayError) {
        if let Ok(mut failure) = self.submit_failure.lock() {
            *failure = Some(error);
        }
    }

    /// Fail the next `cancel_order` call with the given error.
    pub fn fail_next_cancel(&self, error: GatewayError) {
        if let Ok(mut failure) = self.cancel_failure.lock() {
            *failure = Some(error);
        }
    }

    /// Delay every `submit_order` call by the given duration.
    pub fn set_submit_delay(&self, delay: Duration) {
        if let Ok(mut slot) = self.submit_delay.lock() {
            *slot = Some(delay);
        }
    }

    /// Push an execution event into the stream.
    pub fn push_execution(&self, event: ExecutionEvent) {
        // Receiver may have been dropped at test end; nothing to do then.
        let _ = self.exec_tx.send(event);
    }

    /// Overwrite the venue's view of an order.
    pub fn set_order_report(&self, report: VenueOrderReport) {
        if let Ok(mut orders) = self.orders.lock() {
            orders.insert(report.venue_order_id.clone(), report);
        }
    }

    /// Erase the venue's record of an order (cancelled/expired and aged out).
    pub fn remove_order(&self, venue_order_id: &VenueOrderId) {
        if let Ok(mut orders) = self.orders.lock() {
            orders.remove(venue_order_id);
        }
    }

    /// Mark an order filled at the venue without emitting stream events.
    pub fn mark_filled(&self, venue_order_id: &VenueOrderId, filled: Quantity, avg_price: Money) {
        if let Ok(mut orders) = self.orders.lock() {
            if let Some(report) = orders.get_mut(venue_order_id) {
                report.status = VenueOrderStatus::Filled;
                report.filled_quantity = filled;
                report.avg_fill_price = avg_price;
            }
        }
    }

    /// Number of submissions the venue has seen.
    #[must_use]
    pub fn submission_count(&self) -> usize {
        self.submissions.lock().map(|s| s.len()).unwrap_or(0)
    }

    /// Tickets the venue has seen, in submission order.
    #[must_use]
    pub fn submissions(&self) -> Vec<OrderTicket> {
        self.submissions.lock().map(|s| s.clone()).unwrap_or_default()
    }

    fn ensure_connected(&self) -> Result<(), GatewayError> {
        if self.connected.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(GatewayError::Unavailable(
                "mock gateway is disconnected".to_string(),
            ))
        }
    }
}

impl Default for MockBrokerGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BrokerGateway for MockBrokerGateway {
    async fn connect(&self) -> Result<(), GatewayError> {
        self.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), GatewayError> {
        self.connected.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn connection_state(&self) -> ConnectionState {
        if self.connected.load(Ordering::SeqCst) {
            ConnectionState::Connected
        } else {
            ConnectionState::Disconnected
        }
    }

    async fn submit_order(&self, ticket: &OrderTicket) -> Result<VenueOrderId, GatewayError> {
        self.ensure_connected()?;

        let delay = self.submit_delay.lock().ok().and_then(|d| *d);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let failure = self.submit_failure.lock().ok().and_then(|mut f| f.take());
        if let Some(error) = failure {
            return Err(error);
        }

        let n = self.order_counter.fetch_add(1, Ordering::SeqCst);
        let venue_order_id = VenueOrderId::new(format!("ven-{n}"));

        if let Ok(mut submissions) = self.submissions.lock() {
            submissions.push(ticket.clone());
        }
        if let Ok(mut orders) = self.orders.lock() {
            orders.insert(
                venue_order_id.clone(),
                VenueOrderReport {
                    venue_order_id: venue_order_id.clone(),
                    status: VenueOrderStatus::Open,
                    filled_quantity: Quantity::ZERO,
                    avg_fill_price: Money::ZERO,
                },
            );
        }

        Ok(venue_order_id)
    }

    async fn cancel_order(&self, venue_order_id: &VenueOrderId) -> Result<(), GatewayError> {
        self.ensure_connected()?;

        let failure = self.cancel_failure.lock().ok().and_then(|mut f| f.take());
        if let Some(error) = failure {
            return Err(error);
        }

        let Ok(mut orders) = self.orders.lock() else {
            return Err(GatewayError::Api {
                code: "lock".to_string(),
                message: "mock state poisoned".to_string(),
            });
        };

        match orders.get_mut(venue_order_id) {
            None => Err(GatewayError::OrderNotFound(
                venue_order_id.as_str().to_string(),
            )),
            Some(report) if report.status == VenueOrderStatus::Filled => Err(GatewayError::Api {
                code: "not_cancelable".to_string(),
                message: format!("order {venue_order_id} already filled"),
            }),
            Some(report) => {
                report.status = VenueOrderStatus::Cancelled;
                Ok(())
            }
        }
    }

    async fn open_orders(&self) -> Result<Vec<VenueOrderReport>, GatewayError> {
        self.ensure_connected()?;

        Ok(self
            .orders
            .lock()
            .map(|orders| {
                orders
                    .values()
                    .filter(|r| r.status.is_open())
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn order_status(
        &self,
        venue_order_id: &VenueOrderId,
    ) -> Result<VenueOrderReport, GatewayError> {
        self.ensure_connected()?;

        self.orders
            .lock()
            .ok()
            .and_then(|orders| orders.get(venue_order_id).cloned())
            .ok_or_else(|| GatewayError::OrderNotFound(venue_order_id.as_str().to_string()))
    }

    async fn execution_events(&self) -> Result<BoxStream<'static, ExecutionEvent>, GatewayError> {
        self.ensure_connected()?;

        let receiver = self.exec_rx.lock().ok().and_then(|mut rx| rx.take());
        receiver.map_or_else(
            || {
                Err(GatewayError::Api {
                    code: "stream_taken".to_string(),
                    message: "execution stream already consumed".to_string(),
                })
            },
            |rx| {
                let stream: BoxStream<'static, ExecutionEvent> =
                    Box::pin(UnboundedReceiverStream::new(rx));
                Ok(stream)
            },
        )
    }

    fn venue_name(&self) -> &'static str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::{Fill, OrderKind, OrderSide, TradeMode};
    use crate::domain::shared::{ExecutionId, OrderId, Symbol, Timestamp};
    use rust_decimal_macros::dec;
    use tokio_stream::StreamExt;

    fn make_ticket() -> OrderTicket {
        OrderTicket {
            client_ref: OrderId::new("ord-1"),
            symbol: Symbol::new("AAPL"),
            side: OrderSide::Buy,
            kind: OrderKind::Market,
            quantity: Quantity::from_i64(10),
            limit_price: None,
            stop_price: None,
            mode: TradeMode::Simulated,
        }
    }

    #[tokio::test]
    async fn disconnected_calls_fail_fast() {
        let mock = MockBrokerGateway::new();
        assert_eq!(mock.connection_state(), ConnectionState::Disconnected);

        let err = mock.submit_order(&make_ticket()).await.unwrap_err();
        assert!(matches!(err, GatewayError::Unavailable(_)));

        let err = mock.open_orders().await.unwrap_err();
        assert!(matches!(err, GatewayError::Unavailable(_)));
    }

    #[tokio::test]
    async fn submit_assigns_sequential_venue_ids() {
        let mock = MockBrokerGateway::connected();

        let id1 = mock.submit_order(&make_ticket()).await.unwrap();
        let id2 = mock.submit_order(&make_ticket()).await.unwrap();

        assert_eq!(id1.as_str(), "ven-1");
        assert_eq!(id2.as_str(), "ven-2");
        assert_eq!(mock.submission_count(), 2);
    }

    #[tokio::test]
    async fn submit_failure_injection_fires_once() {
        let mock = MockBrokerGateway::connected();
        mock.fail_next_submit(GatewayError::OrderRejected("no margin".to_string()));

        assert!(mock.submit_order(&make_ticket()).await.is_err());
        assert!(mock.submit_order(&make_ticket()).await.is_ok());
    }

    #[tokio::test]
    async fn cancel_transitions_open_order() {
        let mock = MockBrokerGateway::connected();
        let id = mock.submit_order(&make_ticket()).await.unwrap();

        mock.cancel_order(&id).await.unwrap();

        let report = mock.order_status(&id).await.unwrap();
        assert_eq!(report.status, VenueOrderStatus::Cancelled);
    }

    #[tokio::test]
    async fn cancel_unknown_order_not_found() {
        let mock = MockBrokerGateway::connected();
        let err = mock
            .cancel_order(&VenueOrderId::new("ven-unknown"))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::OrderNotFound(_)));
    }

    #[tokio::test]
    async fn cancel_filled_order_fails() {
        let mock = MockBrokerGateway::connected();
        let id = mock.submit_order(&make_ticket()).await.unwrap();
        mock.mark_filled(&id, Quantity::from_i64(10), Money::new(dec!(12.50)));

        assert!(mock.cancel_order(&id).await.is_err());
    }

    #[tokio::test]
    async fn open_orders_excludes_terminal() {
        let mock = MockBrokerGateway::connected();
        let id1 = mock.submit_order(&make_ticket()).await.unwrap();
        let id2 = mock.submit_order(&make_ticket()).await.unwrap();
        mock.mark_filled(&id2, Quantity::from_i64(10), Money::new(dec!(12.50)));

        let open = mock.open_orders().await.unwrap();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].venue_order_id, id1);
    }

    #[tokio::test]
    async fn execution_stream_delivers_pushed_events() {
        let mock = MockBrokerGateway::connected();
        let mut stream = mock.execution_events().await.unwrap();

        mock.push_execution(ExecutionEvent {
            venue_order_id: VenueOrderId::new("ven-1"),
            fill: Fill::new(
                ExecutionId::new("exec-1"),
                Quantity::from_i64(4),
                Money::new(dec!(12.50)),
                Timestamp::now(),
            ),
        });

        let event = stream.next().await.unwrap();
        assert_eq!(event.venue_order_id.as_str(), "ven-1");
        assert_eq!(event.fill.execution_id.as_str(), "exec-1");
    }

    #[tokio::test]
    async fn execution_stream_cannot_be_taken_twice() {
        let mock = MockBrokerGateway::connected();
        let _stream = mock.execution_events().await.unwrap();
        assert!(mock.execution_events().await.is_err());
    }
}
