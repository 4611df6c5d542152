use futures::StreamExt;
use rdkafka::consumer::{CommitMode, Consumer, StreamConsumer};
use rdkafka::message::BorrowedMessage;
use rdkafka::{Message, Offset};
use shared::{BookingError, Order, PaymentEvent};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::lifecycle::OrderService;

const MAX_ATTEMPTS: u32 = 3;

/// Drives `pay()` from payment-gateway notifications.
pub struct PaymentEventHandler {
    orders: Arc<OrderService>,
    retry_backoff: Duration,
}

impl PaymentEventHandler {
    pub fn new(orders: Arc<OrderService>, retry_backoff: Duration) -> Self {
        Self { orders, retry_backoff }
    }

    /// A payment is only acknowledged once it is applied or can never apply.
    /// When the store stays busy or fails, the partition is rewound to the
    /// event so it is consumed again.
    pub async fn run(&self, consumer: StreamConsumer) {
        let mut message_stream = consumer.stream();

        while let Some(message) = message_stream.next().await {
            match message {
                Ok(m) => {
                    if self.process(&m).await {
                        if let Err(e) = consumer.commit_message(&m, CommitMode::Async) {
                            error!("Error committing message: {}", e);
                        }
                    } else {
                        if let Err(e) = consumer.seek(m.topic(), m.partition(), Offset::Offset(m.offset()), Duration::from_secs(5)) {
                            error!("Error rewinding to offset {}: {}", m.offset(), e);
                        }
                        tokio::time::sleep(self.retry_backoff * MAX_ATTEMPTS).await;
                    }
                }
                Err(e) => error!("Error receiving message: {}", e),
            }
        }
    }

    /// Returns whether the message is done with.
    async fn process(&self, m: &BorrowedMessage<'_>) -> bool {
        let Some(payload) = m.payload_view::<str>() else {
            return true;
        };
        let event = match payload.map_err(|e| e.to_string()).and_then(|json| {
            serde_json::from_str::<PaymentEvent>(json).map_err(|e| e.to_string())
        }) {
            Ok(event) => event,
            Err(e) => {
                warn!("Skipping malformed payment event: {}", e);
                return true;
            }
        };

        match self.handle_event(&event).await {
            Ok(_) => true,
            Err(e) if e.is_transient() => {
                warn!(event_id = %event.id, order_id = %event.order_id, "payment will be redelivered: {}", e);
                false
            }
            Err(e) => {
                error!(event_id = %event.id, order_id = %event.order_id, kind = e.kind(), "Error handling payment event: {}", e);
                true
            }
        }
    }

    /// Returns the paid order, or `None` when the event was a redelivery for
    /// an order that already moved past `PendingPayment`.
    pub async fn handle_event(&self, event: &PaymentEvent) -> Result<Option<Order>, BookingError> {
        let mut attempt = 1;
        loop {
            match self.orders.pay_order(event.order_id).await {
                Ok(order) => return Ok(Some(order)),
                Err(BookingError::StateConflict { from, .. }) => {
                    info!(event_id = %event.id, order_id = %event.order_id, %from, "payment already applied");
                    return Ok(None);
                }
                Err(e) if e.is_retryable() && attempt < MAX_ATTEMPTS => {
                    warn!(order_id = %event.order_id, attempt, "order busy, retrying payment: {}", e);
                    tokio::time::sleep(self.retry_backoff * attempt).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
