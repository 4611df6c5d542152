use shared::{BookingError, Clock};
use std::sync::Arc;
use std::time::Duration;
use tokio::time;
use tracing::error;

use crate::lifecycle::OrderService;

/// Periodically completes orders whose guests have checked out.
pub struct CompletionSweeper {
    orders: Arc<OrderService>,
    clock: Arc<dyn Clock>,
    interval: Duration,
}

impl CompletionSweeper {
    pub fn new(orders: Arc<OrderService>, clock: Arc<dyn Clock>, interval: Duration) -> Self {
        Self {
            orders,
            clock,
            interval,
        }
    }

    pub async fn run(&self) {
        let mut interval = time::interval(self.interval);

        loop {
            interval.tick().await;

            if let Err(e) = self.sweep().await {
                error!("Error completing checked-out orders: {}", e);
            }
        }
    }

    pub async fn sweep(&self) -> Result<usize, BookingError> {
        self.orders.complete_checked_out(self.clock.today()).await
    }
}
