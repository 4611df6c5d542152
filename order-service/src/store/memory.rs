use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use inventory_service::MemoryLedger;
use shared::{BookingError, Order, OrderAction, OrderId, OrderStatus, RoomNumber};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, MutexGuard, RwLock};
use tracing::debug;

use super::{apply_ledger_free, order_not_found, OrderStore};

/// Orders kept in process next to a [`MemoryLedger`].
///
/// Every order sits behind its own mutex. `confirm` holds that mutex across
/// the ledger decrement and only publishes the new state once the decrement
/// succeeded, so a failed confirmation leaves the order untouched.
pub struct MemoryOrderStore {
    orders: RwLock<HashMap<OrderId, Arc<Mutex<Order>>>>,
    ledger: Arc<MemoryLedger>,
    lock_timeout: Duration,
}

impl MemoryOrderStore {
    pub fn new(ledger: Arc<MemoryLedger>, lock_timeout: Duration) -> Self {
        Self {
            orders: RwLock::new(HashMap::new()),
            ledger,
            lock_timeout,
        }
    }

    async fn slot(&self, id: OrderId) -> Result<Arc<Mutex<Order>>, BookingError> {
        self.orders
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| order_not_found(id))
    }

    async fn lock<'a>(&self, id: OrderId, slot: &'a Mutex<Order>) -> Result<MutexGuard<'a, Order>, BookingError> {
        tokio::time::timeout(self.lock_timeout, slot.lock())
            .await
            .map_err(|_| BookingError::Busy(format!("order {id} stayed locked for {:?}", self.lock_timeout)))
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn insert(&self, order: &Order) -> Result<(), BookingError> {
        let mut orders = self.orders.write().await;
        if orders.contains_key(&order.id) {
            return Err(BookingError::Storage(format!("order {} already exists", order.id)));
        }
        orders.insert(order.id, Arc::new(Mutex::new(order.clone())));
        Ok(())
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>, BookingError> {
        let Some(slot) = self.orders.read().await.get(&id).cloned() else {
            return Ok(None);
        };
        let order = self.lock(id, &slot).await?;
        Ok(Some(order.clone()))
    }

    async fn advance(&self, id: OrderId, action: OrderAction, now: DateTime<Utc>) -> Result<Order, BookingError> {
        let slot = self.slot(id).await?;
        let mut order = self.lock(id, &slot).await?;
        apply_ledger_free(&mut order, action, now)?;
        Ok(order.clone())
    }

    async fn confirm(&self, id: OrderId, room: RoomNumber, now: DateTime<Utc>) -> Result<Order, BookingError> {
        let slot = self.slot(id).await?;
        let mut order = self.lock(id, &slot).await?;

        let mut confirmed = order.clone();
        confirmed.confirm(room, now)?;
        self.ledger
            .decrement_range(confirmed.room_type_id, &confirmed.stay)
            .await?;

        *order = confirmed;
        debug!(order_id = %id, "order confirmed in memory");
        Ok(order.clone())
    }

    async fn due_for_completion(&self, today: NaiveDate) -> Result<Vec<OrderId>, BookingError> {
        let slots: Vec<_> = self
            .orders
            .read()
            .await
            .iter()
            .map(|(id, slot)| (*id, Arc::clone(slot)))
            .collect();

        let mut due = Vec::new();
        for (id, slot) in slots {
            let order = self.lock(id, &slot).await?;
            if order.status == OrderStatus::PendingCheckIn && order.stay.check_out() <= today {
                due.push(id);
            }
        }
        due.sort();
        Ok(due)
    }
}
