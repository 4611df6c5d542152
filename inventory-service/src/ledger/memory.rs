use async_trait::async_trait;
use chrono::NaiveDate;
use shared::{BookingError, InventoryDay, RoomTypeId, StayRange};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tracing::debug;

use super::{ensure_capacity, InventoryLedger};

type RoomDays = BTreeMap<NaiveDate, InventoryDay>;

/// In-process ledger. Each room type's nights sit behind one mutex, so a
/// check-and-decrement over any date range of that room type is a single
/// critical section. Lock waits are bounded by `lock_timeout`.
pub struct MemoryLedger {
    rooms: RwLock<HashMap<RoomTypeId, Arc<Mutex<RoomDays>>>>,
    lock_timeout: Duration,
}

impl MemoryLedger {
    pub fn new(lock_timeout: Duration) -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
            lock_timeout,
        }
    }

    async fn room(&self, room_type_id: RoomTypeId) -> Arc<Mutex<RoomDays>> {
        if let Some(room) = self.rooms.read().await.get(&room_type_id) {
            return Arc::clone(room);
        }
        Arc::clone(self.rooms.write().await.entry(room_type_id).or_default())
    }

    async fn existing_room(&self, room_type_id: RoomTypeId) -> Option<Arc<Mutex<RoomDays>>> {
        self.rooms.read().await.get(&room_type_id).cloned()
    }

    async fn lock(&self, room_type_id: RoomTypeId, room: Arc<Mutex<RoomDays>>) -> Result<OwnedMutexGuard<RoomDays>, BookingError> {
        tokio::time::timeout(self.lock_timeout, room.lock_owned())
            .await
            .map_err(|_| {
                BookingError::Busy(format!(
                    "inventory of room type {room_type_id} stayed locked for {:?}",
                    self.lock_timeout
                ))
            })
    }

    /// Takes one unit from every night of `stay`, or nothing at all.
    pub async fn decrement_range(&self, room_type_id: RoomTypeId, stay: &StayRange) -> Result<(), BookingError> {
        let Some(room) = self.existing_room(room_type_id).await else {
            return Err(BookingError::InsufficientInventory {
                room_type_id,
                date: stay.check_in(),
            });
        };
        let mut days = self.lock(room_type_id, room).await?;

        let current: Vec<InventoryDay> = days
            .range(stay.check_in()..stay.check_out())
            .map(|(_, day)| day.clone())
            .collect();
        ensure_capacity(room_type_id, stay, &current)?;

        for (_, day) in days.range_mut(stay.check_in()..stay.check_out()) {
            day.take_one()?;
        }
        debug!(%room_type_id, %stay, "inventory decremented");
        Ok(())
    }
}

#[async_trait]
impl InventoryLedger for MemoryLedger {
    async fn insert_missing(&self, days: Vec<InventoryDay>) -> Result<usize, BookingError> {
        let mut by_room: HashMap<RoomTypeId, Vec<InventoryDay>> = HashMap::new();
        for day in days {
            by_room.entry(day.room_type_id).or_default().push(day);
        }

        let mut inserted = 0;
        for (room_type_id, days) in by_room {
            let room = self.room(room_type_id).await;
            let mut existing = self.lock(room_type_id, room).await?;
            for day in days {
                if let std::collections::btree_map::Entry::Vacant(slot) = existing.entry(day.date) {
                    slot.insert(day);
                    inserted += 1;
                }
            }
        }
        Ok(inserted)
    }

    async fn days_for(&self, room_type_id: RoomTypeId, stay: &StayRange) -> Result<Vec<InventoryDay>, BookingError> {
        let Some(room) = self.existing_room(room_type_id).await else {
            return Ok(Vec::new());
        };
        let days = self.lock(room_type_id, room).await?;
        Ok(days
            .range(stay.check_in()..stay.check_out())
            .map(|(_, day)| day.clone())
            .collect())
    }

    async fn days_with_capacity(&self, stay: &StayRange) -> Result<Vec<InventoryDay>, BookingError> {
        let rooms: Vec<_> = self
            .rooms
            .read()
            .await
            .iter()
            .map(|(id, room)| (*id, Arc::clone(room)))
            .collect();

        let mut found = Vec::new();
        for (room_type_id, room) in rooms {
            let days = self.lock(room_type_id, room).await?;
            found.extend(
                days.range(stay.check_in()..stay.check_out())
                    .map(|(_, day)| day)
                    .filter(|day| day.has_capacity())
                    .cloned(),
            );
        }
        Ok(found)
    }
}
