use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::BookingError;
use crate::ids::RoomTypeId;

/// Availability of one room type on one night. `0 <= available <= total`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryDay {
    pub room_type_id: RoomTypeId,
    pub date: NaiveDate,
    pub total: i32,
    pub available: i32,
}

impl InventoryDay {
    /// A freshly materialized row: nothing sold yet.
    pub const fn fresh(room_type_id: RoomTypeId, date: NaiveDate, capacity: i32) -> Self {
        Self {
            room_type_id,
            date,
            total: capacity,
            available: capacity,
        }
    }

    pub const fn has_capacity(&self) -> bool {
        self.available > 0
    }

    pub fn take_one(&mut self) -> Result<(), BookingError> {
        if !self.has_capacity() {
            return Err(BookingError::InsufficientInventory {
                room_type_id: self.room_type_id,
                date: self.date,
            });
        }
        self.available -= 1;
        Ok(())
    }
}
