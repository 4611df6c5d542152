//! The inventory ledger: one row per (room type, night) holding total and
//! available capacity.
//!
//! Rows are only ever inserted by the materializer and only ever decremented
//! by order confirmation. The decrement is not part of [`InventoryLedger`]
//! because it has to run inside the confirming order's own atomic unit; each
//! backend exposes it next to its storage instead
//! ([`MemoryLedger::decrement_range`], [`pg::decrement_range`]).

mod memory;
pub mod pg;

pub use memory::MemoryLedger;
pub use pg::PgLedger;

use async_trait::async_trait;
use shared::{BookingError, InventoryDay, RoomTypeId, StayRange};
use std::collections::HashMap;

#[async_trait]
pub trait InventoryLedger: Send + Sync {
    /// Inserts every row whose (room type, date) key is absent and leaves
    /// existing rows untouched. Returns the number of rows inserted.
    async fn insert_missing(&self, days: Vec<InventoryDay>) -> Result<usize, BookingError>;

    /// Rows of one room type inside `stay`, ordered by date.
    async fn days_for(&self, room_type_id: RoomTypeId, stay: &StayRange) -> Result<Vec<InventoryDay>, BookingError>;

    /// Rows of every room type inside `stay` that still have capacity.
    async fn days_with_capacity(&self, stay: &StayRange) -> Result<Vec<InventoryDay>, BookingError>;
}

/// Fails on the first night of `stay` that has no row or no capacity left.
pub fn ensure_capacity(room_type_id: RoomTypeId, stay: &StayRange, days: &[InventoryDay]) -> Result<(), BookingError> {
    let available: HashMap<_, _> = days
        .iter()
        .filter(|d| d.room_type_id == room_type_id)
        .map(|d| (d.date, d.available))
        .collect();

    match stay.dates().find(|date| available.get(date).map_or(true, |a| *a <= 0)) {
        Some(date) => Err(BookingError::InsufficientInventory { room_type_id, date }),
        None => Ok(()),
    }
}
