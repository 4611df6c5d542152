//! Read-only view of the hotel catalog and the user directory.
//!
//! Both are owned by other systems. The booking engine only asks whether a
//! hotel is sellable, what a room type costs and holds, and whether a user
//! exists.

mod memory;
mod pg;
pub mod schema;

pub use memory::MemoryCatalog;
pub use pg::PgCatalog;

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::error::BookingError;
use crate::ids::{HotelId, RoomTypeId, UserId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotelView {
    pub id: HotelId,
    pub name: String,
    pub rating: f32,
    /// Mirrors the hotel's approval state.
    pub sellable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomTypeView {
    pub id: RoomTypeId,
    pub hotel_id: HotelId,
    pub name: String,
    pub total_capacity: i32,
    pub price: BigDecimal,
}

#[async_trait]
pub trait Catalog: Send + Sync {
    async fn get_hotel(&self, id: HotelId) -> Result<Option<HotelView>, BookingError>;

    async fn get_room_type(&self, id: RoomTypeId) -> Result<Option<RoomTypeView>, BookingError>;

    async fn room_types_of(&self, hotel_id: HotelId) -> Result<Vec<RoomTypeView>, BookingError>;

    async fn require_hotel(&self, id: HotelId) -> Result<HotelView, BookingError> {
        self.get_hotel(id)
            .await?
            .ok_or_else(|| BookingError::not_found("hotel", id))
    }

    async fn require_room_type(&self, id: RoomTypeId) -> Result<RoomTypeView, BookingError> {
        self.get_room_type(id)
            .await?
            .ok_or_else(|| BookingError::not_found("room type", id))
    }
}

#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn user_exists(&self, id: UserId) -> Result<bool, BookingError>;
}
