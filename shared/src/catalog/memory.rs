use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;

use super::{Catalog, HotelView, RoomTypeView, UserDirectory};
use crate::error::BookingError;
use crate::ids::{HotelId, RoomTypeId, UserId};

/// In-process catalog and user directory, used by tests and local runs.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    hotels: RwLock<HashMap<HotelId, HotelView>>,
    room_types: RwLock<HashMap<RoomTypeId, RoomTypeView>>,
    users: RwLock<HashSet<UserId>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn put_hotel(&self, hotel: HotelView) {
        self.hotels.write().await.insert(hotel.id, hotel);
    }

    pub async fn put_room_type(&self, room_type: RoomTypeView) {
        self.room_types.write().await.insert(room_type.id, room_type);
    }

    pub async fn put_user(&self, id: UserId) {
        self.users.write().await.insert(id);
    }

    /// Approves or rejects a hotel. Returns false if the hotel is unknown.
    pub async fn set_sellable(&self, id: HotelId, sellable: bool) -> bool {
        match self.hotels.write().await.get_mut(&id) {
            Some(hotel) => {
                hotel.sellable = sellable;
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl Catalog for MemoryCatalog {
    async fn get_hotel(&self, id: HotelId) -> Result<Option<HotelView>, BookingError> {
        Ok(self.hotels.read().await.get(&id).cloned())
    }

    async fn get_room_type(&self, id: RoomTypeId) -> Result<Option<RoomTypeView>, BookingError> {
        Ok(self.room_types.read().await.get(&id).cloned())
    }

    async fn room_types_of(&self, hotel_id: HotelId) -> Result<Vec<RoomTypeView>, BookingError> {
        let mut found: Vec<_> = self
            .room_types
            .read()
            .await
            .values()
            .filter(|rt| rt.hotel_id == hotel_id)
            .cloned()
            .collect();
        found.sort_by_key(|rt| rt.id);
        Ok(found)
    }
}

#[async_trait]
impl UserDirectory for MemoryCatalog {
    async fn user_exists(&self, id: UserId) -> Result<bool, BookingError> {
        Ok(self.users.read().await.contains(&id))
    }
}
