pub mod catalog;
pub mod clock;
pub mod db;
pub mod error;
pub mod ids;
pub mod inventory;
pub mod order;
pub mod stay;

pub use catalog::{Catalog, HotelView, MemoryCatalog, PgCatalog, RoomTypeView, UserDirectory};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::BookingError;
pub use ids::{HotelId, OrderId, RoomTypeId, UserId};
pub use inventory::InventoryDay;
pub use order::{GuestContact, Order, OrderAction, OrderDetail, OrderRequest, OrderStatus, RoomNumber};
pub use stay::StayRange;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Catalog changes that make room types sellable, published on the catalog topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CatalogEvent {
    /// Hotel approved, or re-approved after a rejection.
    HotelApproved { hotel_id: HotelId },
    /// Room type added to a hotel. Only materialized if the hotel is sellable.
    RoomTypeCreated { hotel_id: HotelId, room_type_id: RoomTypeId },
}

/// Payment-gateway notification that an order has been paid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentEvent {
    pub id: Uuid,
    pub order_id: OrderId,
    pub paid_at: DateTime<Utc>,
}

impl PaymentEvent {
    pub fn new(order_id: OrderId) -> Self {
        Self {
            id: Uuid::new_v4(),
            order_id,
            paid_at: Utc::now(),
        }
    }
}
