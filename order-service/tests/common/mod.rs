#![allow(dead_code)]

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use inventory_service::{InventoryLedger, Materializer, MemoryLedger};
use order_service::{MemoryOrderStore, OrderService};
use shared::{
    FixedClock, HotelId, HotelView, MemoryCatalog, OrderRequest, RoomTypeId, RoomTypeView, StayRange, UserId,
};
use std::sync::Arc;
use std::time::Duration;

pub fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
}

/// One sellable hotel with one room type, inventory materialized from
/// 2025-01-01, and one registered user.
pub struct Fixture {
    pub catalog: Arc<MemoryCatalog>,
    pub ledger: Arc<MemoryLedger>,
    pub orders: Arc<OrderService>,
    pub hotel_id: HotelId,
    pub room_type_id: RoomTypeId,
    pub user_id: UserId,
}

impl Fixture {
    pub async fn with_capacity(capacity: i32) -> Self {
        Self::build(capacity, day(1)).await
    }

    /// Same setup, but the clock reads `today`.
    pub async fn build(capacity: i32, today: NaiveDate) -> Self {
        let catalog = Arc::new(MemoryCatalog::new());
        let ledger = Arc::new(MemoryLedger::new(Duration::from_secs(2)));
        let clock = Arc::new(FixedClock::on(day(1)));

        let hotel_id = HotelId::new();
        let room_type_id = RoomTypeId::new();
        let user_id = UserId::new();
        catalog
            .put_hotel(HotelView {
                id: hotel_id,
                name: "Harbour View".into(),
                rating: 4.5,
                sellable: true,
            })
            .await;
        catalog
            .put_room_type(RoomTypeView {
                id: room_type_id,
                hotel_id,
                name: "Double".into(),
                total_capacity: capacity,
                price: BigDecimal::from(120),
            })
            .await;
        catalog.put_user(user_id).await;

        Materializer::new(catalog.clone(), ledger.clone(), clock.clone())
            .materialize_room_type(room_type_id, 30)
            .await
            .unwrap();

        let store = Arc::new(MemoryOrderStore::new(ledger.clone(), Duration::from_secs(2)));
        let orders = Arc::new(OrderService::new(
            catalog.clone(),
            catalog.clone(),
            store,
            Arc::new(FixedClock::on(today)),
        ));

        Self {
            catalog,
            ledger,
            orders,
            hotel_id,
            room_type_id,
            user_id,
        }
    }

    pub fn request(&self, check_in: NaiveDate, check_out: NaiveDate) -> OrderRequest {
        OrderRequest {
            hotel_id: self.hotel_id,
            room_type_id: self.room_type_id,
            user_id: self.user_id,
            check_in,
            check_out,
            guest_name: "Ada Lovelace".into(),
            guest_phone: "+44 20 7946 0000".into(),
        }
    }

    pub async fn available(&self, from: NaiveDate, to: NaiveDate) -> Vec<i32> {
        self.ledger
            .days_for(self.room_type_id, &StayRange::new(from, to).unwrap())
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.available)
            .collect()
    }
}
