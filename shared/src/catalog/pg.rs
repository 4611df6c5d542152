use async_trait::async_trait;
use bigdecimal::BigDecimal;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use super::schema::{hotels, room_types, users};
use super::{Catalog, HotelView, RoomTypeView, UserDirectory};
use crate::db::DbPool;
use crate::error::BookingError;
use crate::ids::{HotelId, RoomTypeId, UserId};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = hotels)]
struct HotelRow {
    id: Uuid,
    name: String,
    rating: f32,
    approved: bool,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = room_types)]
struct RoomTypeRow {
    id: Uuid,
    hotel_id: Uuid,
    name: String,
    total_capacity: i32,
    price: BigDecimal,
}

impl From<HotelRow> for HotelView {
    fn from(row: HotelRow) -> Self {
        Self {
            id: row.id.into(),
            name: row.name,
            rating: row.rating,
            sellable: row.approved,
        }
    }
}

impl From<RoomTypeRow> for RoomTypeView {
    fn from(row: RoomTypeRow) -> Self {
        Self {
            id: row.id.into(),
            hotel_id: row.hotel_id.into(),
            name: row.name,
            total_capacity: row.total_capacity,
            price: row.price,
        }
    }
}

/// Catalog and user directory backed by the catalog's PostgreSQL tables.
#[derive(Clone)]
pub struct PgCatalog {
    pool: DbPool,
}

impl PgCatalog {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Catalog for PgCatalog {
    async fn get_hotel(&self, id: HotelId) -> Result<Option<HotelView>, BookingError> {
        let mut conn = self.pool.get().await?;
        let row = hotels::table
            .find(id.as_uuid())
            .select(HotelRow::as_select())
            .first(&mut conn)
            .await
            .optional()?;
        Ok(row.map(Into::into))
    }

    async fn get_room_type(&self, id: RoomTypeId) -> Result<Option<RoomTypeView>, BookingError> {
        let mut conn = self.pool.get().await?;
        let row = room_types::table
            .find(id.as_uuid())
            .select(RoomTypeRow::as_select())
            .first(&mut conn)
            .await
            .optional()?;
        Ok(row.map(Into::into))
    }

    async fn room_types_of(&self, hotel_id: HotelId) -> Result<Vec<RoomTypeView>, BookingError> {
        let mut conn = self.pool.get().await?;
        let rows = room_types::table
            .filter(room_types::hotel_id.eq(hotel_id.as_uuid()))
            .order(room_types::id.asc())
            .select(RoomTypeRow::as_select())
            .load(&mut conn)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl UserDirectory for PgCatalog {
    async fn user_exists(&self, id: UserId) -> Result<bool, BookingError> {
        let mut conn = self.pool.get().await?;
        let exists = diesel::select(diesel::dsl::exists(users::table.find(id.as_uuid())))
            .get_result::<bool>(&mut conn)
            .await?;
        Ok(exists)
    }
}
