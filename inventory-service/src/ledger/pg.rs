use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use shared::db::DbPool;
use shared::{BookingError, InventoryDay, RoomTypeId, StayRange};
use tracing::debug;

use super::{ensure_capacity, InventoryLedger};
use crate::models::{InventoryDayRow, NewInventoryDay};
use crate::schema::inventory_days;

const INSERT_CHUNK: usize = 1_000;

#[derive(Clone)]
pub struct PgLedger {
    pool: DbPool,
}

impl PgLedger {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Locks every row of `stay` for `room_type_id`, verifies each night has
/// capacity, then takes one unit from each.
///
/// Must run inside the caller's transaction; the row locks are released when
/// that transaction commits or rolls back. Rows are locked in date order so
/// overlapping confirmations cannot deadlock.
pub async fn decrement_range(
    conn: &mut AsyncPgConnection,
    room_type_id: RoomTypeId,
    stay: &StayRange,
) -> Result<(), BookingError> {
    let rows = inventory_days::table
        .filter(inventory_days::room_type_id.eq(room_type_id.as_uuid()))
        .filter(inventory_days::stay_date.ge(stay.check_in()))
        .filter(inventory_days::stay_date.lt(stay.check_out()))
        .order(inventory_days::stay_date.asc())
        .select(InventoryDayRow::as_select())
        .for_update()
        .load(conn)
        .await?;
    let days: Vec<InventoryDay> = rows.into_iter().map(Into::into).collect();
    ensure_capacity(room_type_id, stay, &days)?;

    let updated = diesel::update(
        inventory_days::table
            .filter(inventory_days::room_type_id.eq(room_type_id.as_uuid()))
            .filter(inventory_days::stay_date.ge(stay.check_in()))
            .filter(inventory_days::stay_date.lt(stay.check_out())),
    )
    .set((
        inventory_days::available.eq(inventory_days::available - 1),
        inventory_days::updated_at.eq(Some(chrono::Utc::now())),
    ))
    .execute(conn)
    .await?;

    if updated != stay.nights() as usize {
        return Err(BookingError::Storage(format!(
            "expected to decrement {} nights of room type {room_type_id}, touched {updated}",
            stay.nights()
        )));
    }
    debug!(%room_type_id, %stay, "inventory decremented");
    Ok(())
}

#[async_trait]
impl InventoryLedger for PgLedger {
    async fn insert_missing(&self, days: Vec<InventoryDay>) -> Result<usize, BookingError> {
        let mut conn = self.pool.get().await?;
        let rows: Vec<NewInventoryDay> = days.iter().map(Into::into).collect();

        let mut inserted = 0;
        for chunk in rows.chunks(INSERT_CHUNK) {
            inserted += diesel::insert_into(inventory_days::table)
                .values(chunk)
                .on_conflict((inventory_days::room_type_id, inventory_days::stay_date))
                .do_nothing()
                .execute(&mut conn)
                .await?;
        }
        Ok(inserted)
    }

    async fn days_for(&self, room_type_id: RoomTypeId, stay: &StayRange) -> Result<Vec<InventoryDay>, BookingError> {
        let mut conn = self.pool.get().await?;
        let rows = inventory_days::table
            .filter(inventory_days::room_type_id.eq(room_type_id.as_uuid()))
            .filter(inventory_days::stay_date.ge(stay.check_in()))
            .filter(inventory_days::stay_date.lt(stay.check_out()))
            .order(inventory_days::stay_date.asc())
            .select(InventoryDayRow::as_select())
            .load(&mut conn)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn days_with_capacity(&self, stay: &StayRange) -> Result<Vec<InventoryDay>, BookingError> {
        let mut conn = self.pool.get().await?;
        let rows = inventory_days::table
            .filter(inventory_days::stay_date.ge(stay.check_in()))
            .filter(inventory_days::stay_date.lt(stay.check_out()))
            .filter(inventory_days::available.gt(0))
            .select(InventoryDayRow::as_select())
            .load(&mut conn)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}
