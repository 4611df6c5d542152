use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use inventory_service::ledger::pg as ledger;
use shared::db::{self, DbPool};
use shared::{BookingError, Order, OrderAction, OrderId, OrderStatus, RoomNumber};
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

use super::{apply_ledger_free, order_not_found, OrderStore};
use crate::models::OrderRow;
use crate::schema::orders;

/// Orders and inventory in one PostgreSQL database. Confirmation locks the
/// order row and the stay's inventory rows in a single transaction.
#[derive(Clone)]
pub struct PgOrderStore {
    pool: DbPool,
    lock_timeout: Duration,
}

impl PgOrderStore {
    pub fn new(pool: DbPool, lock_timeout: Duration) -> Self {
        Self { pool, lock_timeout }
    }
}

async fn lock_order(conn: &mut AsyncPgConnection, id: OrderId) -> Result<Order, BookingError> {
    let row = orders::table
        .find(id.as_uuid())
        .select(OrderRow::as_select())
        .for_update()
        .first(conn)
        .await
        .optional()?
        .ok_or_else(|| order_not_found(id))?;
    Order::try_from(row)
}

async fn write_state(conn: &mut AsyncPgConnection, order: &Order) -> Result<(), BookingError> {
    diesel::update(orders::table.find(order.id.as_uuid()))
        .set((
            orders::status.eq(order.status.as_str()),
            orders::assigned_room_number.eq(order.assigned_room_number.as_ref().map(RoomNumber::as_str)),
            orders::confirmed_at.eq(order.confirmed_at),
            orders::updated_at.eq(order.updated_at),
        ))
        .execute(conn)
        .await?;
    Ok(())
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn insert(&self, order: &Order) -> Result<(), BookingError> {
        let mut conn = self.pool.get().await?;
        diesel::insert_into(orders::table)
            .values(OrderRow::from(order))
            .execute(&mut conn)
            .await?;
        Ok(())
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>, BookingError> {
        let mut conn = self.pool.get().await?;
        let row = orders::table
            .find(id.as_uuid())
            .select(OrderRow::as_select())
            .first(&mut conn)
            .await
            .optional()?;
        row.map(Order::try_from).transpose()
    }

    async fn advance(&self, id: OrderId, action: OrderAction, now: DateTime<Utc>) -> Result<Order, BookingError> {
        let mut conn = self.pool.get().await?;
        let lock_timeout = self.lock_timeout;

        conn.transaction::<_, BookingError, _>(|conn| {
            Box::pin(async move {
                db::set_lock_timeout(conn, lock_timeout).await?;
                let mut order = lock_order(conn, id).await?;
                apply_ledger_free(&mut order, action, now)?;
                write_state(conn, &order).await?;
                Ok(order)
            })
        })
        .await
    }

    async fn confirm(&self, id: OrderId, room: RoomNumber, now: DateTime<Utc>) -> Result<Order, BookingError> {
        let mut conn = self.pool.get().await?;
        let lock_timeout = self.lock_timeout;

        let order = conn
            .transaction::<_, BookingError, _>(|conn| {
                Box::pin(async move {
                    db::set_lock_timeout(conn, lock_timeout).await?;
                    let mut order = lock_order(conn, id).await?;
                    order.confirm(room, now)?;
                    ledger::decrement_range(conn, order.room_type_id, &order.stay).await?;
                    write_state(conn, &order).await?;
                    Ok(order)
                })
            })
            .await?;
        debug!(order_id = %id, "order confirmed");
        Ok(order)
    }

    async fn due_for_completion(&self, today: NaiveDate) -> Result<Vec<OrderId>, BookingError> {
        let mut conn = self.pool.get().await?;
        let ids: Vec<Uuid> = orders::table
            .filter(orders::status.eq(OrderStatus::PendingCheckIn.as_str()))
            .filter(orders::check_out.le(today))
            .order(orders::id.asc())
            .select(orders::id)
            .load(&mut conn)
            .await?;
        Ok(ids.into_iter().map(OrderId::from_uuid).collect())
    }
}
