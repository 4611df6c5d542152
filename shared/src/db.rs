use anyhow::Result;
use diesel::{Connection, PgConnection};
use diesel_async::pooled_connection::bb8::Pool;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness};
use std::time::Duration;
use tracing::info;

use crate::error::BookingError;

pub type DbPool = Pool<AsyncPgConnection>;

/// Applies a service's embedded migrations over a blocking connection.
pub fn run_migrations(database_url: &str, migrations: EmbeddedMigrations) -> Result<()> {
    info!("Running database migrations...");
    let mut conn = PgConnection::establish(database_url)?;
    conn.run_pending_migrations(migrations)
        .map_err(|e| anyhow::anyhow!("Migration error: {}", e))?;
    info!("Migrations completed successfully");
    Ok(())
}

pub async fn connect(database_url: &str, max_size: u32, connection_timeout: Duration) -> Result<DbPool> {
    let config = AsyncDieselConnectionManager::<AsyncPgConnection>::new(database_url);
    let pool = Pool::builder()
        .max_size(max_size)
        .connection_timeout(connection_timeout)
        .build(config)
        .await?;
    Ok(pool)
}

/// Bounds row-lock waits for the rest of the current transaction.
pub async fn set_lock_timeout(conn: &mut AsyncPgConnection, timeout: Duration) -> Result<(), BookingError> {
    diesel::sql_query(format!("SET LOCAL lock_timeout = '{}ms'", timeout.as_millis()))
        .execute(conn)
        .await?;
    Ok(())
}
