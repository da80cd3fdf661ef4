//! Database pool and pooled entry points.
//!
//! The engine is I/O-bound with no CPU-heavy work: every operation is a
//! short, single-pass read or write, so the pooled wrappers below just move
//! the blocking diesel call onto the blocking thread pool.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::r2d2::{self, ConnectionManager, CustomizeConnection};
use diesel::sql_query;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

use crate::models::Payout;
use crate::services::checkout::{preview_checkout, CartItem, CheckoutPreview};
use crate::services::order_finalizer::finalize_order_fees;
use crate::services::payout::create_payout;
use crate::services::revenue::{platform_revenue_summary, PlatformRevenueSummary};
use crate::services::webhook_ledger::{record_webhook_event, WebhookReceipt};
use crate::{error::SettlementError, models::SellerOrderFees};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

pub type DbPool = r2d2::Pool<ConnectionManager<SqliteConnection>>;

/// Applies connection pragmas on every pooled connection.
#[derive(Debug, Clone)]
struct SqlitePragmaCustomizer;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for SqlitePragmaCustomizer {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        // Unique constraints back the idempotency guarantees; keep FK
        // enforcement on as well.
        sql_query("PRAGMA foreign_keys = ON;")
            .execute(conn)
            .map_err(diesel::r2d2::Error::QueryError)?;

        // Wait up to 5 seconds for locks instead of failing immediately
        sql_query("PRAGMA busy_timeout = 5000;")
            .execute(conn)
            .map_err(diesel::r2d2::Error::QueryError)?;

        sql_query("PRAGMA journal_mode = WAL;")
            .execute(conn)
            .map_err(diesel::r2d2::Error::QueryError)?;

        sql_query("PRAGMA synchronous = NORMAL;")
            .execute(conn)
            .map_err(diesel::r2d2::Error::QueryError)?;

        Ok(())
    }
}

/// Create the connection pool for the settlement database.
pub fn create_pool(database_url: &str) -> Result<DbPool> {
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    let pool = r2d2::Pool::builder()
        .max_size(10)
        .connection_timeout(std::time::Duration::from_secs(30))
        .connection_customizer(Box::new(SqlitePragmaCustomizer))
        .build(manager)
        .context("Failed to create database connection pool")?;
    Ok(pool)
}

/// Apply pending embedded migrations.
pub fn run_migrations(conn: &mut SqliteConnection) -> Result<()> {
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| anyhow::anyhow!("Failed to run migrations: {e}"))?;
    Ok(())
}

/// In-memory database with migrations applied, for unit tests.
#[cfg(test)]
pub fn test_connection() -> SqliteConnection {
    let mut conn = SqliteConnection::establish(":memory:").expect("in-memory sqlite");
    run_migrations(&mut conn).expect("migrations");
    conn
}

// ============================================================================
// Pooled async entry points for the transport layer
// ============================================================================

pub async fn db_preview_checkout(pool: &DbPool, cart: Vec<CartItem>) -> Result<CheckoutPreview> {
    let mut conn = pool.get().context("Failed to get DB connection")?;
    tokio::task::spawn_blocking(move || preview_checkout(&mut conn, &cart)).await?
}

pub async fn db_finalize_order_fees(
    pool: &DbPool,
    order_group_id: String,
    cart: Vec<CartItem>,
    fee_config_id: String,
) -> std::result::Result<Vec<SellerOrderFees>, SettlementError> {
    let mut conn = pool
        .get()
        .context("Failed to get DB connection")
        .map_err(SettlementError::Storage)?;
    tokio::task::spawn_blocking(move || {
        finalize_order_fees(&mut conn, &order_group_id, &cart, &fee_config_id)
    })
    .await
    .map_err(|e| SettlementError::Storage(anyhow::Error::new(e)))?
}

pub async fn db_create_payout(
    pool: &DbPool,
    seller_order_id: String,
) -> std::result::Result<Payout, SettlementError> {
    let mut conn = pool
        .get()
        .context("Failed to get DB connection")
        .map_err(SettlementError::Storage)?;
    tokio::task::spawn_blocking(move || create_payout(&mut conn, &seller_order_id))
        .await
        .map_err(|e| SettlementError::Storage(anyhow::Error::new(e)))?
}

pub async fn db_record_webhook_event(
    pool: &DbPool,
    provider: String,
    event_id: String,
    payload: String,
    signature: Option<String>,
) -> Result<WebhookReceipt> {
    let mut conn = pool.get().context("Failed to get DB connection")?;
    tokio::task::spawn_blocking(move || {
        record_webhook_event(&mut conn, &provider, &event_id, &payload, signature.as_deref())
    })
    .await?
}

pub async fn db_revenue_summary(
    pool: &DbPool,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<PlatformRevenueSummary> {
    let mut conn = pool.get().context("Failed to get DB connection")?;
    tokio::task::spawn_blocking(move || platform_revenue_summary(&mut conn, start, end)).await?
}
