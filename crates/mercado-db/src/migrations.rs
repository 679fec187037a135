//! # Schema Migrations
//!
//! The SQL files under `migrations/sqlite` are compiled into the binary and
//! applied in filename order. sqlx records each one in `_sqlx_migrations`,
//! so reapplying is a no-op.
//!
//! | File | Creates |
//! |---|---|
//! | `001_initial_schema.sql` | stores, products, product_variants, inventory, carts, orders, comments, store_claims |
//!
//! Schema changes go in a new numbered file; an applied file is never edited.

use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::DbResult;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    debug!(embedded = MIGRATOR.migrations.len(), "Applying schema migrations");
    MIGRATOR.run(pool).await?;
    info!("Schema up to date");
    Ok(())
}

/// `(embedded, applied)` migration counts.
pub async fn migration_status(pool: &SqlitePool) -> DbResult<(usize, usize)> {
    let embedded = MIGRATOR.migrations.len();

    // No bookkeeping table until the first run.
    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
        .fetch_one(pool)
        .await
        .unwrap_or(0);

    Ok((embedded, usize::try_from(applied).unwrap_or(0)))
}
