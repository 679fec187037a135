//! # Inventory Repository
//!
//! ## Atomic Commit
//! ```text
//! BEGIN
//!   for each demand (sorted by SKU):
//!     UPDATE inventory
//!        SET quantity_on_hand = quantity_on_hand - qty
//!      WHERE tenant_id = ? AND sku = ?
//!        AND quantity_on_hand - reserved >= qty
//!     0 rows? ──► read availability, ROLLBACK, Shortfall
//! COMMIT ──► Committed
//! ```
//!
//! The first UPDATE takes SQLite's write lock, so no other inventory write
//! can interleave between the check and the deduction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::debug;

use mercado_core::inventory::{apply_delta_clamped, ClampOutcome, StockDemand};
use mercado_core::types::InventoryRecord;
use mercado_engine::ports::{CommitOutcome, InventoryRepository, RepoResult};

use crate::error::{DbError, DbResult};

#[derive(Debug, sqlx::FromRow)]
struct InventoryRow {
    sku: String,
    tenant_id: String,
    quantity_on_hand: i64,
    reserved: i64,
    updated_at: DateTime<Utc>,
}

impl From<InventoryRow> for InventoryRecord {
    fn from(row: InventoryRow) -> Self {
        InventoryRecord {
            sku: row.sku,
            tenant_id: row.tenant_id,
            quantity_on_hand: row.quantity_on_hand,
            reserved: row.reserved,
            updated_at: row.updated_at,
        }
    }
}

const SELECT_INVENTORY: &str = r#"
    SELECT sku, tenant_id, quantity_on_hand, reserved, updated_at
    FROM inventory
    WHERE tenant_id = ?1 AND sku = ?2
"#;

#[derive(Debug, Clone)]
pub struct SqliteInventory {
    pool: SqlitePool,
}

impl SqliteInventory {
    pub fn new(pool: SqlitePool) -> Self {
        SqliteInventory { pool }
    }

    async fn fetch(
        tx: &mut Transaction<'_, Sqlite>,
        sku: &str,
        tenant_id: &str,
    ) -> DbResult<Option<InventoryRecord>> {
        let row = sqlx::query_as::<_, InventoryRow>(SELECT_INVENTORY)
            .bind(tenant_id)
            .bind(sku)
            .fetch_optional(&mut **tx)
            .await?;
        Ok(row.map(InventoryRecord::from))
    }

    async fn apply(&self, sku: &str, tenant_id: &str, delta: i64) -> DbResult<(InventoryRecord, ClampOutcome)> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        // Write first so the transaction holds the write lock before reading.
        sqlx::query(
            r#"
            INSERT INTO inventory (tenant_id, sku, quantity_on_hand, reserved, updated_at)
            VALUES (?1, ?2, 0, 0, ?3)
            ON CONFLICT (tenant_id, sku) DO NOTHING
            "#,
        )
        .bind(tenant_id)
        .bind(sku)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let current = Self::fetch(&mut tx, sku, tenant_id)
            .await?
            .ok_or_else(|| DbError::Internal(format!("inventory row for {sku} vanished")))?;
        let outcome = apply_delta_clamped(current.quantity_on_hand, delta);

        sqlx::query(
            "UPDATE inventory SET quantity_on_hand = ?1, updated_at = ?2 WHERE tenant_id = ?3 AND sku = ?4",
        )
        .bind(outcome.quantity_on_hand)
        .bind(now)
        .bind(tenant_id)
        .bind(sku)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        let record = InventoryRecord {
            quantity_on_hand: outcome.quantity_on_hand,
            updated_at: now,
            ..current
        };
        Ok((record, outcome))
    }

    async fn commit(&self, tenant_id: &str, demands: &[StockDemand]) -> DbResult<CommitOutcome> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        for demand in demands {
            let result = sqlx::query(
                r#"
                UPDATE inventory
                SET quantity_on_hand = quantity_on_hand - ?1, updated_at = ?2
                WHERE tenant_id = ?3 AND sku = ?4 AND quantity_on_hand - reserved >= ?1
                "#,
            )
            .bind(demand.quantity)
            .bind(now)
            .bind(tenant_id)
            .bind(&demand.sku)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                let available = Self::fetch(&mut tx, &demand.sku, tenant_id)
                    .await?
                    .map_or(0, |record| record.availability().available);
                tx.rollback().await?;
                debug!(sku = %demand.sku, available, requested = demand.quantity, "Stock commit rolled back");
                return Ok(CommitOutcome::Shortfall {
                    sku: demand.sku.clone(),
                    available,
                    requested: demand.quantity,
                });
            }
        }

        tx.commit().await?;
        Ok(CommitOutcome::Committed)
    }
}

#[async_trait]
impl InventoryRepository for SqliteInventory {
    async fn find(&self, sku: &str, tenant_id: &str) -> RepoResult<Option<InventoryRecord>> {
        let row = sqlx::query_as::<_, InventoryRow>(SELECT_INVENTORY)
            .bind(tenant_id)
            .bind(sku)
            .fetch_optional(&self.pool)
            .await
            .map_err(DbError::from)?;
        Ok(row.map(InventoryRecord::from))
    }

    async fn apply_delta(
        &self,
        sku: &str,
        tenant_id: &str,
        delta: i64,
    ) -> RepoResult<(InventoryRecord, ClampOutcome)> {
        Ok(self.apply(sku, tenant_id, delta).await?)
    }

    async fn commit_demands(
        &self,
        tenant_id: &str,
        demands: &[StockDemand],
    ) -> RepoResult<CommitOutcome> {
        Ok(self.commit(tenant_id, demands).await?)
    }
}
