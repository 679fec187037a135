//! # Store Repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use mercado_core::types::{Store, StoreType};
use mercado_engine::ports::{RepoError, RepoResult, StoreRepository};

use crate::error::DbError;

#[derive(Debug, sqlx::FromRow)]
struct StoreRow {
    id: String,
    tenant_id: String,
    name: String,
    slug: String,
    store_type: StoreType,
    owner_id: Option<String>,
    verified_badge: bool,
    created_at: DateTime<Utc>,
}

impl From<StoreRow> for Store {
    fn from(row: StoreRow) -> Self {
        Store {
            id: row.id,
            tenant_id: row.tenant_id,
            name: row.name,
            slug: row.slug,
            store_type: row.store_type,
            owner_id: row.owner_id,
            verified_badge: row.verified_badge,
            created_at: row.created_at,
        }
    }
}

const SELECT_STORE: &str = r#"
    SELECT id, tenant_id, name, slug, store_type, owner_id, verified_badge, created_at
    FROM stores
"#;

#[derive(Debug, Clone)]
pub struct SqliteStores {
    pool: SqlitePool,
}

impl SqliteStores {
    pub fn new(pool: SqlitePool) -> Self {
        SqliteStores { pool }
    }
}

#[async_trait]
impl StoreRepository for SqliteStores {
    async fn insert(&self, store: &Store) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO stores (
                id, tenant_id, name, slug, store_type, owner_id, verified_badge, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&store.id)
        .bind(&store.tenant_id)
        .bind(&store.name)
        .bind(&store.slug)
        .bind(store.store_type)
        .bind(&store.owner_id)
        .bind(store.verified_badge)
        .bind(store.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from(e).on_conflict("slug", &store.slug))?;

        debug!(store_id = %store.id, slug = %store.slug, "Store inserted");
        Ok(())
    }

    async fn find_by_id(&self, id: &str, tenant_id: &str) -> RepoResult<Option<Store>> {
        let row = sqlx::query_as::<_, StoreRow>(&format!(
            "{SELECT_STORE} WHERE id = ?1 AND tenant_id = ?2"
        ))
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(row.map(Store::from))
    }

    async fn list(&self, tenant_id: &str, q: Option<&str>) -> RepoResult<Vec<Store>> {
        let rows = sqlx::query_as::<_, StoreRow>(&format!(
            "{SELECT_STORE} WHERE tenant_id = ?1 ORDER BY created_at, rowid"
        ))
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)?;

        // SQLite's lower() folds ASCII only; match names in Rust.
        let needle = q.map(str::to_lowercase);
        Ok(rows
            .into_iter()
            .map(Store::from)
            .filter(|s| {
                needle
                    .as_deref()
                    .map_or(true, |n| s.name.to_lowercase().contains(n))
            })
            .collect())
    }

    async fn update(&self, store: &Store) -> RepoResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE stores
            SET name = ?1, store_type = ?2, owner_id = ?3, verified_badge = ?4
            WHERE id = ?5 AND tenant_id = ?6
            "#,
        )
        .bind(&store.name)
        .bind(store.store_type)
        .bind(&store.owner_id)
        .bind(store.verified_badge)
        .bind(&store.id)
        .bind(&store.tenant_id)
        .execute(&self.pool)
        .await
        .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound {
                entity: "store",
                id: store.id.clone(),
            });
        }
        Ok(())
    }
}
