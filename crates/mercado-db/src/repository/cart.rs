//! # Cart Repository
//!
//! One row per (tenant, user). Lines are stored as JSON and replaced whole
//! on every save.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use mercado_core::{Cart, CartItem};
use mercado_engine::ports::{CartRepository, RepoResult};

use crate::error::{DbError, DbResult};
use crate::repository::{from_json, to_json};

#[derive(Debug, sqlx::FromRow)]
struct CartRow {
    id: String,
    tenant_id: String,
    user_id: String,
    items: String,
    created_at: DateTime<Utc>,
}

impl CartRow {
    fn into_cart(self) -> DbResult<Cart> {
        Ok(Cart {
            id: self.id,
            user_id: self.user_id,
            tenant_id: self.tenant_id,
            items: from_json::<Vec<CartItem>>(&self.items)?,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, Clone)]
pub struct SqliteCarts {
    pool: SqlitePool,
}

impl SqliteCarts {
    pub fn new(pool: SqlitePool) -> Self {
        SqliteCarts { pool }
    }
}

#[async_trait]
impl CartRepository for SqliteCarts {
    async fn find(&self, user_id: &str, tenant_id: &str) -> RepoResult<Option<Cart>> {
        let row = sqlx::query_as::<_, CartRow>(
            r#"
            SELECT id, tenant_id, user_id, items, created_at
            FROM carts
            WHERE tenant_id = ?1 AND user_id = ?2
            "#,
        )
        .bind(tenant_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(row.map(CartRow::into_cart).transpose()?)
    }

    async fn save(&self, cart: &Cart) -> RepoResult<()> {
        let items = to_json(&cart.items)?;
        sqlx::query(
            r#"
            INSERT INTO carts (tenant_id, user_id, id, items, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT (tenant_id, user_id) DO UPDATE SET items = excluded.items
            "#,
        )
        .bind(&cart.tenant_id)
        .bind(&cart.user_id)
        .bind(&cart.id)
        .bind(items)
        .bind(cart.created_at)
        .execute(&self.pool)
        .await
        .map_err(DbError::from)?;
        Ok(())
    }
}
