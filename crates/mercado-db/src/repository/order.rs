//! # Order Repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use mercado_core::types::{Order, OrderItem, OrderStatus, PaymentStatus};
use mercado_engine::ports::{OrderRepository, RepoError, RepoResult};

use crate::error::{DbError, DbResult};
use crate::repository::{from_json, to_json};

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: String,
    tenant_id: String,
    user_id: String,
    items: String,
    status: OrderStatus,
    payment_status: PaymentStatus,
    created_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self) -> DbResult<Order> {
        Ok(Order {
            id: self.id,
            tenant_id: self.tenant_id,
            user_id: self.user_id,
            items: from_json::<Vec<OrderItem>>(&self.items)?,
            status: self.status,
            payment_status: self.payment_status,
            created_at: self.created_at,
        })
    }
}

const SELECT_ORDER: &str = r#"
    SELECT id, tenant_id, user_id, items, status, payment_status, created_at
    FROM orders
"#;

#[derive(Debug, Clone)]
pub struct SqliteOrders {
    pool: SqlitePool,
}

impl SqliteOrders {
    pub fn new(pool: SqlitePool) -> Self {
        SqliteOrders { pool }
    }
}

#[async_trait]
impl OrderRepository for SqliteOrders {
    async fn insert(&self, order: &Order) -> RepoResult<()> {
        let items = to_json(&order.items)?;
        sqlx::query(
            r#"
            INSERT INTO orders (id, tenant_id, user_id, items, status, payment_status, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&order.id)
        .bind(&order.tenant_id)
        .bind(&order.user_id)
        .bind(items)
        .bind(order.status)
        .bind(order.payment_status)
        .bind(order.created_at)
        .execute(&self.pool)
        .await
        .map_err(DbError::from)?;

        debug!(order_id = %order.id, lines = order.items.len(), "Order inserted");
        Ok(())
    }

    async fn find_by_id(&self, id: &str, tenant_id: &str) -> RepoResult<Option<Order>> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "{SELECT_ORDER} WHERE id = ?1 AND tenant_id = ?2"
        ))
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(row.map(OrderRow::into_order).transpose()?)
    }

    async fn list_by_user(&self, user_id: &str, tenant_id: &str) -> RepoResult<Vec<Order>> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "{SELECT_ORDER} WHERE user_id = ?1 AND tenant_id = ?2 ORDER BY created_at DESC, rowid DESC"
        ))
        .bind(user_id)
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)?;

        let orders = rows
            .into_iter()
            .map(OrderRow::into_order)
            .collect::<DbResult<Vec<_>>>()?;
        Ok(orders)
    }

    async fn update_status(&self, order: &Order) -> RepoResult<()> {
        let result = sqlx::query(
            "UPDATE orders SET status = ?1, payment_status = ?2 WHERE id = ?3 AND tenant_id = ?4",
        )
        .bind(order.status)
        .bind(order.payment_status)
        .bind(&order.id)
        .bind(&order.tenant_id)
        .execute(&self.pool)
        .await
        .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound {
                entity: "order",
                id: order.id.clone(),
            });
        }
        Ok(())
    }
}
