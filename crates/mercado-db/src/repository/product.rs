//! # Product Repository
//!
//! Products are stored as one row with their variants, bundle items and
//! categories as JSON. Each variant SKU also gets a `product_variants` row:
//!
//! ```text
//! products                               product_variants
//! ┌──────────┬──────────────────────┐    ┌──────────┬────────────┬────────────┐
//! │ id       │ variants (JSON)      │    │ tenant_id│ sku        │ product_id │
//! ├──────────┼──────────────────────┤    ├──────────┼────────────┼────────────┤
//! │ p-1      │ [TAZA-CH, TAZA-GR]   │◄───│ t1       │ TAZA-CH    │ p-1        │
//! │          │                      │◄───│ t1       │ TAZA-GR    │ p-1        │
//! └──────────┴──────────────────────┘    └──────────┴────────────┴────────────┘
//!                                         PRIMARY KEY (tenant_id, sku)
//! ```
//!
//! The product row and its SKU rows are written in one transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use mercado_core::types::{BundleItem, Product, ProductKind, ProductType, ProductVariant};
use mercado_engine::ports::{ProductFilter, ProductRepository, RepoResult};

use crate::error::{DbError, DbResult};
use crate::repository::{from_json, to_json};

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: String,
    tenant_id: String,
    store_id: String,
    product_type: ProductType,
    bundle_items: String,
    title: String,
    slug: String,
    description: Option<String>,
    category_ids: String,
    variants: String,
    active: bool,
    created_at: DateTime<Utc>,
}

impl ProductRow {
    fn into_product(self) -> DbResult<Product> {
        let kind = match self.product_type {
            ProductType::Simple => ProductKind::Simple,
            ProductType::Bundle => ProductKind::Bundle {
                items: from_json::<Vec<BundleItem>>(&self.bundle_items)?,
            },
        };
        Ok(Product {
            id: self.id,
            tenant_id: self.tenant_id,
            store_id: self.store_id,
            kind,
            title: self.title,
            slug: self.slug,
            description: self.description,
            category_ids: from_json(&self.category_ids)?,
            variants: from_json::<Vec<ProductVariant>>(&self.variants)?,
            active: self.active,
            created_at: self.created_at,
        })
    }
}

const SELECT_PRODUCT: &str = r#"
    SELECT p.id, p.tenant_id, p.store_id, p.product_type, p.bundle_items, p.title,
           p.slug, p.description, p.category_ids, p.variants, p.active, p.created_at
    FROM products p
"#;

#[derive(Debug, Clone)]
pub struct SqliteProducts {
    pool: SqlitePool,
}

impl SqliteProducts {
    pub fn new(pool: SqlitePool) -> Self {
        SqliteProducts { pool }
    }

    async fn insert_product(&self, product: &Product) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO products (
                id, tenant_id, store_id, product_type, bundle_items, title, slug,
                description, category_ids, variants, active, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(&product.id)
        .bind(&product.tenant_id)
        .bind(&product.store_id)
        .bind(product.product_type())
        .bind(to_json(product.kind.bundle_items())?)
        .bind(&product.title)
        .bind(&product.slug)
        .bind(&product.description)
        .bind(to_json(&product.category_ids)?)
        .bind(to_json(&product.variants)?)
        .bind(product.active)
        .bind(product.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| DbError::from(e).on_conflict("slug", &product.slug))?;

        for variant in &product.variants {
            sqlx::query("INSERT INTO product_variants (tenant_id, sku, product_id) VALUES (?1, ?2, ?3)")
                .bind(&product.tenant_id)
                .bind(&variant.sku)
                .bind(&product.id)
                .execute(&mut *tx)
                .await
                .map_err(|e| DbError::from(e).on_conflict("sku", &variant.sku))?;
        }

        // Dropping `tx` on any error above rolls everything back.
        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl ProductRepository for SqliteProducts {
    async fn insert(&self, product: &Product) -> RepoResult<()> {
        self.insert_product(product).await?;
        debug!(
            product_id = %product.id,
            variants = product.variants.len(),
            "Product inserted"
        );
        Ok(())
    }

    async fn find_by_id(&self, id: &str, tenant_id: &str) -> RepoResult<Option<Product>> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "{SELECT_PRODUCT} WHERE p.id = ?1 AND p.tenant_id = ?2"
        ))
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(row.map(ProductRow::into_product).transpose()?)
    }

    async fn find_by_sku(&self, sku: &str, tenant_id: &str) -> RepoResult<Option<Product>> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r#"{SELECT_PRODUCT}
            INNER JOIN product_variants v ON v.product_id = p.id
            WHERE v.tenant_id = ?1 AND v.sku = ?2"#
        ))
        .bind(tenant_id)
        .bind(sku)
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(row.map(ProductRow::into_product).transpose()?)
    }

    async fn list_by_store(
        &self,
        store_id: &str,
        tenant_id: &str,
        filter: &ProductFilter,
    ) -> RepoResult<Vec<Product>> {
        // `active` is pushed down; text and category matching need the
        // decoded product.
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            r#"{SELECT_PRODUCT}
            WHERE p.store_id = ?1 AND p.tenant_id = ?2 AND (?3 IS NULL OR p.active = ?3)
            ORDER BY p.created_at, p.rowid"#
        ))
        .bind(store_id)
        .bind(tenant_id)
        .bind(filter.active)
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)?;

        let mut products = Vec::with_capacity(rows.len());
        for row in rows {
            let product = row.into_product()?;
            if filter.matches(&product) {
                products.push(product);
            }
        }
        Ok(products)
    }
}
