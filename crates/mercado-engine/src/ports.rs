//! # Storage Ports
//!
//! The storage interfaces the use cases depend on. Every lookup is scoped
//! by tenant; SKUs and slugs are only unique inside a tenant.
//!
//! ```text
//! ┌──────────────┐     ┌──────────────────────┐     ┌──────────────────┐
//! │  Use cases   │────►│  Arc<dyn ...Repository> │◄──│ mercado-db (SQL) │
//! │  (engine)    │     └──────────────────────┘     │ memory.rs (tests)│
//! └──────────────┘                                   └──────────────────┘
//! ```
//!
//! Implementations report uniqueness violations as [`RepoError::Conflict`]
//! and everything they cannot classify as [`RepoError::Backend`].

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use mercado_core::inventory::{ClampOutcome, StockDemand};
use mercado_core::types::{
    CommentTarget, Comment, InventoryRecord, Order, Product, Store, StoreClaim,
};
use mercado_core::Cart;

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepoError {
    /// An update targeted a row that does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A uniqueness constraint was violated.
    #[error("{field} '{value}' already exists")]
    Conflict { field: String, value: String },

    /// Anything else the backend failed at. Never shown to callers.
    #[error("storage backend failure: {0}")]
    Backend(String),
}

pub type RepoResult<T> = Result<T, RepoError>;

// =============================================================================
// Query Shapes
// =============================================================================

/// Filters for listing a store's products.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    /// Case-insensitive substring over title and description.
    pub q: Option<String>,
    pub active: Option<bool>,
    pub category_id: Option<String>,
}

impl ProductFilter {
    /// Applies the filter to a product. Adapters that cannot push a filter
    /// down to storage use this.
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(active) = self.active {
            if product.active != active {
                return false;
            }
        }
        if let Some(category_id) = &self.category_id {
            if !product.category_ids.iter().any(|c| c == category_id) {
                return false;
            }
        }
        match self.q.as_deref() {
            Some(q) if !q.is_empty() => product.matches_text(q),
            _ => true,
        }
    }
}

/// Result of an atomic multi-SKU stock commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Every demand was deducted.
    Committed,
    /// Nothing was deducted; this SKU could not cover its demand.
    Shortfall {
        sku: String,
        available: i64,
        requested: i64,
    },
}

// =============================================================================
// Repositories
// =============================================================================

#[async_trait]
pub trait StoreRepository: Send + Sync {
    /// Fails with `Conflict` on a duplicate (slug, tenant).
    async fn insert(&self, store: &Store) -> RepoResult<()>;
    async fn find_by_id(&self, id: &str, tenant_id: &str) -> RepoResult<Option<Store>>;
    /// Lists a tenant's stores, optionally filtered by a name substring.
    async fn list(&self, tenant_id: &str, q: Option<&str>) -> RepoResult<Vec<Store>>;
    async fn update(&self, store: &Store) -> RepoResult<()>;
}

#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Fails with `Conflict` on a duplicate (store, slug) or a variant SKU
    /// already used in the tenant.
    async fn insert(&self, product: &Product) -> RepoResult<()>;
    async fn find_by_id(&self, id: &str, tenant_id: &str) -> RepoResult<Option<Product>>;
    /// Finds the product owning the variant `sku`.
    async fn find_by_sku(&self, sku: &str, tenant_id: &str) -> RepoResult<Option<Product>>;
    async fn list_by_store(
        &self,
        store_id: &str,
        tenant_id: &str,
        filter: &ProductFilter,
    ) -> RepoResult<Vec<Product>>;
}

#[async_trait]
pub trait InventoryRepository: Send + Sync {
    async fn find(&self, sku: &str, tenant_id: &str) -> RepoResult<Option<InventoryRecord>>;

    /// Adds `delta` to quantity on hand, creating a zero record first if
    /// needed. The result is floor-clamped at zero.
    async fn apply_delta(
        &self,
        sku: &str,
        tenant_id: &str,
        delta: i64,
    ) -> RepoResult<(InventoryRecord, ClampOutcome)>;

    /// Checks `on_hand - reserved >= quantity` for every demand and deducts
    /// them all, or deducts nothing. Atomic with respect to every other
    /// inventory operation on the same tenant.
    async fn commit_demands(
        &self,
        tenant_id: &str,
        demands: &[StockDemand],
    ) -> RepoResult<CommitOutcome>;
}

#[async_trait]
pub trait CartRepository: Send + Sync {
    async fn find(&self, user_id: &str, tenant_id: &str) -> RepoResult<Option<Cart>>;
    /// Inserts or replaces the cart of (user, tenant).
    async fn save(&self, cart: &Cart) -> RepoResult<()>;
}

#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn insert(&self, order: &Order) -> RepoResult<()>;
    async fn find_by_id(&self, id: &str, tenant_id: &str) -> RepoResult<Option<Order>>;
    async fn list_by_user(&self, user_id: &str, tenant_id: &str) -> RepoResult<Vec<Order>>;
    /// Persists `status` and `payment_status`; items are never rewritten.
    async fn update_status(&self, order: &Order) -> RepoResult<()>;
}

#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn insert(&self, comment: &Comment) -> RepoResult<()>;
    async fn find_by_id(&self, id: &str, tenant_id: &str) -> RepoResult<Option<Comment>>;
    async fn list_by_target(
        &self,
        target_type: CommentTarget,
        target_id: &str,
        tenant_id: &str,
    ) -> RepoResult<Vec<Comment>>;
    async fn delete(&self, id: &str, tenant_id: &str) -> RepoResult<()>;
}

#[async_trait]
pub trait ClaimRepository: Send + Sync {
    async fn insert(&self, claim: &StoreClaim) -> RepoResult<()>;
    async fn find_by_id(&self, id: &str, tenant_id: &str) -> RepoResult<Option<StoreClaim>>;
    async fn list_by_store(&self, store_id: &str, tenant_id: &str) -> RepoResult<Vec<StoreClaim>>;
    async fn update(&self, claim: &StoreClaim) -> RepoResult<()>;
}

/// Every port the engine needs, wired once by the composition root.
#[derive(Clone)]
pub struct Repositories {
    pub stores: Arc<dyn StoreRepository>,
    pub products: Arc<dyn ProductRepository>,
    pub inventory: Arc<dyn InventoryRepository>,
    pub carts: Arc<dyn CartRepository>,
    pub orders: Arc<dyn OrderRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub claims: Arc<dyn ClaimRepository>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use mercado_core::types::{ProductKind, ProductVariant};
    use mercado_core::{Money, Pricing};

    fn product(active: bool, categories: &[&str]) -> Product {
        Product {
            id: "p1".into(),
            tenant_id: "t1".into(),
            store_id: "s1".into(),
            kind: ProductKind::Simple,
            title: "Taza de Barro".into(),
            slug: "taza".into(),
            description: None,
            category_ids: categories.iter().map(|c| c.to_string()).collect(),
            variants: vec![ProductVariant::new("TAZA", "Chica", Pricing::new(Money::from_major(80)))],
            active,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_filter_matches() {
        let p = product(true, &["cocina"]);
        assert!(ProductFilter::default().matches(&p));
        assert!(ProductFilter { q: Some("BARRO".into()), ..Default::default() }.matches(&p));
        assert!(!ProductFilter { active: Some(false), ..Default::default() }.matches(&p));
        assert!(!ProductFilter { category_id: Some("jardin".into()), ..Default::default() }.matches(&p));
        assert!(ProductFilter { q: Some(String::new()), ..Default::default() }.matches(&p));
    }
}
