//! # In-Memory Adapters
//!
//! Process-local implementations of every port, used by tests and demos.
//! Each adapter guards its state with one `tokio::sync::Mutex`; the
//! inventory commit runs entirely under that lock.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use mercado_core::inventory::{apply_delta_clamped, ClampOutcome, StockDemand};
use mercado_core::types::{Comment, CommentTarget, InventoryRecord, Order, Product, Store, StoreClaim};
use mercado_core::Cart;

use crate::ports::{
    CartRepository, ClaimRepository, CommentRepository, CommitOutcome, InventoryRepository,
    OrderRepository, ProductFilter, ProductRepository, RepoError, RepoResult, Repositories,
    StoreRepository,
};

/// A full set of empty in-memory repositories.
pub fn repositories() -> Repositories {
    Repositories {
        stores: Arc::new(MemoryStores::default()),
        products: Arc::new(MemoryProducts::default()),
        inventory: Arc::new(MemoryInventory::default()),
        carts: Arc::new(MemoryCarts::default()),
        orders: Arc::new(MemoryOrders::default()),
        comments: Arc::new(MemoryComments::default()),
        claims: Arc::new(MemoryClaims::default()),
    }
}

fn not_found(entity: &'static str, id: &str) -> RepoError {
    RepoError::NotFound {
        entity,
        id: id.to_string(),
    }
}

// =============================================================================
// Stores
// =============================================================================

#[derive(Debug, Default)]
pub struct MemoryStores {
    rows: Mutex<Vec<Store>>,
}

#[async_trait]
impl StoreRepository for MemoryStores {
    async fn insert(&self, store: &Store) -> RepoResult<()> {
        let mut rows = self.rows.lock().await;
        if rows
            .iter()
            .any(|s| s.tenant_id == store.tenant_id && s.slug == store.slug)
        {
            return Err(RepoError::Conflict {
                field: "slug".to_string(),
                value: store.slug.clone(),
            });
        }
        rows.push(store.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &str, tenant_id: &str) -> RepoResult<Option<Store>> {
        let rows = self.rows.lock().await;
        Ok(rows
            .iter()
            .find(|s| s.id == id && s.tenant_id == tenant_id)
            .cloned())
    }

    async fn list(&self, tenant_id: &str, q: Option<&str>) -> RepoResult<Vec<Store>> {
        let needle = q.map(str::to_lowercase);
        let rows = self.rows.lock().await;
        Ok(rows
            .iter()
            .filter(|s| s.tenant_id == tenant_id)
            .filter(|s| {
                needle
                    .as_deref()
                    .map_or(true, |n| s.name.to_lowercase().contains(n))
            })
            .cloned()
            .collect())
    }

    async fn update(&self, store: &Store) -> RepoResult<()> {
        let mut rows = self.rows.lock().await;
        let row = rows
            .iter_mut()
            .find(|s| s.id == store.id && s.tenant_id == store.tenant_id)
            .ok_or_else(|| not_found("store", &store.id))?;
        *row = store.clone();
        Ok(())
    }
}

// =============================================================================
// Products
// =============================================================================

#[derive(Debug, Default)]
pub struct MemoryProducts {
    rows: Mutex<Vec<Product>>,
}

#[async_trait]
impl ProductRepository for MemoryProducts {
    async fn insert(&self, product: &Product) -> RepoResult<()> {
        let mut rows = self.rows.lock().await;
        for existing in rows.iter().filter(|p| p.tenant_id == product.tenant_id) {
            if existing.store_id == product.store_id && existing.slug == product.slug {
                return Err(RepoError::Conflict {
                    field: "slug".to_string(),
                    value: product.slug.clone(),
                });
            }
            if let Some(dupe) = product
                .variants
                .iter()
                .find(|v| existing.variant(&v.sku).is_some())
            {
                return Err(RepoError::Conflict {
                    field: "sku".to_string(),
                    value: dupe.sku.clone(),
                });
            }
        }
        rows.push(product.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &str, tenant_id: &str) -> RepoResult<Option<Product>> {
        let rows = self.rows.lock().await;
        Ok(rows
            .iter()
            .find(|p| p.id == id && p.tenant_id == tenant_id)
            .cloned())
    }

    async fn find_by_sku(&self, sku: &str, tenant_id: &str) -> RepoResult<Option<Product>> {
        let rows = self.rows.lock().await;
        Ok(rows
            .iter()
            .find(|p| p.tenant_id == tenant_id && p.variant(sku).is_some())
            .cloned())
    }

    async fn list_by_store(
        &self,
        store_id: &str,
        tenant_id: &str,
        filter: &ProductFilter,
    ) -> RepoResult<Vec<Product>> {
        let rows = self.rows.lock().await;
        Ok(rows
            .iter()
            .filter(|p| p.tenant_id == tenant_id && p.store_id == store_id)
            .filter(|p| filter.matches(p))
            .cloned()
            .collect())
    }
}

// =============================================================================
// Inventory
// =============================================================================

#[derive(Debug, Default)]
pub struct MemoryInventory {
    /// Keyed by (tenant, sku).
    rows: Mutex<HashMap<(String, String), InventoryRecord>>,
}

#[async_trait]
impl InventoryRepository for MemoryInventory {
    async fn find(&self, sku: &str, tenant_id: &str) -> RepoResult<Option<InventoryRecord>> {
        let rows = self.rows.lock().await;
        Ok(rows.get(&(tenant_id.to_string(), sku.to_string())).cloned())
    }

    async fn apply_delta(
        &self,
        sku: &str,
        tenant_id: &str,
        delta: i64,
    ) -> RepoResult<(InventoryRecord, ClampOutcome)> {
        let mut rows = self.rows.lock().await;
        let record = rows
            .entry((tenant_id.to_string(), sku.to_string()))
            .or_insert_with(|| InventoryRecord::empty(sku, tenant_id));
        let outcome = apply_delta_clamped(record.quantity_on_hand, delta);
        record.quantity_on_hand = outcome.quantity_on_hand;
        record.updated_at = Utc::now();
        Ok((record.clone(), outcome))
    }

    async fn commit_demands(
        &self,
        tenant_id: &str,
        demands: &[StockDemand],
    ) -> RepoResult<CommitOutcome> {
        let mut rows = self.rows.lock().await;

        for demand in demands {
            let available = rows
                .get(&(tenant_id.to_string(), demand.sku.clone()))
                .map_or(0, |r| r.availability().available);
            if available < demand.quantity {
                return Ok(CommitOutcome::Shortfall {
                    sku: demand.sku.clone(),
                    available,
                    requested: demand.quantity,
                });
            }
        }

        let now = Utc::now();
        for demand in demands {
            if let Some(record) = rows.get_mut(&(tenant_id.to_string(), demand.sku.clone())) {
                record.quantity_on_hand -= demand.quantity;
                record.updated_at = now;
            }
        }
        Ok(CommitOutcome::Committed)
    }
}

// =============================================================================
// Carts
// =============================================================================

#[derive(Debug, Default)]
pub struct MemoryCarts {
    /// Keyed by (tenant, user).
    rows: Mutex<HashMap<(String, String), Cart>>,
}

#[async_trait]
impl CartRepository for MemoryCarts {
    async fn find(&self, user_id: &str, tenant_id: &str) -> RepoResult<Option<Cart>> {
        let rows = self.rows.lock().await;
        Ok(rows
            .get(&(tenant_id.to_string(), user_id.to_string()))
            .cloned())
    }

    async fn save(&self, cart: &Cart) -> RepoResult<()> {
        let mut rows = self.rows.lock().await;
        rows.insert(
            (cart.tenant_id.clone(), cart.user_id.clone()),
            cart.clone(),
        );
        Ok(())
    }
}

// =============================================================================
// Orders
// =============================================================================

#[derive(Debug, Default)]
pub struct MemoryOrders {
    rows: Mutex<Vec<Order>>,
}

#[async_trait]
impl OrderRepository for MemoryOrders {
    async fn insert(&self, order: &Order) -> RepoResult<()> {
        self.rows.lock().await.push(order.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &str, tenant_id: &str) -> RepoResult<Option<Order>> {
        let rows = self.rows.lock().await;
        Ok(rows
            .iter()
            .find(|o| o.id == id && o.tenant_id == tenant_id)
            .cloned())
    }

    async fn list_by_user(&self, user_id: &str, tenant_id: &str) -> RepoResult<Vec<Order>> {
        let rows = self.rows.lock().await;
        Ok(rows
            .iter()
            .filter(|o| o.user_id == user_id && o.tenant_id == tenant_id)
            .rev()
            .cloned()
            .collect())
    }

    async fn update_status(&self, order: &Order) -> RepoResult<()> {
        let mut rows = self.rows.lock().await;
        let row = rows
            .iter_mut()
            .find(|o| o.id == order.id && o.tenant_id == order.tenant_id)
            .ok_or_else(|| not_found("order", &order.id))?;
        row.status = order.status;
        row.payment_status = order.payment_status;
        Ok(())
    }
}

// =============================================================================
// Comments
// =============================================================================

#[derive(Debug, Default)]
pub struct MemoryComments {
    rows: Mutex<Vec<Comment>>,
}

#[async_trait]
impl CommentRepository for MemoryComments {
    async fn insert(&self, comment: &Comment) -> RepoResult<()> {
        self.rows.lock().await.push(comment.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &str, tenant_id: &str) -> RepoResult<Option<Comment>> {
        let rows = self.rows.lock().await;
        Ok(rows
            .iter()
            .find(|c| c.id == id && c.tenant_id == tenant_id)
            .cloned())
    }

    async fn list_by_target(
        &self,
        target_type: CommentTarget,
        target_id: &str,
        tenant_id: &str,
    ) -> RepoResult<Vec<Comment>> {
        let rows = self.rows.lock().await;
        Ok(rows
            .iter()
            .filter(|c| {
                c.target_type == target_type && c.target_id == target_id && c.tenant_id == tenant_id
            })
            .cloned()
            .collect())
    }

    async fn delete(&self, id: &str, tenant_id: &str) -> RepoResult<()> {
        self.rows
            .lock()
            .await
            .retain(|c| !(c.id == id && c.tenant_id == tenant_id));
        Ok(())
    }
}

// =============================================================================
// Claims
// =============================================================================

#[derive(Debug, Default)]
pub struct MemoryClaims {
    rows: Mutex<Vec<StoreClaim>>,
}

#[async_trait]
impl ClaimRepository for MemoryClaims {
    async fn insert(&self, claim: &StoreClaim) -> RepoResult<()> {
        self.rows.lock().await.push(claim.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &str, tenant_id: &str) -> RepoResult<Option<StoreClaim>> {
        let rows = self.rows.lock().await;
        Ok(rows
            .iter()
            .find(|c| c.id == id && c.tenant_id == tenant_id)
            .cloned())
    }

    async fn list_by_store(&self, store_id: &str, tenant_id: &str) -> RepoResult<Vec<StoreClaim>> {
        let rows = self.rows.lock().await;
        Ok(rows
            .iter()
            .filter(|c| c.store_id == store_id && c.tenant_id == tenant_id)
            .cloned()
            .collect())
    }

    async fn update(&self, claim: &StoreClaim) -> RepoResult<()> {
        let mut rows = self.rows.lock().await;
        let row = rows
            .iter_mut()
            .find(|c| c.id == claim.id && c.tenant_id == claim.tenant_id)
            .ok_or_else(|| not_found("store claim", &claim.id))?;
        *row = claim.clone();
        Ok(())
    }
}
