//! # Catalog
//!
//! Store and product creation, catalog reads, and SKU resolution.
//!
//! ## Bundle Decomposition
//! ```text
//! resolve_variant(sku) ──► (product, variant)
//!      │
//!      ├── Simple ───────────────────────► [sku × units]            if tracked
//!      ├── Bundle, variant tracked ──────► [bundle sku × units]
//!      └── Bundle, variant not tracked ──► resolve every child SKU
//!                                          (missing → PRODUCT_NOT_FOUND)
//!                                          [child sku × child qty × units]
//!                                          for tracked children
//! ```
//!
//! Children are resolved one level deep. A child that is itself a bundle
//! is treated as an ordinary SKU with its own stock record.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, info};

use mercado_core::error::CoreError;
use mercado_core::inventory::{bundle_child_demands, StockDemand};
use mercado_core::policy::{assert_owner_or_admin, require_user, UserContext};
use mercado_core::types::{
    new_id, BundleItem, Product, ProductKind, ProductVariant, Store, StoreType,
};
use mercado_core::validation::{
    validate_bundle_items, validate_name, validate_search_query, validate_slug, validate_sku,
    validate_tenant_id, validate_variants,
};
use mercado_core::ValidationError;

use crate::error::CommerceResult;
use crate::ports::{ProductFilter, ProductRepository, StoreRepository};

// =============================================================================
// Inputs
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStore {
    pub name: String,
    pub slug: String,
    #[serde(rename = "type")]
    pub store_type: StoreType,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub store_id: String,
    #[serde(flatten)]
    pub kind: ProductKind,
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category_ids: Vec<String>,
    pub variants: Vec<ProductVariant>,
    #[serde(default)]
    pub active: Option<bool>,
}

// =============================================================================
// Resolution Results
// =============================================================================

/// A variant together with the product that owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVariant {
    pub product: Product,
    pub variant: ProductVariant,
}

impl ResolvedVariant {
    /// Bundle children, empty for simple products.
    pub fn bundle_items(&self) -> &[BundleItem] {
        self.product.kind.bundle_items()
    }
}

/// A bundle child resolved against the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedChild {
    pub item: BundleItem,
    pub resolved: ResolvedVariant,
}

/// Inventory demands that `units` of `resolved` place, tracked SKUs only.
///
/// `children` must hold the resolved bundle children whenever the product
/// is a bundle whose own variant is not tracked.
pub fn tracked_demands(
    resolved: &ResolvedVariant,
    children: &[ResolvedChild],
    units: i64,
) -> Result<Vec<StockDemand>, ValidationError> {
    match &resolved.product.kind {
        ProductKind::Simple => {
            if resolved.variant.inventory_tracked {
                Ok(vec![StockDemand::new(&resolved.variant.sku, units)])
            } else {
                Ok(Vec::new())
            }
        }
        ProductKind::Bundle { .. } if resolved.variant.inventory_tracked => {
            Ok(vec![StockDemand::new(&resolved.variant.sku, units)])
        }
        ProductKind::Bundle { .. } => {
            let tracked: Vec<BundleItem> = children
                .iter()
                .filter(|c| c.resolved.variant.inventory_tracked)
                .map(|c| c.item.clone())
                .collect();
            bundle_child_demands(&tracked, units)
        }
    }
}

// =============================================================================
// Service
// =============================================================================

/// Catalog use cases.
#[derive(Clone)]
pub struct CatalogService {
    stores: Arc<dyn StoreRepository>,
    products: Arc<dyn ProductRepository>,
}

impl CatalogService {
    pub fn new(stores: Arc<dyn StoreRepository>, products: Arc<dyn ProductRepository>) -> Self {
        CatalogService { stores, products }
    }

    // =========================================================================
    // Stores
    // =========================================================================

    /// Creates a store. OWNED stores belong to the caller and are verified.
    pub async fn create_store(
        &self,
        input: NewStore,
        user: Option<&UserContext>,
        tenant_id: &str,
    ) -> CommerceResult<Store> {
        let user = require_user(user)?;
        validate_tenant_id(tenant_id)?;
        validate_name("name", &input.name)?;
        validate_slug(&input.slug)?;

        let store = Store::new(
            tenant_id,
            input.name.trim(),
            input.slug,
            input.store_type,
            Some(user.id.clone()),
        );
        self.stores.insert(&store).await?;

        info!(
            store_id = %store.id,
            tenant_id = %tenant_id,
            store_type = ?store.store_type,
            "Store created"
        );
        Ok(store)
    }

    pub async fn get_store(&self, store_id: &str, tenant_id: &str) -> CommerceResult<Store> {
        self.stores
            .find_by_id(store_id, tenant_id)
            .await?
            .ok_or_else(|| CoreError::StoreNotFound(store_id.to_string()).into())
    }

    pub async fn list_stores(&self, tenant_id: &str, q: Option<&str>) -> CommerceResult<Vec<Store>> {
        let q = q.map(validate_search_query).transpose()?;
        let q = q.as_deref().filter(|q| !q.is_empty());
        Ok(self.stores.list(tenant_id, q).await?)
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// Creates a product in a store.
    ///
    /// OWNED stores accept products from their owner or an admin; COMMUNITY
    /// stores from any signed-in user.
    pub async fn create_product(
        &self,
        input: NewProduct,
        user: Option<&UserContext>,
        tenant_id: &str,
    ) -> CommerceResult<Product> {
        let store = self.get_store(&input.store_id, tenant_id).await?;
        match store.store_type {
            StoreType::Owned => assert_owner_or_admin(&store, user)?,
            StoreType::Community => {
                require_user(user)?;
            }
        }

        validate_name("title", &input.title)?;
        validate_slug(&input.slug)?;
        validate_variants(&input.variants)?;
        if let ProductKind::Bundle { items } = &input.kind {
            validate_bundle_items(items)?;
            if let Some(own) = items
                .iter()
                .find(|item| input.variants.iter().any(|v| v.sku == item.sku))
            {
                return Err(ValidationError::NotAllowed {
                    field: "bundleItems.sku".to_string(),
                    reason: format!("bundle cannot contain its own variant {}", own.sku),
                }
                .into());
            }
        }

        let product = Product {
            id: new_id(),
            tenant_id: tenant_id.to_string(),
            store_id: store.id,
            kind: input.kind,
            title: input.title.trim().to_string(),
            slug: input.slug,
            description: input.description,
            category_ids: input.category_ids,
            variants: input.variants,
            active: input.active.unwrap_or(true),
            created_at: chrono::Utc::now(),
        };
        self.products.insert(&product).await?;

        info!(
            product_id = %product.id,
            store_id = %product.store_id,
            product_type = product.product_type().as_str(),
            variants = product.variants.len(),
            "Product created"
        );
        Ok(product)
    }

    pub async fn get_product(&self, product_id: &str, tenant_id: &str) -> CommerceResult<Product> {
        self.products
            .find_by_id(product_id, tenant_id)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()).into())
    }

    /// Lists a store's products matching `filter`.
    pub async fn list_products_by_store(
        &self,
        store_id: &str,
        filter: ProductFilter,
        tenant_id: &str,
    ) -> CommerceResult<Vec<Product>> {
        let store = self.get_store(store_id, tenant_id).await?;
        let filter = ProductFilter {
            q: filter
                .q
                .map(|q| validate_search_query(&q))
                .transpose()?
                .filter(|q| !q.is_empty()),
            ..filter
        };
        let products = self
            .products
            .list_by_store(&store.id, tenant_id, &filter)
            .await?;
        debug!(store_id = %store_id, count = products.len(), "Listed products");
        Ok(products)
    }

    // =========================================================================
    // Resolution
    // =========================================================================

    /// Resolves a SKU to its variant and owning product.
    pub async fn resolve_variant(&self, sku: &str, tenant_id: &str) -> CommerceResult<ResolvedVariant> {
        validate_sku(sku)?;
        let product = self
            .products
            .find_by_sku(sku, tenant_id)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(sku.to_string()))?;
        let variant = product
            .variant(sku)
            .cloned()
            .ok_or_else(|| CoreError::ProductNotFound(sku.to_string()))?;
        Ok(ResolvedVariant { product, variant })
    }

    /// Resolves every child of a bundle. A missing child fails the whole
    /// resolution with PRODUCT_NOT_FOUND.
    pub async fn resolve_children(
        &self,
        items: &[BundleItem],
        tenant_id: &str,
    ) -> CommerceResult<Vec<ResolvedChild>> {
        let mut children = Vec::with_capacity(items.len());
        for item in items {
            let resolved = self.resolve_variant(&item.sku, tenant_id).await?;
            children.push(ResolvedChild {
                item: item.clone(),
                resolved,
            });
        }
        Ok(children)
    }

    /// Tracked stock demands for `units` of a resolved variant, resolving
    /// bundle children when the bundle does not track its own stock.
    pub async fn stock_demands(
        &self,
        resolved: &ResolvedVariant,
        units: i64,
        tenant_id: &str,
    ) -> CommerceResult<Vec<StockDemand>> {
        let children = if resolved.product.is_bundle() && !resolved.variant.inventory_tracked {
            self.resolve_children(resolved.bundle_items(), tenant_id).await?
        } else {
            Vec::new()
        };
        Ok(tracked_demands(resolved, &children, units)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use mercado_core::{Money, Pricing};

    fn resolved(kind: ProductKind, sku: &str, tracked: bool) -> ResolvedVariant {
        let mut variant = ProductVariant::new(sku, sku, Pricing::new(Money::from_major(10)));
        variant.inventory_tracked = tracked;
        ResolvedVariant {
            product: Product {
                id: format!("p-{sku}"),
                tenant_id: "t1".into(),
                store_id: "s1".into(),
                kind,
                title: sku.into(),
                slug: sku.to_lowercase(),
                description: None,
                category_ids: vec![],
                variants: vec![variant.clone()],
                active: true,
                created_at: Utc::now(),
            },
            variant,
        }
    }

    fn child(sku: &str, qty: i64, tracked: bool) -> ResolvedChild {
        ResolvedChild {
            item: BundleItem::new(sku, qty),
            resolved: resolved(ProductKind::Simple, sku, tracked),
        }
    }

    #[test]
    fn test_simple_demands_follow_tracking() {
        let tracked = resolved(ProductKind::Simple, "A", true);
        assert_eq!(tracked_demands(&tracked, &[], 5).unwrap(), vec![StockDemand::new("A", 5)]);

        let untracked = resolved(ProductKind::Simple, "A", false);
        assert!(tracked_demands(&untracked, &[], 5).unwrap().is_empty());
    }

    #[test]
    fn test_tracked_bundle_uses_own_stock() {
        let kind = ProductKind::Bundle {
            items: vec![BundleItem::new("X", 2)],
        };
        let bundle = resolved(kind, "B", true);
        let demands = tracked_demands(&bundle, &[child("X", 2, true)], 3).unwrap();
        assert_eq!(demands, vec![StockDemand::new("B", 3)]);
    }

    #[test]
    fn test_untracked_bundle_cascades_to_tracked_children() {
        let kind = ProductKind::Bundle {
            items: vec![BundleItem::new("X", 2), BundleItem::new("Y", 1)],
        };
        let bundle = resolved(kind, "B", false);
        let demands = tracked_demands(&bundle, &[child("X", 2, true), child("Y", 1, false)], 2).unwrap();
        assert_eq!(demands, vec![StockDemand::new("X", 4)]);
    }

    #[test]
    fn test_child_multiplication_overflow_is_a_validation_error() {
        let kind = ProductKind::Bundle {
            items: vec![BundleItem::new("X", i64::MAX / 2)],
        };
        let bundle = resolved(kind, "B", false);
        let err = tracked_demands(&bundle, &[child("X", i64::MAX / 2, true)], 3).unwrap_err();
        assert!(matches!(err, ValidationError::Overflow { .. }));
    }
}
