//! # Cart Engine
//!
//! Adds lines to a user's cart with a price snapshot.
//!
//! ## Add Item Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  add_item_to_cart(user, {sku, qty, bundleMode?, bundleDiscountPct?})   │
//! │                                                                         │
//! │  1. load cart (or start a new one)                                      │
//! │  2. resolve sku ───────────────────────── PRODUCT_NOT_FOUND            │
//! │  3. check stock for the requested qty ─── INSUFFICIENT_STOCK           │
//! │  4. price: simple → resolve_price                                       │
//! │            bundle → FIXED | SUM | SUM_WITH_DISCOUNT                     │
//! │  5. merge line (existing line keeps its first price)                    │
//! │  6. save cart                                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Inventory is only read here. Stock is taken at checkout, which re-checks
//! the merged line quantities.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use mercado_core::cart::{title_snapshot, Cart, CartItem, CartLimits};
use mercado_core::pricing::{
    bundle_unit_price, resolve_price, BundlePriceMode, ComponentPrice, DiscountPct, ResolvedPrice,
};
use mercado_core::types::{PriceType, ProductKind};
use mercado_core::validation::validate_quantity;
use mercado_core::ValidationError;

use crate::catalog::{tracked_demands, CatalogService, ResolvedChild, ResolvedVariant};
use crate::error::CommerceResult;
use crate::inventory::InventoryService;
use crate::ports::CartRepository;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    pub sku: String,
    pub qty: i64,
    #[serde(default)]
    pub bundle_mode: Option<BundlePriceMode>,
    /// Percentage 0-100; out-of-range values are clamped.
    #[serde(default)]
    pub bundle_discount_pct: Option<f64>,
}

impl AddItemRequest {
    pub fn new(sku: impl Into<String>, qty: i64) -> Self {
        AddItemRequest {
            sku: sku.into(),
            qty,
            bundle_mode: None,
            bundle_discount_pct: None,
        }
    }

    pub fn with_bundle_mode(mut self, mode: BundlePriceMode, discount_pct: Option<f64>) -> Self {
        self.bundle_mode = Some(mode);
        self.bundle_discount_pct = discount_pct;
        self
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemOutcome {
    pub cart: Cart,
    pub price_type: PriceType,
}

#[derive(Clone)]
pub struct CartService {
    catalog: CatalogService,
    inventory: InventoryService,
    carts: Arc<dyn CartRepository>,
    limits: CartLimits,
}

impl CartService {
    pub fn new(
        catalog: CatalogService,
        inventory: InventoryService,
        carts: Arc<dyn CartRepository>,
        limits: CartLimits,
    ) -> Self {
        CartService {
            catalog,
            inventory,
            carts,
            limits,
        }
    }

    /// The user's cart, or a fresh empty one if none exists yet.
    pub async fn get_cart(&self, user_id: &str, tenant_id: &str) -> CommerceResult<Cart> {
        Ok(self
            .carts
            .find(user_id, tenant_id)
            .await?
            .unwrap_or_else(|| Cart::new(user_id, tenant_id)))
    }

    pub async fn add_item_to_cart(
        &self,
        user_id: &str,
        request: AddItemRequest,
        tenant_id: &str,
    ) -> CommerceResult<AddItemOutcome> {
        validate_quantity(request.qty, self.limits.max_item_quantity)?;

        let mut cart = self.get_cart(user_id, tenant_id).await?;
        let resolved = self.catalog.resolve_variant(&request.sku, tenant_id).await?;
        let mode = request.bundle_mode.unwrap_or_default();

        let needs_children = resolved.product.is_bundle()
            && (!resolved.variant.inventory_tracked || mode != BundlePriceMode::Fixed);
        let children = if needs_children {
            self.catalog
                .resolve_children(resolved.bundle_items(), tenant_id)
                .await?
        } else {
            Vec::new()
        };

        let demands = tracked_demands(&resolved, &children, request.qty)?;
        self.inventory.check(&demands, tenant_id).await?;

        let discount = request
            .bundle_discount_pct
            .map(DiscountPct::from_percent)
            .unwrap_or_default();
        let price = unit_price(&resolved, &children, mode, discount)?;

        let line = CartItem {
            sku: resolved.variant.sku.clone(),
            qty: request.qty,
            price_at_add: price.price,
            currency: resolved.variant.pricing.currency.clone(),
            product_id: resolved.product.id.clone(),
            variant_name: Some(resolved.variant.name.clone()),
            title_snapshot: title_snapshot(&resolved.product.title, Some(&resolved.variant.name)),
        };
        let qty = cart.add_line(line, &self.limits)?.qty;
        self.carts.save(&cart).await?;

        info!(
            user_id = %user_id,
            tenant_id = %tenant_id,
            sku = %request.sku,
            qty,
            price_type = ?price.price_type,
            "Item added to cart"
        );
        Ok(AddItemOutcome {
            cart,
            price_type: price.price_type,
        })
    }

    /// Removes the line for `sku`. Removing an absent SKU is a no-op.
    pub async fn remove_item_from_cart(
        &self,
        user_id: &str,
        sku: &str,
        tenant_id: &str,
    ) -> CommerceResult<Cart> {
        let mut cart = self.get_cart(user_id, tenant_id).await?;
        if cart.remove_item(sku) {
            self.carts.save(&cart).await?;
            info!(user_id = %user_id, tenant_id = %tenant_id, sku = %sku, "Item removed from cart");
        }
        Ok(cart)
    }
}

/// Unit price of a line at add time.
fn unit_price(
    resolved: &ResolvedVariant,
    children: &[ResolvedChild],
    mode: BundlePriceMode,
    discount: DiscountPct,
) -> Result<ResolvedPrice, ValidationError> {
    match &resolved.product.kind {
        ProductKind::Simple => Ok(resolve_price(&resolved.variant.pricing)),
        ProductKind::Bundle { .. } => {
            let components: Vec<ComponentPrice> = children
                .iter()
                .map(|c| ComponentPrice {
                    unit_price: resolve_price(&c.resolved.variant.pricing).price,
                    qty: c.item.qty,
                })
                .collect();
            bundle_unit_price(mode, &resolved.variant.pricing, &components, discount)
        }
    }
}
