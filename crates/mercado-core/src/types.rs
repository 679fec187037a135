//! # Domain Types
//!
//! Core domain types used throughout Mercado.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Store       │   │    Product      │   │ ProductVariant  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  slug (tenant)  │──▶│  slug (store)   │──▶│  sku (tenant)   │       │
//! │  │  OWNED/COMMUNITY│   │  kind:          │   │  pricing        │       │
//! │  │  owner_id?      │   │   Simple        │   │  tracked?       │       │
//! │  └─────────────────┘   │   Bundle{items} │   └─────────────────┘       │
//! │                        └─────────────────┘                              │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ InventoryRecord │   │     Order       │   │   StoreClaim    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  (sku, tenant)  │   │  items snapshot │   │  PENDING        │       │
//! │  │  on_hand        │   │  status         │   │  → APPROVED     │       │
//! │  │  reserved       │   │  payment_status │   │  → REJECTED     │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Every entity has a UUID v4 `id`. Business keys (`slug`, `sku`) are only
//! unique inside their scope: store slugs per tenant, product slugs per
//! store, SKUs per tenant.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::cart::Cart;
use crate::inventory::Availability;
use crate::money::Money;
use crate::DEFAULT_CURRENCY;

/// Generates a new entity id.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Store
// =============================================================================

/// Who runs a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StoreType {
    /// Run by a registered owner.
    Owned,
    /// Listed by the community; nobody owns it until a claim is approved.
    Community,
}

/// A storefront inside a tenant.
///
/// COMMUNITY stores never carry an `owner_id`. `verified_badge` is only set
/// for OWNED stores, either at creation or by an approved claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    pub slug: String,
    #[serde(rename = "type")]
    pub store_type: StoreType,
    pub owner_id: Option<String>,
    pub verified_badge: bool,
    pub created_at: DateTime<Utc>,
}

impl Store {
    /// Builds a new store. OWNED stores are owned by `owner_id` and verified.
    pub fn new(
        tenant_id: impl Into<String>,
        name: impl Into<String>,
        slug: impl Into<String>,
        store_type: StoreType,
        owner_id: Option<String>,
    ) -> Self {
        let owned = store_type == StoreType::Owned;
        Store {
            id: new_id(),
            tenant_id: tenant_id.into(),
            name: name.into(),
            slug: slug.into(),
            store_type,
            owner_id: if owned { owner_id } else { None },
            verified_badge: owned,
            created_at: Utc::now(),
        }
    }

    /// Returns true if `user_id` owns this store.
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.owner_id.as_deref() == Some(user_id)
    }

    /// Hands the store to a claimant after an approved claim.
    pub fn grant_ownership(&mut self, owner_id: impl Into<String>) {
        self.store_type = StoreType::Owned;
        self.owner_id = Some(owner_id.into());
        self.verified_badge = true;
    }
}

// =============================================================================
// Pricing
// =============================================================================

/// Which price of a [`Pricing`] record applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PriceType {
    #[default]
    Default,
    Offer,
    Clearance,
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

/// Price record of a variant.
///
/// Absent and explicitly `null` offer/clearance values both deserialize to
/// `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pricing {
    pub default: Money,
    #[serde(default)]
    pub offer: Option<Money>,
    #[serde(default)]
    pub clearance: Option<Money>,
    #[serde(default)]
    pub active_type: Option<PriceType>,
    #[serde(default = "default_currency")]
    pub currency: String,
}

impl Pricing {
    /// Default-only pricing in the default currency.
    pub fn new(default: Money) -> Self {
        Pricing {
            default,
            offer: None,
            clearance: None,
            active_type: None,
            currency: default_currency(),
        }
    }

    /// Sets the offer price and makes it active.
    pub fn with_offer(mut self, offer: Money) -> Self {
        self.offer = Some(offer);
        self.active_type = Some(PriceType::Offer);
        self
    }

    /// Sets the clearance price and makes it active.
    pub fn with_clearance(mut self, clearance: Money) -> Self {
        self.clearance = Some(clearance);
        self.active_type = Some(PriceType::Clearance);
        self
    }
}

// =============================================================================
// Product
// =============================================================================

/// A sellable variant. `sku` is the catalog key inside a tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductVariant {
    pub sku: String,
    pub name: String,
    pub pricing: Pricing,
    #[serde(default)]
    pub inventory_tracked: bool,
    #[serde(default = "default_true")]
    pub is_available: bool,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub main_image: Option<String>,
}

fn default_true() -> bool {
    true
}

impl ProductVariant {
    /// Untracked, available variant without images.
    pub fn new(sku: impl Into<String>, name: impl Into<String>, pricing: Pricing) -> Self {
        ProductVariant {
            sku: sku.into(),
            name: name.into(),
            pricing,
            inventory_tracked: false,
            is_available: true,
            images: Vec::new(),
            main_image: None,
        }
    }

    pub fn tracked(mut self) -> Self {
        self.inventory_tracked = true;
        self
    }
}

/// One child SKU of a bundle and how many units a single bundle consumes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleItem {
    pub sku: String,
    pub qty: i64,
}

impl BundleItem {
    pub fn new(sku: impl Into<String>, qty: i64) -> Self {
        BundleItem {
            sku: sku.into(),
            qty,
        }
    }
}

/// Flat product type, used for filtering and storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductType {
    Simple,
    Bundle,
}

impl ProductType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ProductType::Simple => "SIMPLE",
            ProductType::Bundle => "BUNDLE",
        }
    }
}

/// What kind of product this is, with the data only that kind carries.
///
/// Serialized inline into [`Product`] as `"type": "SIMPLE"` or
/// `"type": "BUNDLE", "bundleItems": [...]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductKind {
    Simple,
    Bundle {
        #[serde(rename = "bundleItems")]
        items: Vec<BundleItem>,
    },
}

impl ProductKind {
    pub fn product_type(&self) -> ProductType {
        match self {
            ProductKind::Simple => ProductType::Simple,
            ProductKind::Bundle { .. } => ProductType::Bundle,
        }
    }

    /// Bundle children; empty for simple products.
    pub fn bundle_items(&self) -> &[BundleItem] {
        match self {
            ProductKind::Simple => &[],
            ProductKind::Bundle { items } => items,
        }
    }
}

/// A catalog product owned by a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub tenant_id: String,
    pub store_id: String,
    #[serde(flatten)]
    pub kind: ProductKind,
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category_ids: Vec<String>,
    /// Never empty; the first variant is the product's primary variant.
    pub variants: Vec<ProductVariant>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Finds the variant with the given SKU.
    pub fn variant(&self, sku: &str) -> Option<&ProductVariant> {
        self.variants.iter().find(|v| v.sku == sku)
    }

    #[inline]
    pub fn product_type(&self) -> ProductType {
        self.kind.product_type()
    }

    #[inline]
    pub fn is_bundle(&self) -> bool {
        matches!(self.kind, ProductKind::Bundle { .. })
    }

    /// Case-insensitive substring match over title and description.
    pub fn matches_text(&self, query: &str) -> bool {
        let needle = query.to_lowercase();
        self.title.to_lowercase().contains(&needle)
            || self
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&needle))
    }
}

// =============================================================================
// Inventory
// =============================================================================

/// Stock of one SKU in one tenant. `(sku, tenant_id)` is unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryRecord {
    pub sku: String,
    pub tenant_id: String,
    pub quantity_on_hand: i64,
    pub reserved: i64,
    pub updated_at: DateTime<Utc>,
}

impl InventoryRecord {
    /// Zero-baseline record, used when a SKU is adjusted for the first time.
    pub fn empty(sku: impl Into<String>, tenant_id: impl Into<String>) -> Self {
        InventoryRecord {
            sku: sku.into(),
            tenant_id: tenant_id.into(),
            quantity_on_hand: 0,
            reserved: 0,
            updated_at: Utc::now(),
        }
    }

    pub fn availability(&self) -> Availability {
        Availability::new(&self.sku, self.quantity_on_hand, self.reserved)
    }
}

// =============================================================================
// Orders
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Paid,
    Fulfilling,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
}

/// A settled line. Frozen copy of the cart line it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub sku: String,
    pub product_id: String,
    pub qty: i64,
    pub price: Money,
    pub currency: String,
    pub title_snapshot: String,
    pub variant_name: Option<String>,
}

impl OrderItem {
    #[inline]
    pub fn line_total(&self) -> Money {
        self.price.multiply_quantity(self.qty)
    }
}

/// An immutable purchase record. Only `status` and `payment_status` change
/// after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub tenant_id: String,
    pub user_id: String,
    pub items: Vec<OrderItem>,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Settles a cart into a paid order, copying every line as it stood when
    /// it was added.
    pub fn settle(cart: &Cart) -> Self {
        let items = cart
            .items
            .iter()
            .map(|line| OrderItem {
                sku: line.sku.clone(),
                product_id: line.product_id.clone(),
                qty: line.qty,
                price: line.price_at_add,
                currency: line.currency.clone(),
                title_snapshot: line.title_snapshot.clone(),
                variant_name: line.variant_name.clone(),
            })
            .collect();

        Order {
            id: new_id(),
            tenant_id: cart.tenant_id.clone(),
            user_id: cart.user_id.clone(),
            items,
            status: OrderStatus::Paid,
            payment_status: PaymentStatus::Paid,
            created_at: Utc::now(),
        }
    }

    pub fn total(&self) -> Money {
        self.items.iter().map(OrderItem::line_total).sum()
    }
}

// =============================================================================
// Community
// =============================================================================

/// What a comment is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommentTarget {
    Store,
    Product,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub tenant_id: String,
    pub target_type: CommentTarget,
    pub target_id: String,
    pub user_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClaimStatus {
    Pending,
    Approved,
    Rejected,
}

impl ClaimStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ClaimStatus::Pending => "PENDING",
            ClaimStatus::Approved => "APPROVED",
            ClaimStatus::Rejected => "REJECTED",
        }
    }

    #[inline]
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, ClaimStatus::Pending)
    }
}

impl fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Admin verdict on a claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClaimDecision {
    Approve,
    Reject,
}

/// A user's request to take over a COMMUNITY store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreClaim {
    pub id: String,
    pub tenant_id: String,
    pub store_id: String,
    pub user_id: String,
    /// Never empty; every entry is an absolute URL.
    pub evidence_docs: Vec<String>,
    pub status: ClaimStatus,
    pub created_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Unit Tests
// =============================================================================
