//! Subcommand implementations. Each prints its result as JSON on stdout.

use anyhow::Result;
use serde::Serialize;
use tracing::{info, warn};

use mercado_core::types::{BundleItem, ClaimDecision, ProductKind, ProductVariant, StoreType};
use mercado_core::{BundlePriceMode, ErrorCode, Money, Pricing, UserContext};
use mercado_db::Database;
use mercado_engine::inventory::AdjustInventory;
use mercado_engine::{AddItemRequest, Commerce, NewProduct, NewStore, ReviewStoreClaim};

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// =============================================================================
// Database
// =============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MigrationReport {
    total: usize,
    applied: usize,
}

pub async fn migrate(db: &Database) -> Result<()> {
    db.run_migrations().await?;
    let (total, applied) = db.migration_status().await?;
    print_json(&MigrationReport { total, applied })
}

// =============================================================================
// Seed
// =============================================================================

const SEED_OWNER: &str = "seed-owner";
const DEMO_STORE_SLUG: &str = "alfareria-demo";

fn demo_variant(sku: &str, name: &str, price_major: i64, tracked: bool) -> ProductVariant {
    let mut variant = ProductVariant::new(sku, name, Pricing::new(Money::from_major(price_major)));
    variant.inventory_tracked = tracked;
    variant
}

/// Creates a demo OWNED store with two stocked products and a bundle of
/// both, plus an unclaimed COMMUNITY store. Does nothing if the demo store
/// already exists.
pub async fn seed(commerce: &Commerce, tenant_id: &str) -> Result<()> {
    let owner = UserContext::user(SEED_OWNER);

    let store = match commerce
        .catalog
        .create_store(
            NewStore {
                name: "Alfarería Demo".to_string(),
                slug: DEMO_STORE_SLUG.to_string(),
                store_type: StoreType::Owned,
            },
            Some(&owner),
            tenant_id,
        )
        .await
    {
        Ok(store) => store,
        Err(err) if err.code() == ErrorCode::Conflict => {
            warn!(tenant_id = %tenant_id, "Demo data already present, skipping seed");
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };

    let simple = |slug: &str, title: &str, variant: ProductVariant| NewProduct {
        store_id: store.id.clone(),
        kind: ProductKind::Simple,
        title: title.to_string(),
        slug: slug.to_string(),
        description: None,
        category_ids: vec!["cocina".to_string()],
        variants: vec![variant],
        active: None,
    };

    let products = [
        simple("taza-de-barro", "Taza de barro", demo_variant("TAZA-BARRO", "Chica", 120, true)),
        simple("plato-hondo", "Plato hondo", demo_variant("PLATO-HONDO", "Único", 90, true)),
        NewProduct {
            kind: ProductKind::Bundle {
                items: vec![BundleItem::new("TAZA-BARRO", 2), BundleItem::new("PLATO-HONDO", 2)],
            },
            ..simple("vajilla-para-dos", "Vajilla para dos", demo_variant("VAJILLA-2", "Juego", 380, false))
        },
    ];
    for input in products {
        commerce.catalog.create_product(input, Some(&owner), tenant_id).await?;
    }

    for (sku, qty) in [("TAZA-BARRO", 25), ("PLATO-HONDO", 40)] {
        commerce
            .inventory
            .adjust(
                AdjustInventory {
                    sku: sku.to_string(),
                    delta: qty,
                    reason: Some("seed".to_string()),
                },
                tenant_id,
            )
            .await?;
    }

    commerce
        .catalog
        .create_store(
            NewStore {
                name: "Tianguis del Centro".to_string(),
                slug: "tianguis-centro".to_string(),
                store_type: StoreType::Community,
            },
            Some(&owner),
            tenant_id,
        )
        .await?;

    info!(tenant_id = %tenant_id, store_id = %store.id, "Demo data seeded");
    print_json(&commerce.catalog.list_stores(tenant_id, None).await?)
}

// =============================================================================
// Inventory
// =============================================================================

pub async fn availability(commerce: &Commerce, tenant_id: &str, sku: &str) -> Result<()> {
    print_json(&commerce.inventory.get_availability(sku, tenant_id).await?)
}

pub async fn adjust(
    commerce: &Commerce,
    tenant_id: &str,
    sku: String,
    delta: i64,
    reason: Option<String>,
) -> Result<()> {
    let record = commerce
        .inventory
        .adjust(AdjustInventory { sku, delta, reason }, tenant_id)
        .await?;
    print_json(&record.availability())
}

// =============================================================================
// Cart & Checkout
// =============================================================================

pub async fn add_to_cart(
    commerce: &Commerce,
    tenant_id: &str,
    user_id: &str,
    sku: String,
    qty: i64,
    bundle_mode: Option<BundlePriceMode>,
    discount_pct: Option<f64>,
) -> Result<()> {
    let mut request = AddItemRequest::new(sku, qty);
    if let Some(mode) = bundle_mode {
        request = request.with_bundle_mode(mode, discount_pct);
    }
    let outcome = commerce.carts.add_item_to_cart(user_id, request, tenant_id).await?;
    print_json(&outcome)
}

pub async fn checkout(commerce: &Commerce, tenant_id: &str, user_id: &str) -> Result<()> {
    let order = commerce.checkout.checkout_cart(user_id, tenant_id).await?;
    print_json(&order)
}

// =============================================================================
// Claims
// =============================================================================

pub async fn review_claim(
    commerce: &Commerce,
    tenant_id: &str,
    admin_id: &str,
    claim_id: String,
    decision: ClaimDecision,
) -> Result<()> {
    let admin = UserContext::admin(admin_id);
    let claim = commerce
        .community
        .review_store_claim(ReviewStoreClaim { claim_id, decision }, Some(&admin), tenant_id)
        .await?;
    print_json(&claim)
}
