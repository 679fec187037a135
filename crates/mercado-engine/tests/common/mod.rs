//! Shared fixtures for engine scenario tests.

#![allow(dead_code)]

use mercado_core::types::{BundleItem, Product, ProductKind, ProductVariant, Store, StoreType};
use mercado_core::{Money, Pricing, UserContext};
use mercado_engine::inventory::AdjustInventory;
use mercado_engine::{memory, Commerce, NewProduct, NewStore, Repositories};

pub const TENANT: &str = "tenant-a";
pub const OTHER_TENANT: &str = "tenant-b";

pub fn owner() -> UserContext {
    UserContext::user("owner-1")
}

pub fn shopper() -> UserContext {
    UserContext::user("shopper-1")
}

pub fn admin() -> UserContext {
    UserContext::admin("admin-1")
}

pub fn setup() -> (Commerce, Repositories) {
    let repos = memory::repositories();
    (Commerce::new(repos.clone()), repos)
}

pub async fn owned_store(commerce: &Commerce, slug: &str) -> Store {
    commerce
        .catalog
        .create_store(
            NewStore {
                name: format!("Tienda {slug}"),
                slug: slug.to_string(),
                store_type: StoreType::Owned,
            },
            Some(&owner()),
            TENANT,
        )
        .await
        .unwrap()
}

pub async fn community_store(commerce: &Commerce, slug: &str) -> Store {
    commerce
        .catalog
        .create_store(
            NewStore {
                name: format!("Mercadito {slug}"),
                slug: slug.to_string(),
                store_type: StoreType::Community,
            },
            Some(&shopper()),
            TENANT,
        )
        .await
        .unwrap()
}

pub fn variant(sku: &str, price_major: i64, tracked: bool) -> ProductVariant {
    let mut variant = ProductVariant::new(sku, "Única", Pricing::new(Money::from_major(price_major)));
    variant.inventory_tracked = tracked;
    variant
}

pub fn simple_input(store: &Store, slug: &str, variant: ProductVariant) -> NewProduct {
    NewProduct {
        store_id: store.id.clone(),
        kind: ProductKind::Simple,
        title: format!("Producto {slug}"),
        slug: slug.to_string(),
        description: None,
        category_ids: vec![],
        variants: vec![variant],
        active: None,
    }
}

pub async fn simple_product(
    commerce: &Commerce,
    store: &Store,
    sku: &str,
    price_major: i64,
    tracked: bool,
) -> Product {
    commerce
        .catalog
        .create_product(
            simple_input(store, &format!("p-{}", sku.to_lowercase()), variant(sku, price_major, tracked)),
            Some(&owner()),
            TENANT,
        )
        .await
        .unwrap()
}

pub async fn bundle_product(
    commerce: &Commerce,
    store: &Store,
    sku: &str,
    price_major: i64,
    tracked: bool,
    items: Vec<BundleItem>,
) -> Product {
    let input = NewProduct {
        kind: ProductKind::Bundle { items },
        ..simple_input(store, &format!("p-{}", sku.to_lowercase()), variant(sku, price_major, tracked))
    };
    commerce
        .catalog
        .create_product(input, Some(&owner()), TENANT)
        .await
        .unwrap()
}

pub async fn stock(commerce: &Commerce, sku: &str, qty: i64) {
    commerce
        .inventory
        .adjust(
            AdjustInventory {
                sku: sku.to_string(),
                delta: qty,
                reason: Some("initial count".to_string()),
            },
            TENANT,
        )
        .await
        .unwrap();
}

pub async fn on_hand(commerce: &Commerce, sku: &str) -> i64 {
    commerce
        .inventory
        .get_availability(sku, TENANT)
        .await
        .unwrap()
        .quantity_on_hand
}
