//! Engine scenarios run against the SQLite adapters.

use mercado_core::error::ErrorCode;
use mercado_core::inventory::StockDemand;
use mercado_core::types::{
    BundleItem, ClaimDecision, ClaimStatus, CommentTarget, OrderStatus, ProductKind, ProductVariant,
    Store, StoreType,
};
use mercado_core::{Money, Pricing, UserContext};
use mercado_db::{Database, DbConfig};
use mercado_engine::inventory::AdjustInventory;
use mercado_engine::ports::{CommitOutcome, InventoryRepository};
use mercado_engine::{
    AddItemRequest, Commerce, NewComment, NewProduct, NewStore, NewStoreClaim, OrderStatusPatch,
    ProductFilter, Repositories, ReviewStoreClaim,
};

const TENANT: &str = "tenant-a";

fn owner() -> UserContext {
    UserContext::user("owner-1")
}

fn shopper() -> UserContext {
    UserContext::user("shopper-1")
}

fn admin() -> UserContext {
    UserContext::admin("admin-1")
}

async fn setup() -> (Commerce, Repositories) {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let repos = db.repositories();
    (Commerce::new(repos.clone()), repos)
}

async fn store(commerce: &Commerce, slug: &str, store_type: StoreType) -> Store {
    commerce
        .catalog
        .create_store(
            NewStore {
                name: format!("Tienda {slug}"),
                slug: slug.to_string(),
                store_type,
            },
            Some(&owner()),
            TENANT,
        )
        .await
        .unwrap()
}

fn product_input(store: &Store, slug: &str, sku: &str, price_major: i64, tracked: bool) -> NewProduct {
    let mut variant = ProductVariant::new(sku, "Única", Pricing::new(Money::from_major(price_major)));
    variant.inventory_tracked = tracked;
    NewProduct {
        store_id: store.id.clone(),
        kind: ProductKind::Simple,
        title: format!("Producto {slug}"),
        slug: slug.to_string(),
        description: None,
        category_ids: vec!["cocina".to_string()],
        variants: vec![variant],
        active: None,
    }
}

async fn stock(commerce: &Commerce, sku: &str, qty: i64) {
    commerce
        .inventory
        .adjust(
            AdjustInventory {
                sku: sku.to_string(),
                delta: qty,
                reason: None,
            },
            TENANT,
        )
        .await
        .unwrap();
}

async fn on_hand(commerce: &Commerce, sku: &str) -> i64 {
    commerce
        .inventory
        .get_availability(sku, TENANT)
        .await
        .unwrap()
        .quantity_on_hand
}

#[tokio::test]
async fn catalog_round_trips_through_sqlite() {
    let (commerce, _) = setup().await;
    let barro = store(&commerce, "barro", StoreType::Owned).await;

    let created = commerce
        .catalog
        .create_product(product_input(&barro, "taza", "TAZA", 80, true), Some(&owner()), TENANT)
        .await
        .unwrap();

    let by_id = commerce.catalog.get_product(&created.id, TENANT).await.unwrap();
    assert_eq!(by_id.variants, created.variants);
    assert_eq!(by_id.category_ids, vec!["cocina".to_string()]);

    let resolved = commerce.catalog.resolve_variant("TAZA", TENANT).await.unwrap();
    assert_eq!(resolved.product.id, created.id);
    assert_eq!(resolved.variant.pricing.default, Money::from_major(80));

    let fetched = commerce.catalog.get_store(&barro.id, TENANT).await.unwrap();
    assert_eq!(fetched.store_type, StoreType::Owned);
    assert_eq!(fetched.owner_id.as_deref(), Some("owner-1"));

    let listed = commerce
        .catalog
        .list_products_by_store(
            &barro.id,
            ProductFilter {
                q: Some("TAZA".into()),
                active: Some(true),
                ..Default::default()
            },
            TENANT,
        )
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
}

#[tokio::test]
async fn unique_violations_surface_as_conflicts() {
    let (commerce, _) = setup().await;
    let barro = store(&commerce, "barro", StoreType::Owned).await;

    let err = commerce
        .catalog
        .create_store(
            NewStore {
                name: "Barro otra vez".into(),
                slug: "barro".into(),
                store_type: StoreType::Owned,
            },
            Some(&owner()),
            TENANT,
        )
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::Conflict);
    assert_eq!(err.to_string(), "slug 'barro' already exists");

    commerce
        .catalog
        .create_product(product_input(&barro, "taza", "TAZA", 80, true), Some(&owner()), TENANT)
        .await
        .unwrap();

    let err = commerce
        .catalog
        .create_product(product_input(&barro, "otra-taza", "TAZA", 90, true), Some(&owner()), TENANT)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::Conflict);
    assert_eq!(err.to_string(), "sku 'TAZA' already exists");

    // the failed product left nothing behind
    let listed = commerce
        .catalog
        .list_products_by_store(&barro.id, ProductFilter::default(), TENANT)
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
}

#[tokio::test]
async fn commit_demands_is_all_or_nothing() {
    let (commerce, repos) = setup().await;
    stock(&commerce, "A", 5).await;
    stock(&commerce, "B", 1).await;

    let outcome = repos
        .inventory
        .commit_demands(TENANT, &[StockDemand::new("A", 3), StockDemand::new("B", 2)])
        .await
        .unwrap();
    assert_eq!(
        outcome,
        CommitOutcome::Shortfall {
            sku: "B".into(),
            available: 1,
            requested: 2
        }
    );
    assert_eq!(on_hand(&commerce, "A").await, 5);
    assert_eq!(on_hand(&commerce, "B").await, 1);

    let outcome = repos
        .inventory
        .commit_demands(TENANT, &[StockDemand::new("A", 5), StockDemand::new("B", 1)])
        .await
        .unwrap();
    assert_eq!(outcome, CommitOutcome::Committed);
    assert_eq!(on_hand(&commerce, "A").await, 0);
    assert_eq!(on_hand(&commerce, "B").await, 0);

    // a SKU with no record has nothing to give
    let outcome = repos
        .inventory
        .commit_demands(TENANT, &[StockDemand::new("GHOST", 1)])
        .await
        .unwrap();
    assert!(matches!(outcome, CommitOutcome::Shortfall { available: 0, .. }));
}

#[tokio::test]
async fn apply_delta_clamps_at_zero() {
    let (_, repos) = setup().await;

    let (record, outcome) = repos.inventory.apply_delta("A", TENANT, 4).await.unwrap();
    assert_eq!(record.quantity_on_hand, 4);
    assert!(!outcome.was_clamped());

    let (record, outcome) = repos.inventory.apply_delta("A", TENANT, -6).await.unwrap();
    assert_eq!(record.quantity_on_hand, 0);
    assert_eq!(outcome.clamped_units, 2);

    let stored = repos.inventory.find("A", TENANT).await.unwrap().unwrap();
    assert_eq!(stored.quantity_on_hand, 0);
    assert!(repos.inventory.find("A", "tenant-b").await.unwrap().is_none());
}

#[tokio::test]
async fn checkout_drains_stock_and_records_order() {
    let (commerce, _) = setup().await;
    let barro = store(&commerce, "barro", StoreType::Owned).await;
    commerce
        .catalog
        .create_product(product_input(&barro, "taza", "TAZA", 80, true), Some(&owner()), TENANT)
        .await
        .unwrap();
    commerce
        .catalog
        .create_product(product_input(&barro, "plato", "PLATO", 50, true), Some(&owner()), TENANT)
        .await
        .unwrap();
    let kit = NewProduct {
        kind: ProductKind::Bundle {
            items: vec![BundleItem::new("TAZA", 1), BundleItem::new("PLATO", 2)],
        },
        ..product_input(&barro, "kit", "KIT", 170, false)
    };
    commerce.catalog.create_product(kit, Some(&owner()), TENANT).await.unwrap();
    stock(&commerce, "TAZA", 3).await;
    stock(&commerce, "PLATO", 4).await;

    let buyer = shopper();
    commerce
        .carts
        .add_item_to_cart(&buyer.id, AddItemRequest::new("KIT", 2), TENANT)
        .await
        .unwrap();
    commerce
        .carts
        .add_item_to_cart(&buyer.id, AddItemRequest::new("TAZA", 1), TENANT)
        .await
        .unwrap();

    let order = commerce.checkout.checkout_cart(&buyer.id, TENANT).await.unwrap();
    assert_eq!(order.status, OrderStatus::Paid);
    assert_eq!(order.total(), Money::from_major(170 * 2 + 80));
    assert_eq!(on_hand(&commerce, "TAZA").await, 0);
    assert_eq!(on_hand(&commerce, "PLATO").await, 0);

    let cart = commerce.carts.get_cart(&buyer.id, TENANT).await.unwrap();
    assert!(cart.is_empty());

    let listed = commerce.checkout.list_orders(&buyer.id, TENANT).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, order.id);

    let shipped = commerce
        .checkout
        .update_order_status(
            &order.id,
            OrderStatusPatch {
                status: Some(OrderStatus::Fulfilling),
                payment_status: None,
            },
            Some(&admin()),
            TENANT,
        )
        .await
        .unwrap();
    assert_eq!(shipped.status, OrderStatus::Fulfilling);
    let fetched = commerce
        .checkout
        .get_order(&order.id, Some(&buyer), TENANT)
        .await
        .unwrap();
    assert_eq!(fetched.status, OrderStatus::Fulfilling);
    assert_eq!(fetched.items, order.items);
}

#[tokio::test]
async fn concurrent_checkouts_never_oversell() {
    let (commerce, _) = setup().await;
    let barro = store(&commerce, "barro", StoreType::Owned).await;
    commerce
        .catalog
        .create_product(product_input(&barro, "taza", "TAZA", 80, true), Some(&owner()), TENANT)
        .await
        .unwrap();
    stock(&commerce, "TAZA", 3).await;

    let buyers: Vec<String> = (0..6).map(|i| format!("buyer-{i}")).collect();
    for buyer in &buyers {
        commerce
            .carts
            .add_item_to_cart(buyer, AddItemRequest::new("TAZA", 1), TENANT)
            .await
            .unwrap();
    }

    let mut handles = Vec::new();
    for buyer in buyers {
        let commerce = commerce.clone();
        handles.push(tokio::spawn(async move {
            commerce.checkout.checkout_cart(&buyer, TENANT).await
        }));
    }

    let mut settled = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => settled += 1,
            Err(err) => assert_eq!(err.code(), ErrorCode::InsufficientStock),
        }
    }
    assert_eq!(settled, 3);
    assert_eq!(on_hand(&commerce, "TAZA").await, 0);
}

#[tokio::test]
async fn claims_and_comments_persist() {
    let (commerce, _) = setup().await;
    let tianguis = store(&commerce, "tianguis", StoreType::Community).await;
    assert_eq!(tianguis.owner_id, None);

    let claimant = UserContext::user("claimant-1");
    let claim = commerce
        .community
        .submit_store_claim(
            NewStoreClaim {
                store_id: tianguis.id.clone(),
                evidence_docs: vec!["https://docs.example.mx/acta.pdf".into()],
            },
            Some(&claimant),
            TENANT,
        )
        .await
        .unwrap();

    let reviewed = commerce
        .community
        .review_store_claim(
            ReviewStoreClaim {
                claim_id: claim.id.clone(),
                decision: ClaimDecision::Approve,
            },
            Some(&admin()),
            TENANT,
        )
        .await
        .unwrap();
    assert_eq!(reviewed.status, ClaimStatus::Approved);

    let claims = commerce
        .community
        .list_claims_for_store(&tianguis.id, Some(&admin()), TENANT)
        .await
        .unwrap();
    assert_eq!(claims.len(), 1);
    assert_eq!(claims[0].status, ClaimStatus::Approved);
    assert!(claims[0].reviewed_at.is_some());
    assert_eq!(claims[0].evidence_docs, claim.evidence_docs);

    let owned = commerce.catalog.get_store(&tianguis.id, TENANT).await.unwrap();
    assert_eq!(owned.store_type, StoreType::Owned);
    assert_eq!(owned.owner_id.as_deref(), Some("claimant-1"));
    assert!(owned.verified_badge);

    let comment = commerce
        .community
        .create_comment(
            NewComment {
                target_type: CommentTarget::Store,
                target_id: tianguis.id.clone(),
                content: "Ya tiene dueño".into(),
            },
            Some(&shopper()),
            TENANT,
        )
        .await
        .unwrap();

    // the new owner moderates the store's comments
    commerce
        .community
        .delete_comment(&comment.id, Some(&claimant), TENANT)
        .await
        .unwrap();
    assert!(commerce
        .community
        .list_comments(CommentTarget::Store, &tianguis.id, TENANT)
        .await
        .unwrap()
        .is_empty());
}
