//! # Commerce
//!
//! Wires every use case from one set of repositories.
//!
//! ```rust
//! use mercado_engine::{Commerce, memory};
//!
//! let commerce = Commerce::new(memory::repositories());
//! assert_eq!(commerce.inventory.diagnostics().clamp_events, 0);
//! ```

use mercado_core::cart::CartLimits;

use crate::cart::CartService;
use crate::catalog::CatalogService;
use crate::checkout::CheckoutService;
use crate::community::CommunityService;
use crate::inventory::InventoryService;
use crate::ports::Repositories;

/// The commerce engine. Cheap to clone; every service shares the same
/// repositories and inventory diagnostics.
#[derive(Clone)]
pub struct Commerce {
    pub catalog: CatalogService,
    pub inventory: InventoryService,
    pub carts: CartService,
    pub checkout: CheckoutService,
    pub community: CommunityService,
}

impl Commerce {
    pub fn new(repos: Repositories) -> Self {
        Self::with_limits(repos, CartLimits::default())
    }

    pub fn with_limits(repos: Repositories, limits: CartLimits) -> Self {
        let catalog = CatalogService::new(repos.stores.clone(), repos.products.clone());
        let inventory = InventoryService::new(repos.inventory.clone());
        let carts = CartService::new(
            catalog.clone(),
            inventory.clone(),
            repos.carts.clone(),
            limits,
        );
        let checkout = CheckoutService::new(
            catalog.clone(),
            inventory.clone(),
            repos.carts.clone(),
            repos.orders.clone(),
        );
        let community = CommunityService::new(
            repos.stores,
            repos.products,
            repos.comments,
            repos.claims,
        );

        Commerce {
            catalog,
            inventory,
            carts,
            checkout,
            community,
        }
    }
}
