//! # mercado-engine: Commerce Use Cases
//!
//! Catalog, inventory, cart, checkout and community operations, written
//! against storage ports so any backend can be plugged in.
//!
//! ## Wiring
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  composition root (mercado-admin, tests)                                │
//! │        │                                                                │
//! │        │  Repositories { stores, products, inventory, carts, ... }      │
//! │        ▼                                                                │
//! │  Commerce::new(repos)                                                   │
//! │    ├── catalog:   CatalogService                                        │
//! │    ├── inventory: InventoryService ◄─────────┐                          │
//! │    ├── carts:     CartService ───────────────┤ (shared)                 │
//! │    ├── checkout:  CheckoutService ───────────┘                          │
//! │    └── community: CommunityService                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//! ```rust
//! use mercado_engine::{memory, Commerce};
//!
//! let commerce = Commerce::new(memory::repositories());
//! let _catalog = &commerce.catalog;
//! ```

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod commerce;
pub mod community;
pub mod error;
pub mod inventory;
pub mod memory;
pub mod ports;

pub use cart::{AddItemOutcome, AddItemRequest, CartService};
pub use catalog::{CatalogService, NewProduct, NewStore, ResolvedVariant};
pub use checkout::{CheckoutService, OrderStatusPatch};
pub use commerce::Commerce;
pub use community::{CommunityService, NewComment, NewStoreClaim, ReviewStoreClaim};
pub use error::{CommerceError, CommerceResult};
pub use inventory::{AdjustInventory, ClampStats, InventoryService};
pub use ports::{ProductFilter, RepoError, RepoResult, Repositories};
