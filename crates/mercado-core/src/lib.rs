//! # mercado-core: Pure Commerce Rules for Mercado
//!
//! This crate is the **heart** of the marketplace commerce engine. It holds
//! every rule that can be decided without touching storage.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Mercado Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              HTTP collaborator (routing, auth tokens)           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 mercado-engine (use cases)                      │   │
//! │  │   add_item_to_cart, checkout_cart, review_store_claim, ...      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ mercado-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌───────────┐ ┌───────┐ ┌────────┐  │   │
//! │  │   │  types  │ │ pricing │ │ inventory │ │ cart  │ │ policy │  │   │
//! │  │   └─────────┘ └─────────┘ └───────────┘ └───────┘ └────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain entities (Store, Product, Order, Comment, StoreClaim)
//! - [`money`] - Integer money in minor units
//! - [`pricing`] - Price resolution and bundle pricing modes
//! - [`inventory`] - Availability policy, stock demands, floor-clamped deltas
//! - [`cart`] - Cart lines with price snapshots
//! - [`policy`] - Ownership/admin checks and the claim state machine
//! - [`validation`] - Input validation
//! - [`error`] - Error taxonomy
//!
//! ## Example Usage
//!
//! ```rust
//! use mercado_core::money::Money;
//! use mercado_core::pricing::resolve_price;
//! use mercado_core::types::{Pricing, PriceType};
//!
//! let mut pricing = Pricing::new(Money::from_major(120));
//! pricing.offer = Some(Money::from_major(99));
//! pricing.active_type = Some(PriceType::Offer);
//!
//! let resolved = resolve_price(&pricing);
//! assert_eq!(resolved.price, Money::from_major(99));
//! assert_eq!(resolved.price_type, PriceType::Offer);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod inventory;
pub mod money;
pub mod policy;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartItem, CartLimits};
pub use error::{CoreError, CoreResult, ErrorBody, ErrorCode, ValidationError};
pub use inventory::{Availability, StockDemand};
pub use money::Money;
pub use policy::{Role, UserContext};
pub use pricing::{BundlePriceMode, DiscountPct, ResolvedPrice};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Tenant used by tooling when none is configured.
pub const DEFAULT_TENANT_ID: &str = "00000000-0000-0000-0000-000000000001";

/// Currency assumed when a pricing record does not name one.
pub const DEFAULT_CURRENCY: &str = "MXN";

/// Maximum distinct lines allowed in a single cart.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single SKU in a cart.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;
