//! # Repository Module
//!
//! SQLite implementations of the mercado-engine storage ports.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  engine use case                                                        │
//! │       │  repos.products.find_by_sku("TAZA-CHICA", tenant)               │
//! │       ▼                                                                 │
//! │  SqliteProducts (impl ProductRepository)                                │
//! │       │  SELECT ... JOIN product_variants ...                           │
//! │       ▼                                                                 │
//! │  *Row (sqlx::FromRow) ──► decode JSON columns ──► domain type           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`SqliteStores`] - stores, slug unique per tenant
//! - [`SqliteProducts`] - products plus the SKU index
//! - [`SqliteInventory`] - stock records and the atomic checkout commit
//! - [`SqliteCarts`] - one cart per (user, tenant)
//! - [`SqliteOrders`] - settled orders
//! - [`SqliteComments`] / [`SqliteClaims`] - community data

pub mod cart;
pub mod claim;
pub mod comment;
pub mod inventory;
pub mod order;
pub mod product;
pub mod store;

pub use cart::SqliteCarts;
pub use claim::SqliteClaims;
pub use comment::SqliteComments;
pub use inventory::SqliteInventory;
pub use order::SqliteOrders;
pub use product::SqliteProducts;
pub use store::SqliteStores;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::DbResult;

/// Encodes a value for a JSON text column.
pub(crate) fn to_json<T: Serialize + ?Sized>(value: &T) -> DbResult<String> {
    Ok(serde_json::to_string(value)?)
}

/// Decodes a JSON text column.
pub(crate) fn from_json<T: DeserializeOwned>(raw: &str) -> DbResult<T> {
    Ok(serde_json::from_str(raw)?)
}
