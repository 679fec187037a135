//! # mercado-db: SQLite Storage for Mercado
//!
//! Implements every mercado-engine storage port on SQLite through sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  mercado-admin (composition root)                                       │
//! │       │                                                                 │
//! │       │  Database::new(DbConfig::new(path)).await?.repositories()       │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │                     mercado-db (THIS CRATE)                     │    │
//! │  │                                                                 │    │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐   │    │
//! │  │   │   Database    │    │  Repositories  │    │  Migrations  │   │    │
//! │  │   │   (pool.rs)   │    │ (repository/)  │    │  (embedded)  │   │    │
//! │  │   │               │    │                │    │              │   │    │
//! │  │   │ SqlitePool    │◄───│ SqliteStores   │    │ 001_initial  │   │    │
//! │  │   │               │    │ SqliteProducts │    │ _schema.sql  │   │    │
//! │  │   │               │    │ SqliteInventory│    │              │   │    │
//! │  │   └───────────────┘    └────────────────┘    └──────────────┘   │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  mercado_engine::Commerce::new(repos)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mercado_db::{Database, DbConfig};
//! use mercado_engine::Commerce;
//!
//! let db = Database::new(DbConfig::new("./mercado.db")).await?;
//! let commerce = Commerce::new(db.repositories());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
