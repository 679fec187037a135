//! # Storage Errors
//!
//! SQLite failures are classified here and then narrowed to the engine's
//! [`RepoError`] at the repository boundary.
//!
//! ```text
//! sqlx::Error ─┐
//! MigrateError ├──► DbError ──► RepoError ──► CommerceError
//! serde_json  ─┘      │            │
//!                     │            ├─ Conflict { field, value }  (UNIQUE)
//!                     │            └─ Backend(message)           (anything else)
//!                     └─ keeps the full SQLite message for logs
//! ```

use thiserror::Error;

use mercado_engine::RepoError;

#[derive(Debug, Error)]
pub enum DbError {
    /// A UNIQUE index rejected the row: store slug in a tenant, product
    /// slug in a store, or a variant SKU in a tenant.
    #[error("{field} '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// A row pointed at a store or product that isn't there.
    #[error("Dangling reference: {message}")]
    ForeignKeyViolation { message: String },

    #[error("Cannot open database: {0}")]
    ConnectionFailed(String),

    #[error("Schema migration failed: {0}")]
    MigrationFailed(String),

    #[error("SQLite rejected statement: {0}")]
    QueryFailed(String),

    /// A JSON column (variants, cart lines, evidence) didn't round-trip.
    #[error("Corrupt column data: {0}")]
    Corrupt(String),

    #[error("Timed out waiting for a pooled connection")]
    PoolExhausted,

    #[error("Storage error: {0}")]
    Internal(String),
}

impl DbError {
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    /// SQLite reports the index columns but not the offending value, so
    /// repositories relabel UNIQUE failures with what they were inserting.
    /// Other errors pass through.
    pub fn on_conflict(self, field: &str, value: &str) -> Self {
        match self {
            DbError::UniqueViolation { .. } => DbError::duplicate(field, value),
            other => other,
        }
    }
}

/// Last column named in "UNIQUE constraint failed: stores.tenant_id, stores.slug".
fn unique_column(msg: &str) -> String {
    msg.rsplit(|c: char| c == ',' || c == ':')
        .next()
        .map(str::trim)
        .and_then(|qualified| qualified.rsplit('.').next())
        .filter(|column| !column.is_empty())
        .unwrap_or("value")
        .to_string()
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();
                if msg.starts_with("UNIQUE constraint failed") {
                    DbError::duplicate(unique_column(msg), "?")
                } else if msg.starts_with("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }
            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,
            sqlx::Error::PoolClosed => DbError::ConnectionFailed("pool closed".to_string()),
            other => DbError::Internal(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

impl From<serde_json::Error> for DbError {
    fn from(err: serde_json::Error) -> Self {
        DbError::Corrupt(err.to_string())
    }
}

impl From<DbError> for RepoError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::UniqueViolation { field, value } => RepoError::Conflict { field, value },
            other => RepoError::Backend(other.to_string()),
        }
    }
}

pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_on_conflict_relabels_unique_only() {
        let err = DbError::duplicate("stores.tenant_id, stores.slug", "unknown").on_conflict("slug", "barro");
        assert!(matches!(
            err,
            DbError::UniqueViolation { ref field, ref value } if field == "slug" && value == "barro"
        ));

        let err = DbError::PoolExhausted.on_conflict("slug", "barro");
        assert!(matches!(err, DbError::PoolExhausted));
    }

    #[test]
    fn test_unique_column_takes_last_indexed_column() {
        assert_eq!(unique_column("UNIQUE constraint failed: stores.tenant_id, stores.slug"), "slug");
        assert_eq!(unique_column("UNIQUE constraint failed: product_variants.sku"), "sku");
    }

    #[test]
    fn test_repo_error_mapping() {
        assert_eq!(
            RepoError::from(DbError::duplicate("sku", "TAZA")),
            RepoError::Conflict {
                field: "sku".into(),
                value: "TAZA".into()
            }
        );
        assert!(matches!(
            RepoError::from(DbError::QueryFailed("no such table: stores".into())),
            RepoError::Backend(msg) if msg.contains("no such table")
        ));
    }
}
