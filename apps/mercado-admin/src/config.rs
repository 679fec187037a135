//! Admin configuration.
//!
//! Loaded from environment variables (and a `.env` file, if present) with
//! fallback to defaults.

use std::env;
use std::path::PathBuf;

use mercado_core::{CartLimits, DEFAULT_TENANT_ID, MAX_CART_ITEMS, MAX_ITEM_QUANTITY};
use mercado_db::DbConfig;

/// Admin CLI configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminConfig {
    /// SQLite database file
    pub database_path: PathBuf,

    /// Pool size
    pub max_connections: u32,

    /// Tenant used when a command does not name one
    pub tenant_id: String,

    /// Log filter, used when RUST_LOG is unset
    pub log_filter: String,

    /// Distinct lines allowed in one cart
    pub max_cart_lines: usize,

    /// Units allowed on one cart line
    pub max_item_quantity: i64,
}

impl AdminConfig {
    /// Load configuration from `.env` and the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        // A missing .env file is fine.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from any variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let config = AdminConfig {
            database_path: lookup("MERCADO_DATABASE_PATH")
                .unwrap_or_else(|| "./data/mercado.db".to_string())
                .into(),

            max_connections: lookup("MERCADO_MAX_CONNECTIONS")
                .unwrap_or_else(|| "5".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("MERCADO_MAX_CONNECTIONS".to_string()))?,

            tenant_id: lookup("MERCADO_TENANT_ID").unwrap_or_else(|| DEFAULT_TENANT_ID.to_string()),

            log_filter: lookup("MERCADO_LOG").unwrap_or_else(|| "info".to_string()),

            max_cart_lines: lookup("MERCADO_MAX_CART_LINES")
                .unwrap_or_else(|| MAX_CART_ITEMS.to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("MERCADO_MAX_CART_LINES".to_string()))?,

            max_item_quantity: lookup("MERCADO_MAX_ITEM_QUANTITY")
                .unwrap_or_else(|| MAX_ITEM_QUANTITY.to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("MERCADO_MAX_ITEM_QUANTITY".to_string()))?,
        };

        if config.max_connections == 0 {
            return Err(ConfigError::InvalidValue("MERCADO_MAX_CONNECTIONS".to_string()));
        }
        if config.tenant_id.trim().is_empty() {
            return Err(ConfigError::MissingRequired("MERCADO_TENANT_ID".to_string()));
        }
        if config.max_item_quantity < 1 {
            return Err(ConfigError::InvalidValue("MERCADO_MAX_ITEM_QUANTITY".to_string()));
        }

        Ok(config)
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database_path).max_connections(self.max_connections)
    }

    pub fn cart_limits(&self) -> CartLimits {
        CartLimits {
            max_lines: self.max_cart_lines,
            max_item_quantity: self.max_item_quantity,
        }
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AdminConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.database_path, PathBuf::from("./data/mercado.db"));
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.tenant_id, DEFAULT_TENANT_ID);
        assert_eq!(config.log_filter, "info");
        assert_eq!(config.cart_limits(), CartLimits::default());
    }

    #[test]
    fn test_overrides() {
        let config = AdminConfig::from_lookup(lookup(&[
            ("MERCADO_DATABASE_PATH", "/var/lib/mercado/db.sqlite"),
            ("MERCADO_MAX_CONNECTIONS", "8"),
            ("MERCADO_TENANT_ID", "tenant-a"),
            ("MERCADO_LOG", "debug,sqlx=warn"),
            ("MERCADO_MAX_CART_LINES", "10"),
        ]))
        .unwrap();
        assert_eq!(config.max_connections, 8);
        assert_eq!(config.tenant_id, "tenant-a");
        assert_eq!(config.cart_limits().max_lines, 10);
        assert_eq!(config.db_config().max_connections, 8);
    }

    #[test]
    fn test_invalid_numbers_name_the_variable() {
        let err = AdminConfig::from_lookup(lookup(&[("MERCADO_MAX_CONNECTIONS", "many")])).unwrap_err();
        assert_eq!(err.to_string(), "Invalid value for MERCADO_MAX_CONNECTIONS");

        let err = AdminConfig::from_lookup(lookup(&[("MERCADO_MAX_ITEM_QUANTITY", "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(name) if name == "MERCADO_MAX_ITEM_QUANTITY"));
    }
}
