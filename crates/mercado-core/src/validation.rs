//! # Validation Module
//!
//! Input validation utilities for Mercado.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP collaborator                                             │
//! │  └── Request framing (types, required fields)                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: mercado-engine use case                                       │
//! │  └── THIS MODULE: business rule validation                              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Storage                                                       │
//! │  ├── UNIQUE (slug, tenant), (store, slug), (sku, tenant)                │
//! │  └── NOT NULL / foreign keys                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use mercado_core::validation::{validate_slug, validate_quantity};
//!
//! validate_slug("tienda-azul").unwrap();
//! validate_quantity(5, 999).unwrap();
//! ```

use std::collections::HashSet;

use url::Url;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{BundleItem, Pricing, ProductVariant};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

pub const NAME_MIN_LEN: usize = 2;
pub const NAME_MAX_LEN: usize = 200;
pub const SLUG_MAX_LEN: usize = 120;
pub const SKU_MAX_LEN: usize = 64;
pub const COMMENT_MAX_LEN: usize = 2000;
/// Units of one child SKU inside a single bundle.
pub const MAX_BUNDLE_ITEM_QTY: i64 = 999;
/// Highest catalog price, in minor units (100 million major units).
pub const MAX_PRICE_MINOR: i64 = 10_000_000_000;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a SKU (Stock Keeping Unit).
///
/// ## Rules
/// - Must not be empty
/// - At most 64 characters
/// - Only alphanumeric characters, hyphens, underscores
///
/// ## Example
/// ```rust
/// use mercado_core::validation::validate_sku;
///
/// assert!(validate_sku("TAZA-AZUL-01").is_ok());
/// assert!(validate_sku("").is_err());
/// assert!(validate_sku("has space").is_err());
/// ```
pub fn validate_sku(sku: &str) -> ValidationResult<()> {
    let sku = sku.trim();

    if sku.is_empty() {
        return Err(ValidationError::Required {
            field: "sku".to_string(),
        });
    }

    if sku.len() > SKU_MAX_LEN {
        return Err(ValidationError::TooLong {
            field: "sku".to_string(),
            max: SKU_MAX_LEN,
        });
    }

    if !sku
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "sku".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a display name (store name, product title, variant name).
pub fn validate_name(field: &str, value: &str) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    let len = value.chars().count();
    if len < NAME_MIN_LEN {
        return Err(ValidationError::TooShort {
            field: field.to_string(),
            min: NAME_MIN_LEN,
        });
    }
    if len > NAME_MAX_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: NAME_MAX_LEN,
        });
    }

    Ok(())
}

/// Validates a URL slug.
///
/// ## Rules
/// - At least 2, at most 120 characters
/// - Lowercase ASCII letters, digits, hyphens, underscores
pub fn validate_slug(slug: &str) -> ValidationResult<()> {
    if slug.is_empty() {
        return Err(ValidationError::Required {
            field: "slug".to_string(),
        });
    }
    if slug.len() < NAME_MIN_LEN {
        return Err(ValidationError::TooShort {
            field: "slug".to_string(),
            min: NAME_MIN_LEN,
        });
    }
    if slug.len() > SLUG_MAX_LEN {
        return Err(ValidationError::TooLong {
            field: "slug".to_string(),
            max: SLUG_MAX_LEN,
        });
    }
    if !slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "slug".to_string(),
            reason: "must contain only lowercase letters, digits, hyphens, and underscores"
                .to_string(),
        });
    }
    Ok(())
}

/// Validates a free-text search query and returns it trimmed.
///
/// Empty queries are allowed and mean "no text filter".
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.len() > 100 {
        return Err(ValidationError::TooLong {
            field: "q".to_string(),
            max: 100,
        });
    }

    Ok(query.to_string())
}

pub fn validate_comment_content(content: &str) -> ValidationResult<()> {
    let content = content.trim();
    if content.is_empty() {
        return Err(ValidationError::Required {
            field: "content".to_string(),
        });
    }
    if content.chars().count() > COMMENT_MAX_LEN {
        return Err(ValidationError::TooLong {
            field: "content".to_string(),
            max: COMMENT_MAX_LEN,
        });
    }
    Ok(())
}

/// Validates that `value` is an absolute http(s) URL.
///
/// ```rust
/// use mercado_core::validation::validate_url;
///
/// assert!(validate_url("images", "https://cdn.example.com/taza.jpg").is_ok());
/// assert!(validate_url("images", "taza.jpg").is_err());
/// ```
pub fn validate_url(field: &str, value: &str) -> ValidationResult<()> {
    let parsed = Url::parse(value).map_err(|e| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: e.to_string(),
    })?;

    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: format!("unsupported scheme '{other}'"),
        }),
    }
}

/// Claim evidence: at least one document, each an absolute URL.
pub fn validate_evidence_docs(docs: &[String]) -> ValidationResult<()> {
    if docs.is_empty() {
        return Err(ValidationError::Required {
            field: "evidenceDocs".to_string(),
        });
    }
    docs.iter()
        .try_for_each(|doc| validate_url("evidenceDocs", doc))
}

/// Tenant ids are opaque but must be present.
pub fn validate_tenant_id(tenant_id: &str) -> ValidationResult<()> {
    if tenant_id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "tenantId".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a requested quantity.
///
/// ## User Workflow
/// ```text
/// Add to cart: qty = 5
///      │
///      ▼
/// validate_quantity(5, 999) ← THIS FUNCTION
///      │
///      ├── qty <= 0?   → "quantity must be positive"
///      ├── qty > max?  → "quantity must be between 1 and 999"
///      └── OK → resolve variant, check stock
/// ```
pub fn validate_quantity(qty: i64, max: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > max {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max,
        });
    }

    Ok(())
}

pub fn validate_positive_price(field: &str, price: Money) -> ValidationResult<()> {
    if !price.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    if price.minor_units() > MAX_PRICE_MINOR {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 1,
            max: MAX_PRICE_MINOR,
        });
    }
    Ok(())
}

/// Default price must be positive; offer and clearance too when present.
pub fn validate_pricing(pricing: &Pricing) -> ValidationResult<()> {
    validate_positive_price("pricing.default", pricing.default)?;
    if let Some(offer) = pricing.offer {
        validate_positive_price("pricing.offer", offer)?;
    }
    if let Some(clearance) = pricing.clearance {
        validate_positive_price("pricing.clearance", clearance)?;
    }
    if pricing.currency.len() != 3 || !pricing.currency.chars().all(|c| c.is_ascii_uppercase()) {
        return Err(ValidationError::InvalidFormat {
            field: "pricing.currency".to_string(),
            reason: "must be a three-letter ISO 4217 code".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates a product's variants.
///
/// ## Rules
/// - At least one variant
/// - SKUs valid and distinct within the product
/// - Names present, pricing valid, images are URLs
pub fn validate_variants(variants: &[ProductVariant]) -> ValidationResult<()> {
    if variants.is_empty() {
        return Err(ValidationError::Required {
            field: "variants".to_string(),
        });
    }

    let mut seen = HashSet::new();
    for variant in variants {
        validate_sku(&variant.sku)?;
        if !seen.insert(variant.sku.as_str()) {
            return Err(ValidationError::Repeated {
                field: "sku".to_string(),
                value: variant.sku.clone(),
            });
        }
        if variant.name.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "variants.name".to_string(),
            });
        }
        validate_pricing(&variant.pricing)?;
        for image in variant.images.iter().chain(variant.main_image.iter()) {
            validate_url("images", image)?;
        }
    }
    Ok(())
}

/// Validates bundle composition: non-empty, qty in 1..=999, no repeated child.
pub fn validate_bundle_items(items: &[BundleItem]) -> ValidationResult<()> {
    if items.is_empty() {
        return Err(ValidationError::Required {
            field: "bundleItems".to_string(),
        });
    }

    let mut seen = HashSet::new();
    for item in items {
        validate_sku(&item.sku)?;
        if item.qty < 1 {
            return Err(ValidationError::MustBePositive {
                field: "bundleItems.qty".to_string(),
            });
        }
        if item.qty > MAX_BUNDLE_ITEM_QTY {
            return Err(ValidationError::OutOfRange {
                field: "bundleItems.qty".to_string(),
                min: 1,
                max: MAX_BUNDLE_ITEM_QTY,
            });
        }
        if !seen.insert(item.sku.as_str()) {
            return Err(ValidationError::Repeated {
                field: "bundleItems.sku".to_string(),
                value: item.sku.clone(),
            });
        }
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_sku() {
        assert!(validate_sku("TAZA-01").is_ok());
        assert!(validate_sku("kit_barro").is_ok());

        assert!(validate_sku("").is_err());
        assert!(validate_sku("   ").is_err());
        assert!(validate_sku("has space").is_err());
        assert!(validate_sku(&"A".repeat(100)).is_err());
    }

    #[test]
    fn test_validate_name_and_slug() {
        assert!(validate_name("name", "Tienda Azul").is_ok());
        assert!(matches!(
            validate_name("name", "A"),
            Err(ValidationError::TooShort { min: 2, .. })
        ));
        assert!(validate_slug("tienda-azul").is_ok());
        assert!(validate_slug("t").is_err());
        assert!(validate_slug("Tienda Azul").is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1, 999).is_ok());
        assert!(validate_quantity(999, 999).is_ok());
        assert!(validate_quantity(0, 999).is_err());
        assert!(validate_quantity(-1, 999).is_err());
        assert!(validate_quantity(1000, 999).is_err());
    }

    #[test]
    fn test_validate_pricing() {
        assert!(validate_pricing(&Pricing::new(Money::from_major(10))).is_ok());
        assert!(validate_pricing(&Pricing::new(Money::zero())).is_err());

        let bad_offer = Pricing::new(Money::from_major(10)).with_offer(Money::zero());
        assert!(validate_pricing(&bad_offer).is_err());

        let mut bad_currency = Pricing::new(Money::from_major(10));
        bad_currency.currency = "pesos".into();
        assert!(validate_pricing(&bad_currency).is_err());
    }

    #[test]
    fn test_validate_variants() {
        let pricing = Pricing::new(Money::from_major(10));
        assert!(validate_variants(&[]).is_err());

        let dupes = vec![
            ProductVariant::new("A", "Uno", pricing.clone()),
            ProductVariant::new("A", "Dos", pricing.clone()),
        ];
        assert!(matches!(
            validate_variants(&dupes),
            Err(ValidationError::Repeated { .. })
        ));

        let mut with_image = ProductVariant::new("B", "Uno", pricing);
        with_image.images = vec!["not a url".into()];
        assert!(validate_variants(&[with_image]).is_err());
    }

    #[test]
    fn test_validate_bundle_items() {
        assert!(validate_bundle_items(&[BundleItem::new("X", 2)]).is_ok());
        assert!(validate_bundle_items(&[]).is_err());
        assert!(validate_bundle_items(&[BundleItem::new("X", 0)]).is_err());
        assert!(validate_bundle_items(&[BundleItem::new("X", 1), BundleItem::new("X", 1)]).is_err());
    }

    #[test]
    fn test_validate_evidence_docs() {
        assert!(validate_evidence_docs(&["https://example.com/acta.pdf".into()]).is_ok());
        assert!(validate_evidence_docs(&[]).is_err());
        assert!(validate_evidence_docs(&["ftp://example.com/a".into()]).is_err());
    }

    #[test]
    fn test_bundle_qty_and_price_ceilings() {
        assert!(validate_bundle_items(&[BundleItem::new("X", MAX_BUNDLE_ITEM_QTY)]).is_ok());
        assert!(matches!(
            validate_bundle_items(&[BundleItem::new("X", i64::MAX / 2)]),
            Err(ValidationError::OutOfRange { .. })
        ));

        assert!(validate_positive_price("pricing.default", Money::from_minor(MAX_PRICE_MINOR)).is_ok());
        assert!(matches!(
            validate_positive_price("pricing.default", Money::from_minor(MAX_PRICE_MINOR + 1)),
            Err(ValidationError::OutOfRange { .. })
        ));
    }
}
