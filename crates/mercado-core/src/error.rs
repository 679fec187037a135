//! # Error Types
//!
//! Domain-specific error types for mercado-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  mercado-core errors (this file)                                        │
//! │  ├── CoreError        - Business rule violations                        │
//! │  ├── ValidationError  - Input validation failures                       │
//! │  └── ErrorCode        - Stable code surfaced to collaborators           │
//! │                                                                         │
//! │  mercado-db errors (separate crate)                                     │
//! │  └── DbError          - Database operation failures                     │
//! │                                                                         │
//! │  mercado-engine errors                                                  │
//! │  └── CommerceError    - CoreError | storage failure, rendered as        │
//! │                         ErrorBody { code, message }                     │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → CommerceError → ErrorBody          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::types::ClaimStatus;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// Each variant carries the context a caller needs (offending SKU, ids)
/// and maps to exactly one [`ErrorCode`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// No authenticated identity was supplied.
    #[error("Authentication required")]
    Unauthorized,

    /// The caller is authenticated but not permitted to perform `action`.
    #[error("Not permitted to {action}")]
    Forbidden { action: String },

    #[error("Store not found: {0}")]
    StoreNotFound(String),

    /// Product or variant cannot be resolved.
    ///
    /// ## When This Occurs
    /// - SKU doesn't exist in the tenant's catalog
    /// - A bundle references a child SKU that was never created
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    #[error("Store claim not found: {0}")]
    ClaimNotFound(String),

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// Insufficient stock to add or settle a line.
    ///
    /// ## User Workflow
    /// ```text
    /// Add to Cart (qty: 5)
    ///      │
    ///      ▼
    /// Check stock: available=3
    ///      │
    ///      ▼
    /// InsufficientStock { sku: "TAZA-01", available: 3, requested: 5 }
    /// ```
    #[error("Insufficient stock for {sku}: available {available}, requested {requested}")]
    InsufficientStock {
        sku: String,
        available: i64,
        requested: i64,
    },

    /// Checkout was attempted with no cart lines.
    #[error("Cart is empty")]
    CartEmpty,

    /// Cart has exceeded maximum allowed lines.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// Line quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// Uniqueness violation (duplicate slug, duplicate SKU).
    #[error("{field} '{value}' already exists")]
    Conflict { field: String, value: String },

    /// Claim already left PENDING; both terminal states are final.
    #[error("Store claim {claim_id} was already {status}")]
    ClaimAlreadyReviewed { claim_id: String, status: ClaimStatus },

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates a Forbidden error for the given action.
    pub fn forbidden(action: impl Into<String>) -> Self {
        CoreError::Forbidden {
            action: action.into(),
        }
    }

    /// Creates a Conflict error.
    pub fn conflict(field: impl Into<String>, value: impl Into<String>) -> Self {
        CoreError::Conflict {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Returns the stable code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::Unauthorized => ErrorCode::Unauthorized,
            CoreError::Forbidden { .. } => ErrorCode::Forbidden,
            CoreError::StoreNotFound(_) => ErrorCode::StoreNotFound,
            CoreError::ProductNotFound(_) => ErrorCode::ProductNotFound,
            CoreError::ClaimNotFound(_) => ErrorCode::ClaimNotFound,
            CoreError::OrderNotFound(_) => ErrorCode::OrderNotFound,
            CoreError::InsufficientStock { .. } => ErrorCode::InsufficientStock,
            CoreError::CartEmpty => ErrorCode::CartEmpty,
            CoreError::CartTooLarge { .. }
            | CoreError::QuantityTooLarge { .. }
            | CoreError::Validation(_) => ErrorCode::ValidationError,
            CoreError::Conflict { .. } | CoreError::ClaimAlreadyReviewed { .. } => {
                ErrorCode::Conflict
            }
        }
    }

    /// Renders the error for a collaborator.
    pub fn to_body(&self) -> ErrorBody {
        ErrorBody::new(self.code(), self.to_string())
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Used for early validation before business logic runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., malformed URL, illegal slug characters).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value appears more than once where it must be unique.
    #[error("{field} '{value}' is listed more than once")]
    Repeated { field: String, value: String },

    /// A field that only makes sense for another variant of the input.
    #[error("{field} is not allowed here: {reason}")]
    NotAllowed { field: String, reason: String },

    /// Multiplying quantities or prices left the i64 range.
    #[error("{field} is too large")]
    Overflow { field: String },
}

// =============================================================================
// Error Code
// =============================================================================

/// Stable machine-readable codes surfaced to collaborators.
///
/// ```json
/// { "code": "INSUFFICIENT_STOCK", "message": "Insufficient stock for ..." }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ValidationError,
    Unauthorized,
    Forbidden,
    StoreNotFound,
    ProductNotFound,
    ClaimNotFound,
    OrderNotFound,
    InsufficientStock,
    CartEmpty,
    Conflict,
    InternalError,
}

impl ErrorCode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::Forbidden => "FORBIDDEN",
            ErrorCode::StoreNotFound => "STORE_NOT_FOUND",
            ErrorCode::ProductNotFound => "PRODUCT_NOT_FOUND",
            ErrorCode::ClaimNotFound => "CLAIM_NOT_FOUND",
            ErrorCode::OrderNotFound => "ORDER_NOT_FOUND",
            ErrorCode::InsufficientStock => "INSUFFICIENT_STOCK",
            ErrorCode::CartEmpty => "CART_EMPTY",
            ErrorCode::Conflict => "CONFLICT",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a collaborator receives when an operation fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub code: ErrorCode,
    pub message: String,
}

impl ErrorBody {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ErrorBody {
            code,
            message: message.into(),
        }
    }

    /// Generic body for failures that must not leak internals.
    pub fn internal() -> Self {
        ErrorBody::new(ErrorCode::InternalError, "Unexpected error")
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
