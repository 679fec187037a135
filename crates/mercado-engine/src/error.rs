//! # Commerce Error
//!
//! The single error type returned by every use case.
//!
//! ```text
//! CoreError ─────────────────────────────┐
//!                                         ▼
//! RepoError::Conflict ──► CoreError::Conflict ──► CommerceError::Domain ──► ErrorBody
//! RepoError::NotFound ─┐
//! RepoError::Backend ──┴─► error! log ──► CommerceError::Storage ──► INTERNAL_ERROR,
//!                                                                  "Unexpected error"
//! ```

use thiserror::Error;

use mercado_core::error::{CoreError, ErrorBody, ErrorCode};

use crate::ports::RepoError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommerceError {
    /// A business rule refused the operation.
    #[error(transparent)]
    Domain(#[from] CoreError),

    /// Storage failed in a way the caller cannot act on.
    #[error("storage failure: {0}")]
    Storage(RepoError),
}

impl CommerceError {
    pub fn code(&self) -> ErrorCode {
        match self {
            CommerceError::Domain(err) => err.code(),
            CommerceError::Storage(_) => ErrorCode::InternalError,
        }
    }

    /// Renders the error for a collaborator. Storage details never leave
    /// the process.
    pub fn to_body(&self) -> ErrorBody {
        match self {
            CommerceError::Domain(err) => err.to_body(),
            CommerceError::Storage(_) => ErrorBody::internal(),
        }
    }

    /// Returns the domain error, if this is one.
    pub fn as_domain(&self) -> Option<&CoreError> {
        match self {
            CommerceError::Domain(err) => Some(err),
            CommerceError::Storage(_) => None,
        }
    }
}

impl From<RepoError> for CommerceError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Conflict { field, value } => {
                CommerceError::Domain(CoreError::Conflict { field, value })
            }
            other => {
                // Log the actual error but return a generic one
                tracing::error!(error = %other, "Storage operation failed");
                CommerceError::Storage(other)
            }
        }
    }
}

impl From<mercado_core::ValidationError> for CommerceError {
    fn from(err: mercado_core::ValidationError) -> Self {
        CommerceError::Domain(CoreError::Validation(err))
    }
}

pub type CommerceResult<T> = Result<T, CommerceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_becomes_domain_error() {
        let err: CommerceError = RepoError::Conflict {
            field: "slug".into(),
            value: "tienda".into(),
        }
        .into();
        assert_eq!(err.code(), ErrorCode::Conflict);
        assert_eq!(err.to_body().message, "slug 'tienda' already exists");
    }

    #[test]
    fn test_backend_error_is_generic() {
        let err: CommerceError = RepoError::Backend("disk I/O error at /var/db".into()).into();
        let body = err.to_body();
        assert_eq!(body.code, ErrorCode::InternalError);
        assert_eq!(body.message, "Unexpected error");
        assert!(err.as_domain().is_none());
    }

    #[test]
    fn test_domain_error_passes_through() {
        let err = CommerceError::from(CoreError::CartEmpty);
        assert_eq!(err.code(), ErrorCode::CartEmpty);
        assert_eq!(err.to_body().message, "Cart is empty");
    }
}
