//! # Access Policy
//!
//! Who may mutate what, and the store-claim state machine.
//!
//! ```text
//! assert_owner_or_admin(store, user)
//!   no user            → UNAUTHORIZED
//!   admin              → ok
//!   store.owner == user→ ok
//!   otherwise          → FORBIDDEN
//!
//! StoreClaim:  PENDING ──APPROVE──► APPROVED   (store → OWNED by claimant)
//!                 │
//!                 └─────REJECT───► REJECTED   (store untouched)
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::types::{ClaimDecision, ClaimStatus, Store, StoreClaim, StoreType};

/// Role carried by an authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    #[default]
    User,
    Admin,
}

/// Identity of the caller, as established by the authentication layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserContext {
    pub id: String,
    pub role: Role,
}

impl UserContext {
    pub fn user(id: impl Into<String>) -> Self {
        UserContext {
            id: id.into(),
            role: Role::User,
        }
    }

    pub fn admin(id: impl Into<String>) -> Self {
        UserContext {
            id: id.into(),
            role: Role::Admin,
        }
    }

    #[inline]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Fails UNAUTHORIZED when there is no caller.
pub fn require_user(user: Option<&UserContext>) -> CoreResult<&UserContext> {
    user.ok_or(CoreError::Unauthorized)
}

/// Admins and the store's owner pass; everyone else is refused.
pub fn assert_owner_or_admin(store: &Store, user: Option<&UserContext>) -> CoreResult<()> {
    let user = require_user(user)?;
    if user.is_admin() || store.is_owned_by(&user.id) {
        return Ok(());
    }
    Err(CoreError::forbidden(format!("manage store {}", store.slug)))
}

pub fn assert_admin(user: Option<&UserContext>, action: &str) -> CoreResult<()> {
    let user = require_user(user)?;
    if user.is_admin() {
        Ok(())
    } else {
        Err(CoreError::forbidden(action))
    }
}

// =============================================================================
// Claim State Machine
// =============================================================================

/// Moves a PENDING claim to its terminal state.
///
/// On approval the store is handed to the claimant. Terminal claims are
/// final and fail with [`CoreError::ClaimAlreadyReviewed`]. Approving a
/// claim on a store that already has an owner fails CONFLICT and leaves
/// both untouched; rejecting it is still allowed.
pub fn apply_claim_decision(
    claim: &mut StoreClaim,
    store: &mut Store,
    decision: ClaimDecision,
) -> CoreResult<()> {
    if claim.status.is_terminal() {
        return Err(CoreError::ClaimAlreadyReviewed {
            claim_id: claim.id.clone(),
            status: claim.status,
        });
    }

    match decision {
        ClaimDecision::Approve => {
            if store.store_type == StoreType::Owned {
                return Err(CoreError::conflict("owner of store", store.slug.clone()));
            }
            claim.status = ClaimStatus::Approved;
            store.grant_ownership(claim.user_id.clone());
        }
        ClaimDecision::Reject => {
            claim.status = ClaimStatus::Rejected;
        }
    }
    Ok(())
}
