//! # Community
//!
//! Comments on stores and products, and store claims.
//!
//! ## Comment Deletion
//! ```text
//! delete_comment(id, user)
//!   no user ─────────────────────────── UNAUTHORIZED
//!   comment missing ─────────────────── ok (nothing to delete)
//!   admin ───────────────────────────── delete
//!   STORE target   → store ──┐
//!   PRODUCT target → product → store ─┴─ owner → delete, else FORBIDDEN
//! ```

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use tracing::{error, info};

use mercado_core::error::CoreError;
use mercado_core::policy::{
    apply_claim_decision, assert_admin, assert_owner_or_admin, require_user, UserContext,
};
use mercado_core::types::{
    new_id, ClaimDecision, ClaimStatus, Comment, CommentTarget, Store, StoreClaim, StoreType,
};
use mercado_core::validation::{validate_comment_content, validate_evidence_docs};

use crate::error::CommerceResult;
use crate::ports::{ClaimRepository, CommentRepository, ProductRepository, StoreRepository};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    pub target_type: CommentTarget,
    pub target_id: String,
    pub content: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStoreClaim {
    pub store_id: String,
    pub evidence_docs: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewStoreClaim {
    pub claim_id: String,
    pub decision: ClaimDecision,
}

#[derive(Clone)]
pub struct CommunityService {
    stores: Arc<dyn StoreRepository>,
    products: Arc<dyn ProductRepository>,
    comments: Arc<dyn CommentRepository>,
    claims: Arc<dyn ClaimRepository>,
}

impl CommunityService {
    pub fn new(
        stores: Arc<dyn StoreRepository>,
        products: Arc<dyn ProductRepository>,
        comments: Arc<dyn CommentRepository>,
        claims: Arc<dyn ClaimRepository>,
    ) -> Self {
        CommunityService {
            stores,
            products,
            comments,
            claims,
        }
    }

    // =========================================================================
    // Comments
    // =========================================================================

    pub async fn create_comment(
        &self,
        input: NewComment,
        user: Option<&UserContext>,
        tenant_id: &str,
    ) -> CommerceResult<Comment> {
        let user = require_user(user)?;
        validate_comment_content(&input.content)?;

        match input.target_type {
            CommentTarget::Store => {
                self.stores
                    .find_by_id(&input.target_id, tenant_id)
                    .await?
                    .ok_or_else(|| CoreError::StoreNotFound(input.target_id.clone()))?;
            }
            CommentTarget::Product => {
                self.products
                    .find_by_id(&input.target_id, tenant_id)
                    .await?
                    .ok_or_else(|| CoreError::ProductNotFound(input.target_id.clone()))?;
            }
        }

        let comment = Comment {
            id: new_id(),
            tenant_id: tenant_id.to_string(),
            target_type: input.target_type,
            target_id: input.target_id,
            user_id: user.id.clone(),
            content: input.content.trim().to_string(),
            created_at: Utc::now(),
        };
        self.comments.insert(&comment).await?;

        info!(
            comment_id = %comment.id,
            target_type = ?comment.target_type,
            target_id = %comment.target_id,
            "Comment created"
        );
        Ok(comment)
    }

    pub async fn list_comments(
        &self,
        target_type: CommentTarget,
        target_id: &str,
        tenant_id: &str,
    ) -> CommerceResult<Vec<Comment>> {
        Ok(self
            .comments
            .list_by_target(target_type, target_id, tenant_id)
            .await?)
    }

    /// Deletes a comment. Admins and the owner of the commented store may.
    ///
    /// A comment whose product or store no longer resolves has no owner to
    /// check against, so only an admin can remove it; anyone else gets
    /// FORBIDDEN. A missing comment is a no-op.
    pub async fn delete_comment(
        &self,
        comment_id: &str,
        user: Option<&UserContext>,
        tenant_id: &str,
    ) -> CommerceResult<()> {
        let caller = require_user(user)?;
        let Some(comment) = self.comments.find_by_id(comment_id, tenant_id).await? else {
            return Ok(());
        };

        if !caller.is_admin() {
            let store = self
                .owning_store(&comment)
                .await?
                .ok_or_else(|| CoreError::forbidden(format!("delete comment {comment_id}")))?;
            assert_owner_or_admin(&store, user)?;
        }

        self.comments.delete(&comment.id, tenant_id).await?;
        info!(comment_id = %comment_id, deleted_by = %caller.id, "Comment deleted");
        Ok(())
    }

    /// Walks comment → store or comment → product → store.
    async fn owning_store(&self, comment: &Comment) -> CommerceResult<Option<Store>> {
        let store_id = match comment.target_type {
            CommentTarget::Store => comment.target_id.clone(),
            CommentTarget::Product => {
                match self
                    .products
                    .find_by_id(&comment.target_id, &comment.tenant_id)
                    .await?
                {
                    Some(product) => product.store_id,
                    None => return Ok(None),
                }
            }
        };
        Ok(self.stores.find_by_id(&store_id, &comment.tenant_id).await?)
    }

    // =========================================================================
    // Store Claims
    // =========================================================================

    /// Files a claim on a COMMUNITY store.
    pub async fn submit_store_claim(
        &self,
        input: NewStoreClaim,
        user: Option<&UserContext>,
        tenant_id: &str,
    ) -> CommerceResult<StoreClaim> {
        let user = require_user(user)?;
        validate_evidence_docs(&input.evidence_docs)?;

        let store = self
            .stores
            .find_by_id(&input.store_id, tenant_id)
            .await?
            .ok_or_else(|| CoreError::StoreNotFound(input.store_id.clone()))?;
        if store.store_type != StoreType::Community {
            return Err(CoreError::conflict("owner of store", store.slug.clone()).into());
        }

        let claim = StoreClaim {
            id: new_id(),
            tenant_id: tenant_id.to_string(),
            store_id: store.id,
            user_id: user.id.clone(),
            evidence_docs: input.evidence_docs,
            status: ClaimStatus::Pending,
            created_at: Utc::now(),
            reviewed_at: None,
        };
        self.claims.insert(&claim).await?;

        info!(claim_id = %claim.id, store_id = %claim.store_id, user_id = %claim.user_id, "Store claim submitted");
        Ok(claim)
    }

    /// Approves or rejects a PENDING claim. Admin only.
    pub async fn review_store_claim(
        &self,
        input: ReviewStoreClaim,
        user: Option<&UserContext>,
        tenant_id: &str,
    ) -> CommerceResult<StoreClaim> {
        assert_admin(user, "review store claims")?;

        let mut claim = self
            .claims
            .find_by_id(&input.claim_id, tenant_id)
            .await?
            .ok_or_else(|| CoreError::ClaimNotFound(input.claim_id.clone()))?;
        let mut store = self
            .stores
            .find_by_id(&claim.store_id, tenant_id)
            .await?
            .ok_or_else(|| CoreError::StoreNotFound(claim.store_id.clone()))?;

        let pending = claim.clone();
        apply_claim_decision(&mut claim, &mut store, input.decision)?;
        claim.reviewed_at = Some(Utc::now());

        // Claim first; a failed store write reopens it.
        self.claims.update(&claim).await?;
        if claim.status == ClaimStatus::Approved {
            if let Err(err) = self.stores.update(&store).await {
                if let Err(revert_err) = self.claims.update(&pending).await {
                    error!(
                        claim_id = %claim.id,
                        error = %revert_err,
                        "Failed to reopen claim after store update failure"
                    );
                }
                return Err(err.into());
            }
        }

        info!(
            claim_id = %claim.id,
            store_id = %claim.store_id,
            status = %claim.status,
            "Store claim reviewed"
        );
        Ok(claim)
    }

    pub async fn list_claims_for_store(
        &self,
        store_id: &str,
        user: Option<&UserContext>,
        tenant_id: &str,
    ) -> CommerceResult<Vec<StoreClaim>> {
        assert_admin(user, "list store claims")?;
        Ok(self.claims.list_by_store(store_id, tenant_id).await?)
    }
}
