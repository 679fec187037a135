//! # Store Claim Repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use mercado_core::types::{ClaimStatus, StoreClaim};
use mercado_engine::ports::{ClaimRepository, RepoError, RepoResult};

use crate::error::{DbError, DbResult};
use crate::repository::{from_json, to_json};

#[derive(Debug, sqlx::FromRow)]
struct ClaimRow {
    id: String,
    tenant_id: String,
    store_id: String,
    user_id: String,
    evidence_docs: String,
    status: ClaimStatus,
    created_at: DateTime<Utc>,
    reviewed_at: Option<DateTime<Utc>>,
}

impl ClaimRow {
    fn into_claim(self) -> DbResult<StoreClaim> {
        Ok(StoreClaim {
            id: self.id,
            tenant_id: self.tenant_id,
            store_id: self.store_id,
            user_id: self.user_id,
            evidence_docs: from_json(&self.evidence_docs)?,
            status: self.status,
            created_at: self.created_at,
            reviewed_at: self.reviewed_at,
        })
    }
}

const SELECT_CLAIM: &str = r#"
    SELECT id, tenant_id, store_id, user_id, evidence_docs, status, created_at, reviewed_at
    FROM store_claims
"#;

#[derive(Debug, Clone)]
pub struct SqliteClaims {
    pool: SqlitePool,
}

impl SqliteClaims {
    pub fn new(pool: SqlitePool) -> Self {
        SqliteClaims { pool }
    }
}

#[async_trait]
impl ClaimRepository for SqliteClaims {
    async fn insert(&self, claim: &StoreClaim) -> RepoResult<()> {
        let evidence_docs = to_json(&claim.evidence_docs)?;
        sqlx::query(
            r#"
            INSERT INTO store_claims (
                id, tenant_id, store_id, user_id, evidence_docs, status, created_at, reviewed_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&claim.id)
        .bind(&claim.tenant_id)
        .bind(&claim.store_id)
        .bind(&claim.user_id)
        .bind(evidence_docs)
        .bind(claim.status)
        .bind(claim.created_at)
        .bind(claim.reviewed_at)
        .execute(&self.pool)
        .await
        .map_err(DbError::from)?;

        debug!(claim_id = %claim.id, store_id = %claim.store_id, "Store claim inserted");
        Ok(())
    }

    async fn find_by_id(&self, id: &str, tenant_id: &str) -> RepoResult<Option<StoreClaim>> {
        let row = sqlx::query_as::<_, ClaimRow>(&format!(
            "{SELECT_CLAIM} WHERE id = ?1 AND tenant_id = ?2"
        ))
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(row.map(ClaimRow::into_claim).transpose()?)
    }

    async fn list_by_store(&self, store_id: &str, tenant_id: &str) -> RepoResult<Vec<StoreClaim>> {
        let rows = sqlx::query_as::<_, ClaimRow>(&format!(
            "{SELECT_CLAIM} WHERE store_id = ?1 AND tenant_id = ?2 ORDER BY created_at, rowid"
        ))
        .bind(store_id)
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)?;

        let claims = rows
            .into_iter()
            .map(ClaimRow::into_claim)
            .collect::<DbResult<Vec<_>>>()?;
        Ok(claims)
    }

    async fn update(&self, claim: &StoreClaim) -> RepoResult<()> {
        let result = sqlx::query(
            "UPDATE store_claims SET status = ?1, reviewed_at = ?2 WHERE id = ?3 AND tenant_id = ?4",
        )
        .bind(claim.status)
        .bind(claim.reviewed_at)
        .bind(&claim.id)
        .bind(&claim.tenant_id)
        .execute(&self.pool)
        .await
        .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound {
                entity: "store claim",
                id: claim.id.clone(),
            });
        }
        Ok(())
    }
}
