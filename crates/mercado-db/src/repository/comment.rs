//! # Comment Repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use mercado_core::types::{Comment, CommentTarget};
use mercado_engine::ports::{CommentRepository, RepoResult};

use crate::error::DbError;

#[derive(Debug, sqlx::FromRow)]
struct CommentRow {
    id: String,
    tenant_id: String,
    target_type: CommentTarget,
    target_id: String,
    user_id: String,
    content: String,
    created_at: DateTime<Utc>,
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Comment {
            id: row.id,
            tenant_id: row.tenant_id,
            target_type: row.target_type,
            target_id: row.target_id,
            user_id: row.user_id,
            content: row.content,
            created_at: row.created_at,
        }
    }
}

const SELECT_COMMENT: &str = r#"
    SELECT id, tenant_id, target_type, target_id, user_id, content, created_at
    FROM comments
"#;

#[derive(Debug, Clone)]
pub struct SqliteComments {
    pool: SqlitePool,
}

impl SqliteComments {
    pub fn new(pool: SqlitePool) -> Self {
        SqliteComments { pool }
    }
}

#[async_trait]
impl CommentRepository for SqliteComments {
    async fn insert(&self, comment: &Comment) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO comments (id, tenant_id, target_type, target_id, user_id, content, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&comment.id)
        .bind(&comment.tenant_id)
        .bind(comment.target_type)
        .bind(&comment.target_id)
        .bind(&comment.user_id)
        .bind(&comment.content)
        .bind(comment.created_at)
        .execute(&self.pool)
        .await
        .map_err(DbError::from)?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str, tenant_id: &str) -> RepoResult<Option<Comment>> {
        let row = sqlx::query_as::<_, CommentRow>(&format!(
            "{SELECT_COMMENT} WHERE id = ?1 AND tenant_id = ?2"
        ))
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::from)?;
        Ok(row.map(Comment::from))
    }

    async fn list_by_target(
        &self,
        target_type: CommentTarget,
        target_id: &str,
        tenant_id: &str,
    ) -> RepoResult<Vec<Comment>> {
        let rows = sqlx::query_as::<_, CommentRow>(&format!(
            r#"{SELECT_COMMENT}
            WHERE tenant_id = ?1 AND target_type = ?2 AND target_id = ?3
            ORDER BY created_at, rowid"#
        ))
        .bind(tenant_id)
        .bind(target_type)
        .bind(target_id)
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)?;
        Ok(rows.into_iter().map(Comment::from).collect())
    }

    async fn delete(&self, id: &str, tenant_id: &str) -> RepoResult<()> {
        sqlx::query("DELETE FROM comments WHERE id = ?1 AND tenant_id = ?2")
            .bind(id)
            .bind(tenant_id)
            .execute(&self.pool)
            .await
            .map_err(DbError::from)?;
        Ok(())
    }
}
