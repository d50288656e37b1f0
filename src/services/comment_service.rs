use serde::Deserialize;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::ownership;
use crate::clock::Clock;
use crate::database::models::Comment;
use crate::database::repository::select_clause;
use crate::database::{QueryContext, Repository};
use crate::error::ApiError;
use crate::filter::{Filter, Page, PageRequest, Scope};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct NewComment {
    pub issue_id: Uuid,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct CommentChanges {
    pub content: String,
}

pub struct CommentService {
    pool: PgPool,
    clock: Arc<dyn Clock>,
}

impl CommentService {
    pub fn new(state: &AppState) -> Self {
        Self { pool: state.pool.clone(), clock: state.clock.clone() }
    }

    fn repository(&self) -> Repository<Comment> {
        Repository::new(self.pool.clone())
    }

    /// Oldest first
    pub async fn list(&self, issue_id: Uuid, page: PageRequest) -> Result<Page<Comment>, ApiError> {
        let filter = Filter::for_entity::<Comment>()?.scope(Scope::new("issue_id", issue_id))?;
        Ok(self.repository().list(filter, page).await?)
    }

    pub async fn create(&self, author: Uuid, input: NewComment) -> Result<Comment, ApiError> {
        let query = format!(
            "INSERT INTO comments (id, issue_id, user_id, content, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $5) RETURNING {}",
            select_clause::<Comment>()
        );
        let id = Uuid::new_v4();
        let comment = sqlx::query_as::<_, Comment>(&query)
            .bind(id)
            .bind(input.issue_id)
            .bind(author)
            .bind(&input.content)
            .bind(self.clock.now())
            .fetch_one(&self.pool)
            .await
            .context("insert", "comments", Some(id))?;
        Ok(comment)
    }

    pub async fn update(&self, actor: Uuid, id: Uuid, changes: CommentChanges) -> Result<Comment, ApiError> {
        let existing = self.repository().select_404(id).await?;
        ownership::COMMENT_UPDATE.enforce(actor, existing.user_id, "You can only update your own comments")?;

        let query = format!(
            "UPDATE comments SET content = $2, updated_at = $3 WHERE id = $1 RETURNING {}",
            select_clause::<Comment>()
        );
        sqlx::query_as::<_, Comment>(&query)
            .bind(id)
            .bind(&changes.content)
            .bind(self.clock.now())
            .fetch_optional(&self.pool)
            .await
            .context("update", "comments", Some(id))?
            .ok_or_else(|| ApiError::not_found("Comment not found"))
    }

    pub async fn delete(&self, actor: Uuid, id: Uuid) -> Result<(), ApiError> {
        let existing = self.repository().select_404(id).await?;
        ownership::COMMENT_DELETE.enforce(actor, existing.user_id, "You can only delete your own comments")?;
        Ok(self.repository().delete_404(id).await?)
    }
}
