// handlers/protected/comments.rs - /api/v1/comments

use axum::{
    extract::{rejection::JsonRejection, Extension, Path, Query, State},
    Json,
};

use crate::database::models::Comment;
use crate::filter::Page;
use crate::handlers::utils::{parse_id, require_non_empty, PageParams};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::comment_service::{CommentChanges, CommentService, NewComment};
use crate::state::AppState;

/// GET /api/v1/comments/issue/:issue_id - Oldest first
pub async fn list_for_issue(
    State(state): State<AppState>,
    Path(issue_id): Path<String>,
    Query(params): Query<PageParams>,
) -> ApiResult<Page<Comment>> {
    let issue_id = parse_id("issue_id", &issue_id)?;
    let comments = CommentService::new(&state).list(issue_id, params.page(&state.config)).await?;
    Ok(ApiResponse::success(comments))
}

/// POST /api/v1/comments
pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    payload: Result<Json<NewComment>, JsonRejection>,
) -> ApiResult<Comment> {
    let Json(input) = payload?;
    require_non_empty("content", &input.content)?;
    let comment = CommentService::new(&state).create(auth.user_id, input).await?;
    Ok(ApiResponse::created(comment))
}

/// PUT /api/v1/comments/:id - Author only
pub async fn update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    payload: Result<Json<CommentChanges>, JsonRejection>,
) -> ApiResult<Comment> {
    let id = parse_id("id", &id)?;
    let Json(changes) = payload?;
    require_non_empty("content", &changes.content)?;
    let comment = CommentService::new(&state).update(auth.user_id, id, changes).await?;
    Ok(ApiResponse::success(comment))
}

/// DELETE /api/v1/comments/:id - Author only
pub async fn delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let id = parse_id("id", &id)?;
    CommentService::new(&state).delete(auth.user_id, id).await?;
    Ok(ApiResponse::no_content())
}
