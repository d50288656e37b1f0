// handlers/protected/issues.rs - /api/v1/issues

use axum::{
    extract::{rejection::JsonRejection, Extension, Path, Query, State},
    Json,
};

use crate::database::models::Issue;
use crate::filter::{Page, PageRequest};
use crate::handlers::utils::{parse_id, require_non_empty};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::issue_service::{IssueChanges, IssueQuery, IssueService, NewIssue};
use crate::state::AppState;

/**
 * GET /api/v1/issues - Filtered, paginated issue listing
 *
 * Query parameters:
 * - `project_id`: list that project's issues; without it, issues the caller created
 * - `status`, `priority`, `assigned_to`: exact match
 * - `search`: case-insensitive substring of title or description
 * - `limit` (default 10), `offset` (default 0)
 */
pub async fn list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<IssueQuery>,
) -> ApiResult<Page<Issue>> {
    let page = PageRequest::from_params(
        query.limit.as_deref(),
        query.offset.as_deref(),
        state.config.filter.max_limit,
    );
    let issues = IssueService::new(&state).list(auth.user_id, query, page).await?;
    Ok(ApiResponse::success(issues))
}

/// POST /api/v1/issues - Status and priority default to `open` / `medium`
pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    payload: Result<Json<NewIssue>, JsonRejection>,
) -> ApiResult<Issue> {
    let Json(input) = payload?;
    require_non_empty("title", &input.title)?;
    let issue = IssueService::new(&state).create(auth.user_id, input).await?;
    Ok(ApiResponse::created(issue))
}

/// GET /api/v1/issues/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Issue> {
    let id = parse_id("id", &id)?;
    Ok(ApiResponse::success(IssueService::new(&state).get(id).await?))
}

/// PUT /api/v1/issues/:id - Partial update; `"assigned_to": null` unassigns
pub async fn update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    payload: Result<Json<IssueChanges>, JsonRejection>,
) -> ApiResult<Issue> {
    let id = parse_id("id", &id)?;
    let Json(changes) = payload?;
    if let Some(title) = &changes.title {
        require_non_empty("title", title)?;
    }
    let issue = IssueService::new(&state).update(auth.user_id, id, changes).await?;
    Ok(ApiResponse::success(issue))
}

/// DELETE /api/v1/issues/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let id = parse_id("id", &id)?;
    IssueService::new(&state).delete(auth.user_id, id).await?;
    Ok(ApiResponse::no_content())
}
