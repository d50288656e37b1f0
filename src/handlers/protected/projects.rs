// handlers/protected/projects.rs - /api/v1/projects

use axum::{
    extract::{rejection::JsonRejection, Extension, Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::database::models::Project;
use crate::filter::Page;
use crate::handlers::utils::{parse_id, require_non_empty, PageParams};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::project_service::{NewProject, ProjectChanges, ProjectService};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ProjectListQuery {
    pub search: Option<String>,
    #[serde(flatten)]
    pub page: PageParams,
}

/// GET /api/v1/projects - Projects created by the caller, newest first
pub async fn list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<ProjectListQuery>,
) -> ApiResult<Page<Project>> {
    let page = query.page.page(&state.config);
    let projects = ProjectService::new(&state).list(auth.user_id, query.search, page).await?;
    Ok(ApiResponse::success(projects))
}

/// POST /api/v1/projects
pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    payload: Result<Json<NewProject>, JsonRejection>,
) -> ApiResult<Project> {
    let Json(input) = payload?;
    require_non_empty("name", &input.name)?;
    let project = ProjectService::new(&state).create(auth.user_id, input).await?;
    Ok(ApiResponse::created(project))
}

/// GET /api/v1/projects/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Project> {
    let id = parse_id("id", &id)?;
    Ok(ApiResponse::success(ProjectService::new(&state).get(id).await?))
}

/// PUT /api/v1/projects/:id - Partial update; absent fields are kept
pub async fn update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    payload: Result<Json<ProjectChanges>, JsonRejection>,
) -> ApiResult<Project> {
    let id = parse_id("id", &id)?;
    let Json(changes) = payload?;
    if let Some(name) = &changes.name {
        require_non_empty("name", name)?;
    }
    let project = ProjectService::new(&state).update(auth.user_id, id, changes).await?;
    Ok(ApiResponse::success(project))
}

/// DELETE /api/v1/projects/:id - Admin only
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    let id = parse_id("id", &id)?;
    ProjectService::new(&state).delete(id).await?;
    Ok(ApiResponse::no_content())
}
