// handlers/protected/users.rs - /api/v1/users

use axum::{
    extract::{rejection::JsonRejection, Extension, Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::auth::Role;
use crate::database::models::User;
use crate::error::ApiError;
use crate::filter::{FilterSet, Page};
use crate::handlers::utils::{parse_id, require_non_empty, validate_email_format, PageParams};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::user_service::{ProfileChanges, UserService};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UserListQuery {
    pub role: Option<String>,
    pub search: Option<String>,
    #[serde(flatten)]
    pub page: PageParams,
}

#[derive(Debug, Deserialize)]
pub struct RoleChange {
    pub role: String,
}

fn parse_role(raw: &str) -> Result<Role, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::invalid_field("role", "Role must be 'admin' or 'user'"))
}

/// GET /api/v1/users - Newest first; `role` filter, `search` over email and names
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<UserListQuery>,
) -> ApiResult<Page<User>> {
    let role = match query.role.as_deref().filter(|r| !r.is_empty()) {
        Some(raw) => Some(parse_role(raw)?.as_str().to_string()),
        None => None,
    };
    let filters = FilterSet::new().equal("role", role).search(query.search);
    let users = UserService::new(&state).list(&filters, query.page.page(&state.config)).await?;
    Ok(ApiResponse::success(users))
}

/// GET /api/v1/users/profile
pub async fn profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<User> {
    Ok(ApiResponse::success(UserService::new(&state).profile(auth.user_id).await?))
}

/// PUT /api/v1/users/profile - Replace first name, last name and email
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    payload: Result<Json<ProfileChanges>, JsonRejection>,
) -> ApiResult<User> {
    let Json(changes) = payload?;
    require_non_empty("first_name", &changes.first_name)?;
    require_non_empty("last_name", &changes.last_name)?;
    validate_email_format(&changes.email)?;
    let user = UserService::new(&state).update_profile(auth.user_id, changes).await?;
    Ok(ApiResponse::success(user))
}

/// PUT /api/v1/users/:id/role - Admin only
pub async fn set_role(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<RoleChange>, JsonRejection>,
) -> ApiResult<User> {
    let id = parse_id("id", &id)?;
    let Json(change) = payload?;
    let role = parse_role(&change.role)?;
    Ok(ApiResponse::success(UserService::new(&state).set_role(id, role).await?))
}
