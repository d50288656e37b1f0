// handlers/public/auth.rs - POST /api/v1/auth/{register,login}

use axum::{extract::{rejection::JsonRejection, State}, Json};
use serde::{Deserialize, Serialize};

use crate::database::models::User;
use crate::handlers::utils::{require_non_empty, validate_email_format};
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::user_service::{LoginResponse, NewUser, UserService};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user: User,
}

/**
 * POST /api/v1/auth/register - Create an account
 *
 * Expected Input:
 * ```json
 * { "email": "dev@example.com", "password": "...", "first_name": "Ada", "last_name": "Lovelace" }
 * ```
 *
 * Any `role` in the body is ignored: the very first account becomes `admin`,
 * every later one `user`.
 */
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<NewUser>, JsonRejection>,
) -> ApiResult<RegisterResponse> {
    let Json(input) = payload?;
    validate_email_format(&input.email)?;
    require_non_empty("password", &input.password)?;
    require_non_empty("first_name", &input.first_name)?;
    require_non_empty("last_name", &input.last_name)?;

    let user = UserService::new(&state).register(input).await?;
    Ok(ApiResponse::created(RegisterResponse { user }))
}

/// POST /api/v1/auth/login - Exchange credentials for a 24h bearer token
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<LoginResponse> {
    let Json(input) = payload?;
    require_non_empty("email", &input.email)?;
    require_non_empty("password", &input.password)?;

    let response = UserService::new(&state).login(&input.email, &input.password).await?;
    Ok(ApiResponse::success(response))
}
