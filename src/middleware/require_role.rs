use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use sqlx::PgPool;
use uuid::Uuid;

use super::auth::AuthUser;
use crate::auth::Role;
use crate::error::ApiError;
use crate::state::AppState;

/// Check the identity's current stored role against `required`.
///
/// Fails closed: a lookup error, a missing row or an unreadable role all
/// produce `Forbidden`, never an allow.
pub async fn authorize(pool: &PgPool, user_id: Uuid, required: Role) -> Result<(), ApiError> {
    let row = sqlx::query_scalar::<_, String>("SELECT role FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await;

    let stored = match row {
        Ok(Some(role)) => role,
        Ok(None) => {
            tracing::warn!("Role check failed: user {} not found", user_id);
            return Err(ApiError::forbidden("User not found"));
        }
        Err(e) => {
            tracing::error!(op = "select role", entity = "users", id = %user_id, "Storage failure: {}", e);
            return Err(ApiError::forbidden("Unable to verify permissions"));
        }
    };

    let role: Role = stored.parse().map_err(|e| {
        tracing::error!("User {} has unreadable role: {}", user_id, e);
        ApiError::forbidden("Unable to verify permissions")
    })?;

    if !role.satisfies(required) {
        tracing::warn!("Role check failed: user {} is {}, {} required", user_id, role, required);
        return Err(ApiError::forbidden(format!("{} access required", capitalize(required.as_str()))));
    }

    Ok(())
}

/// Admin-only gate. Must run inside `require_auth`.
pub async fn require_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let AuthUser { user_id } = *request
        .extensions()
        .get::<AuthUser>()
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    authorize(&state.pool, user_id, Role::Admin).await?;
    Ok(next.run(request).await)
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
