use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::auth::TokenService;
use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated identity injected into request extensions
#[derive(Clone, Copy, Debug)]
pub struct AuthUser {
    pub user_id: Uuid,
}

/// Resolve a raw `Authorization` header value to the subject it proves.
///
/// The `Bearer ` prefix is matched case-sensitively and must be followed by a
/// non-empty token; anything else is rejected before any signature check.
pub fn authenticate(raw_header: Option<&str>, tokens: &TokenService) -> Result<Uuid, ApiError> {
    let raw = raw_header.ok_or_else(|| ApiError::unauthorized("Missing Authorization header"))?;

    let token = raw
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::unauthorized("Authorization header must use Bearer token format"))?;

    if token.trim().is_empty() {
        return Err(ApiError::unauthorized("Empty bearer token"));
    }

    Ok(tokens.verify(token)?)
}

/// Rejects the request with 401 unless it carries a valid bearer token
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let raw = match request.headers().get(AUTHORIZATION) {
        Some(value) => Some(
            value
                .to_str()
                .map_err(|_| ApiError::unauthorized("Invalid Authorization header format"))?,
        ),
        None => None,
    };

    let user_id = authenticate(raw, &state.tokens).map_err(|err| {
        tracing::debug!("Authentication failed: {}", err);
        err
    })?;

    request.extensions_mut().insert(AuthUser { user_id });
    Ok(next.run(request).await)
}
