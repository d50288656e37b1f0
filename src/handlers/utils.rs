use serde::Deserialize;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::error::ApiError;
use crate::filter::PageRequest;

/// Pagination knobs shared by every collection endpoint.
/// Kept as raw strings so bad values fall back to defaults instead of rejecting.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub limit: Option<String>,
    pub offset: Option<String>,
}

impl PageParams {
    pub fn page(&self, config: &AppConfig) -> PageRequest {
        PageRequest::from_params(self.limit.as_deref(), self.offset.as_deref(), config.filter.max_limit)
    }
}

/// Parse a path or body id, blaming `field` on failure
pub fn parse_id(field: &str, raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::invalid_field(field, "Invalid UUID format"))
}

pub fn require_non_empty(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::invalid_field(field, format!("{} is required", field)));
    }
    Ok(())
}

/// Basic email shape check for registration and profile updates
pub fn validate_email_format(email: &str) -> Result<(), ApiError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(ApiError::invalid_field("email", "email is required"));
    }

    let mut parts = email.split('@');
    let (local, domain) = match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => (local, domain),
        _ => return Err(ApiError::invalid_field("email", "Invalid email format")),
    };

    if local.is_empty()
        || domain.is_empty()
        || !domain.contains('.')
        || domain.starts_with('.')
        || domain.ends_with('.')
        || email.chars().any(char::is_whitespace)
    {
        return Err(ApiError::invalid_field("email", "Invalid email format"));
    }
    Ok(())
}
