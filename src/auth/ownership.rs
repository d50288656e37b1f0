//! Who may mutate a resource once authenticated.
//!
//! Role-gated actions (project delete, role assignment) are enforced by the
//! `require_admin` middleware; everything else is listed here.

use uuid::Uuid;

use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    /// Any authenticated identity
    Open,
    /// Only the identity that authored the resource, whatever its role
    AuthorOnly,
}

pub const PROJECT_UPDATE: Ownership = Ownership::Open;
pub const ISSUE_UPDATE: Ownership = Ownership::Open;
pub const ISSUE_DELETE: Ownership = Ownership::Open;
pub const COMMENT_UPDATE: Ownership = Ownership::AuthorOnly;
pub const COMMENT_DELETE: Ownership = Ownership::AuthorOnly;

impl Ownership {
    pub fn enforce(self, actor: Uuid, author: Uuid, message: &str) -> Result<(), ApiError> {
        match self {
            Ownership::Open => Ok(()),
            Ownership::AuthorOnly if actor == author => Ok(()),
            Ownership::AuthorOnly => {
                tracing::warn!("Ownership check failed: {} is not the author ({})", actor, author);
                Err(ApiError::forbidden(message))
            }
        }
    }
}
