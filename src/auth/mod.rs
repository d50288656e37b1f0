pub mod ownership;
pub mod password;
pub mod role;
pub mod token;

use thiserror::Error;

pub use ownership::Ownership;
pub use password::{HashingParams, PasswordHasher};
pub use role::Role;
pub use token::{Claims, IssuedToken, TokenService};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("JWT secret is not configured")]
    MissingSecret,

    #[error("Invalid token")]
    InvalidToken,

    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Password hashing failed: {0}")]
    Hashing(String),
}
