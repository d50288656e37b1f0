use sqlx::PgPool;
use std::sync::Arc;

use crate::auth::{AuthError, HashingParams, PasswordHasher, TokenService};
use crate::clock::Clock;
use crate::config::AppConfig;

/// Shared, immutable per-process state handed to every handler
#[derive(Clone, Debug)]
pub struct AppState {
    pub pool: PgPool,
    pub tokens: Arc<TokenService>,
    pub passwords: Arc<PasswordHasher>,
    pub clock: Arc<dyn Clock>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(
        pool: PgPool,
        config: AppConfig,
        clock: Arc<dyn Clock>,
        hashing: HashingParams,
    ) -> Result<Self, AuthError> {
        let tokens = TokenService::new(&config.security.jwt_secret, clock.clone())?;
        let passwords = PasswordHasher::new(hashing)?;
        Ok(Self {
            pool,
            tokens: Arc::new(tokens),
            passwords: Arc::new(passwords),
            clock,
            config: Arc::new(config),
        })
    }
}
