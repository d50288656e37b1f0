use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::auth::{PasswordHasher, Role, TokenService};
use crate::clock::Clock;
use crate::database::models::User;
use crate::database::repository::select_clause;
use crate::database::{DatabaseError, QueryContext, Repository};
use crate::error::ApiError;
use crate::filter::{Filter, FilterSet, Page, PageRequest};
use crate::state::AppState;

/// Advisory lock serializing registrations so only one identity can be first
pub const REGISTRATION_LOCK_KEY: i64 = 0x7472_6163_6b62_7567;

#[derive(Debug, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Deserialize)]
pub struct ProfileChanges {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: User,
}

/// Identity lifecycle: registration, login, profile and role changes
pub struct UserService {
    pool: PgPool,
    passwords: Arc<PasswordHasher>,
    tokens: Arc<TokenService>,
    clock: Arc<dyn Clock>,
}

impl UserService {
    pub fn new(state: &AppState) -> Self {
        Self {
            pool: state.pool.clone(),
            passwords: state.passwords.clone(),
            tokens: state.tokens.clone(),
            clock: state.clock.clone(),
        }
    }

    /// Create an identity. The first one ever registered becomes admin; a
    /// caller can never choose its own role.
    pub async fn register(&self, input: NewUser) -> Result<User, ApiError> {
        let password_hash = self.passwords.clone().spawn_hash(input.password).await?;
        let now = self.clock.now();
        let id = Uuid::new_v4();

        let mut tx = self.pool.begin().await.context("begin register", "users", Some(id))?;
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(REGISTRATION_LOCK_KEY)
            .execute(&mut *tx)
            .await
            .context("lock register", "users", Some(id))?;

        let has_users: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users)")
            .fetch_one(&mut *tx)
            .await
            .context("count", "users", Some(id))?;
        let role = if has_users { Role::User } else { Role::Admin };

        let query = format!(
            "INSERT INTO users (id, email, password_hash, first_name, last_name, role, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $7) RETURNING {}",
            select_clause::<User>()
        );
        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(input.email.trim())
            .bind(&password_hash)
            .bind(input.first_name.trim())
            .bind(input.last_name.trim())
            .bind(role.as_str())
            .bind(now)
            .fetch_one(&mut *tx)
            .await
            .context("insert", "users", Some(id))
            .map_err(email_conflict)?;

        tx.commit().await.context("commit register", "users", Some(id))?;

        info!("Registered user {} with role {}", user.id, user.role);
        Ok(user)
    }

    /// Unknown email and wrong password are indistinguishable to the caller
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let query = format!("SELECT {} FROM users WHERE email = $1", select_clause::<User>());
        let user = sqlx::query_as::<_, User>(&query)
            .bind(email.trim())
            .fetch_optional(&self.pool)
            .await
            .context("select by email", "users", None)?;

        let user = match user {
            Some(user) => user,
            None => {
                self.passwords.clone().spawn_verify_dummy(password.to_string()).await;
                tracing::debug!("Login failed: unknown email");
                return Err(ApiError::unauthorized("Invalid credentials"));
            }
        };

        let matched = self
            .passwords
            .clone()
            .spawn_verify(password.to_string(), user.password_hash.clone())
            .await;
        if !matched {
            tracing::debug!("Login failed: wrong password for user {}", user.id);
            return Err(ApiError::unauthorized("Invalid credentials"));
        }

        let issued = self.tokens.issue(user.id)?;
        Ok(LoginResponse {
            token: issued.token,
            expires_at: issued.expires_at,
            user,
        })
    }

    pub async fn profile(&self, user_id: Uuid) -> Result<User, ApiError> {
        Ok(Repository::<User>::new(self.pool.clone()).select_404(user_id).await?)
    }

    pub async fn update_profile(&self, user_id: Uuid, changes: ProfileChanges) -> Result<User, ApiError> {
        let query = format!(
            "UPDATE users SET first_name = $2, last_name = $3, email = $4, updated_at = $5 \
             WHERE id = $1 RETURNING {}",
            select_clause::<User>()
        );
        sqlx::query_as::<_, User>(&query)
            .bind(user_id)
            .bind(changes.first_name.trim())
            .bind(changes.last_name.trim())
            .bind(changes.email.trim())
            .bind(self.clock.now())
            .fetch_optional(&self.pool)
            .await
            .context("update profile", "users", Some(user_id))
            .map_err(email_conflict)?
            .ok_or_else(|| ApiError::not_found("User not found"))
    }

    pub async fn set_role(&self, user_id: Uuid, role: Role) -> Result<User, ApiError> {
        let query = format!(
            "UPDATE users SET role = $2, updated_at = $3 WHERE id = $1 RETURNING {}",
            select_clause::<User>()
        );
        let user = sqlx::query_as::<_, User>(&query)
            .bind(user_id)
            .bind(role.as_str())
            .bind(self.clock.now())
            .fetch_optional(&self.pool)
            .await
            .context("update role", "users", Some(user_id))?
            .ok_or_else(|| ApiError::not_found("User not found"))?;

        info!("Changed role of user {} to {}", user.id, user.role);
        Ok(user)
    }

    pub async fn list(&self, filters: &FilterSet, page: PageRequest) -> Result<Page<User>, ApiError> {
        let filter = Filter::for_entity::<User>()?.apply(filters)?;
        Ok(Repository::<User>::new(self.pool.clone()).list(filter, page).await?)
    }
}

fn email_conflict(err: DatabaseError) -> ApiError {
    match err {
        DatabaseError::Conflict(_) => ApiError::conflict("Email already registered"),
        other => other.into(),
    }
}
