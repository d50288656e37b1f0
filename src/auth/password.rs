//! Password credential store
//!
//! Argon2id with a fixed work factor. Hashes are stored as PHC strings, so
//! each stored hash carries its own salt and parameters.

use argon2::{
    password_hash::{
        rand_core::OsRng,
        PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString,
    },
    Algorithm, Argon2, Params, Version,
};
use std::sync::Arc;
use tokio::task;
use tracing::{debug, warn};

use super::AuthError;

/// Argon2id work factor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashingParams {
    /// Memory cost in KiB
    pub memory_kib: u32,
    /// Number of passes
    pub iterations: u32,
    /// Lanes
    pub parallelism: u32,
}

impl Default for HashingParams {
    /// m = 19 MiB, t = 2, p = 1 (OWASP minimum for Argon2id)
    fn default() -> Self {
        Self {
            memory_kib: 19_456,
            iterations: 2,
            parallelism: 1,
        }
    }
}

impl HashingParams {
    /// Cheap parameters so test suites stay fast. Never use in production.
    pub fn testing() -> Self {
        Self {
            memory_kib: 1_024,
            iterations: 1,
            parallelism: 1,
        }
    }
}

pub struct PasswordHasher {
    argon2: Argon2<'static>,
    decoy_hash: String,
}

impl std::fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHasher").finish_non_exhaustive()
    }
}

impl PasswordHasher {
    pub fn new(params: HashingParams) -> Result<Self, AuthError> {
        let params = Params::new(params.memory_kib, params.iterations, params.parallelism, None)
            .map_err(|e| AuthError::Hashing(e.to_string()))?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let mut hasher = Self {
            argon2,
            decoy_hash: String::new(),
        };
        hasher.decoy_hash = hasher.hash("decoy-credential-for-unknown-accounts")?;
        Ok(hasher)
    }

    /// Hash a plaintext password into a PHC string
    pub fn hash(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::Hashing(e.to_string()))?;
        Ok(hash.to_string())
    }

    /// Check a plaintext password against a stored hash.
    ///
    /// Never fails: a malformed stored hash is treated as a mismatch.
    pub fn verify(&self, password: &str, stored: &str) -> bool {
        let parsed = match PasswordHash::new(stored) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("Stored password hash is malformed: {}", e);
                return false;
            }
        };

        match self.argon2.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => true,
            Err(argon2::password_hash::Error::Password) => {
                debug!("Password verification failed: mismatch");
                false
            }
            Err(e) => {
                warn!("Password verification error: {}", e);
                false
            }
        }
    }

    /// Spend the same effort as a real verification, for accounts that do not exist
    pub fn verify_dummy(&self, password: &str) {
        let _ = self.verify(password, &self.decoy_hash);
    }

    /// `hash` on the blocking pool so request workers keep running
    pub async fn spawn_hash(self: Arc<Self>, password: String) -> Result<String, AuthError> {
        task::spawn_blocking(move || self.hash(&password))
            .await
            .map_err(|e| AuthError::Hashing(e.to_string()))?
    }

    /// `verify` on the blocking pool. A failed task counts as a mismatch.
    pub async fn spawn_verify(self: Arc<Self>, password: String, stored: String) -> bool {
        match task::spawn_blocking(move || self.verify(&password, &stored)).await {
            Ok(matched) => matched,
            Err(e) => {
                warn!("Password verification task failed: {}", e);
                false
            }
        }
    }

    /// `verify_dummy` on the blocking pool
    pub async fn spawn_verify_dummy(self: Arc<Self>, password: String) {
        if let Err(e) = task::spawn_blocking(move || self.verify_dummy(&password)).await {
            warn!("Decoy verification task failed: {}", e);
        }
    }
}
