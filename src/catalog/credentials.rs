//! Account registration and login.
//!
//! # Responsibilities
//! - Hash passwords with Argon2id before they reach storage
//! - Check a login attempt against the stored hash
//!
//! # Design Decisions
//! - Hashing is CPU-bound, so it runs on the blocking pool
//! - Unknown email and wrong password produce the same error

use std::sync::Arc;

use argon2::{Algorithm, Argon2, Params, PasswordVerifier, Version};
use password_hash::{PasswordHash, PasswordHasher as _, SaltString};
use rand::rngs::OsRng;

use super::error::CatalogError;
use super::models::{NewUser, User};
use super::repository::CatalogRepository;

/// Pluggable password hashing.
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<String, CatalogError>;

    /// `Ok(false)` on mismatch; `Err` only when `hash` is malformed.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, CatalogError>;
}

/// Argon2id hasher with configurable cost.
#[derive(Debug, Clone)]
pub struct Argon2Hasher {
    /// KiB
    memory_cost: u32,
    time_cost: u32,
    parallelism: u32,
}

impl Default for Argon2Hasher {
    fn default() -> Self {
        Self {
            memory_cost: 19456,
            time_cost: 2,
            parallelism: 1,
        }
    }
}

impl Argon2Hasher {
    pub fn new(memory_cost: u32, time_cost: u32, parallelism: u32) -> Self {
        Self {
            memory_cost,
            time_cost,
            parallelism,
        }
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<String, CatalogError> {
        let salt = SaltString::generate(&mut OsRng);
        let params = Params::new(self.memory_cost, self.time_cost, self.parallelism, None)
            .map_err(|_| CatalogError::PasswordHash)?;

        Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|_| CatalogError::PasswordHash)
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, CatalogError> {
        let parsed = PasswordHash::new(hash).map_err(|_| CatalogError::PasswordHash)?;
        // Cost parameters come from the PHC string.
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}

/// Registration and login on top of a repository.
#[derive(Clone)]
pub struct Credentials {
    repo: Arc<dyn CatalogRepository>,
    hasher: Arc<dyn PasswordHasher>,
}

impl Credentials {
    pub fn new(repo: Arc<dyn CatalogRepository>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { repo, hasher }
    }

    /// Create an account. Fails with `DuplicateEmail` when the email is taken.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<User, CatalogError> {
        if self.repo.find_user_by_email(email).await?.is_some() {
            return Err(CatalogError::DuplicateEmail);
        }

        let hasher = Arc::clone(&self.hasher);
        let password = password.to_string();
        let password_hash = tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|_| CatalogError::PasswordHash)??;

        let user = self
            .repo
            .create_user(NewUser {
                username: username.to_string(),
                email: email.to_string(),
                password_hash,
            })
            .await?;
        tracing::info!(user_id = user.id, "Account created");
        Ok(user)
    }

    /// Check an email/password pair.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, CatalogError> {
        let Some(user) = self.repo.find_user_by_email(email).await? else {
            tracing::debug!("Login for unknown email");
            return Err(CatalogError::InvalidCredentials);
        };

        let hasher = Arc::clone(&self.hasher);
        let password = password.to_string();
        let hash = user.password_hash.clone();
        let matches = tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|_| CatalogError::PasswordHash)??;

        if !matches {
            tracing::debug!(user_id = user.id, "Login with wrong password");
            return Err(CatalogError::InvalidCredentials);
        }
        Ok(user)
    }
}
