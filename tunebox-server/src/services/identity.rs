//! Identity Service
//!
//! Registers users, verifies logins and resolves user ids to usernames.
//! Stateless over the Credential Store; passwords are stored only as
//! Argon2id PHC strings with a per-user random salt.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use sqlx::SqlitePool;
use std::sync::OnceLock;
use thiserror::Error;
use tracing::{debug, info};
use tunebox_common::db::UserId;
use tunebox_common::Error as StoreError;

use crate::db::users;

/// Identity Service errors
#[derive(Debug, Error)]
pub enum IdentityError {
    /// Username taken, whether by an existing row or a concurrent insert
    #[error("Username already exists")]
    DuplicateUsername,

    /// Unknown username or wrong password; one error for both
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("User not found: {0}")]
    NotFound(UserId),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Clone)]
pub struct IdentityService {
    db: SqlitePool,
}

impl IdentityService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Create a user with a freshly salted password hash
    pub async fn register(&self, username: &str, password: &str) -> Result<UserId, IdentityError> {
        let password_hash = hash_password(password.to_owned()).await?;

        match users::insert_user(&self.db, username, &password_hash).await {
            Ok(user_id) => {
                info!(user_id, username, "Registered user");
                Ok(user_id)
            }
            Err(StoreError::Conflict(_)) => Err(IdentityError::DuplicateUsername),
            Err(e) => Err(e.into()),
        }
    }

    /// Check a username/password pair and return the user's id
    pub async fn verify(&self, username: &str, password: &str) -> Result<UserId, IdentityError> {
        let user = users::load_user_by_username(&self.db, username).await?;

        let Some(user) = user else {
            // Equal hashing cost to the known-user path
            verify_against_dummy(password.to_owned()).await;
            debug!(username, "Login attempt for unknown username");
            return Err(IdentityError::InvalidCredentials);
        };

        if verify_password(password.to_owned(), user.password_hash).await? {
            Ok(user.id)
        } else {
            Err(IdentityError::InvalidCredentials)
        }
    }

    /// Resolve a user id to its username
    pub async fn username_of(&self, user_id: UserId) -> Result<String, IdentityError> {
        users::load_username(&self.db, user_id)
            .await?
            .ok_or(IdentityError::NotFound(user_id))
    }
}

/// Derive an Argon2id PHC string for `password`
///
/// Runs on the blocking pool; Argon2 is CPU bound.
async fn hash_password(password: String) -> Result<String, StoreError> {
    tokio::task::spawn_blocking(move || hash_password_blocking(&password))
        .await
        .map_err(|e| StoreError::Internal(format!("Password hashing task failed: {}", e)))?
}

fn hash_password_blocking(password: &str) -> Result<String, StoreError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| StoreError::Internal(format!("Password hashing failed: {}", e)))
}

/// Check `password` against a stored PHC string
///
/// A mismatch is `Ok(false)`; only an unparseable stored hash is an error.
async fn verify_password(password: String, stored_hash: String) -> Result<bool, StoreError> {
    tokio::task::spawn_blocking(move || verify_password_blocking(&password, &stored_hash))
        .await
        .map_err(|e| StoreError::Internal(format!("Password verification task failed: {}", e)))?
}

/// Same cost as `verify_password`, against a fixed hash; result is ignored
async fn verify_against_dummy(password: String) {
    let _ = tokio::task::spawn_blocking(move || {
        if let Some(hash) = dummy_hash() {
            let _ = verify_password_blocking(&password, hash);
        }
    })
    .await;
}

fn verify_password_blocking(password: &str, stored_hash: &str) -> Result<bool, StoreError> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| StoreError::Internal(format!("Stored password hash is corrupt: {}", e)))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Hash used to equalize timing for unknown usernames
fn dummy_hash() -> Option<&'static str> {
    static DUMMY: OnceLock<Option<String>> = OnceLock::new();
    DUMMY
        .get_or_init(|| hash_password_blocking("tunebox-timing-equalizer").ok())
        .as_deref()
}
