//! Credential Store operations

use sqlx::SqlitePool;
use tunebox_common::db::{User, UserId};
use tunebox_common::{Error, Result};

/// Insert a user row
///
/// A UNIQUE violation on `username` (pre-existing row or a concurrent insert
/// that won the race) is reported as `Error::Conflict`.
pub async fn insert_user(pool: &SqlitePool, username: &str, password_hash: &str) -> Result<UserId> {
    let result = sqlx::query("INSERT INTO users (username, password_hash) VALUES (?, ?)")
        .bind(username)
        .bind(password_hash)
        .execute(pool)
        .await
        .map_err(Error::from);

    match result {
        Ok(done) => Ok(done.last_insert_rowid()),
        Err(e) if e.is_unique_violation() => {
            Err(Error::Conflict(format!("username already exists: {}", username)))
        }
        Err(e) => Err(e),
    }
}

/// Load user by username
pub async fn load_user_by_username(pool: &SqlitePool, username: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, username, password_hash FROM users WHERE username = ?",
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

/// Load username by user id
pub async fn load_username(pool: &SqlitePool, user_id: UserId) -> Result<Option<String>> {
    let username = sqlx::query_scalar::<_, String>("SELECT username FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

    Ok(username)
}
