//! Database models

use serde::{Deserialize, Serialize};

/// Store-assigned user identity
pub type UserId = i64;

/// Store-assigned song identity
pub type SongId = i64;

/// Row of the `users` table (Credential Store)
///
/// `password_hash` is a PHC string that never leaves the server; the type is
/// not `Serialize` and its `Debug` output redacts the hash.
#[derive(Clone, sqlx::FromRow)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub password_hash: String,
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password_hash", &"<redacted>")
            .finish()
    }
}

/// Row of the `songs` table (Catalog Store)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Song {
    pub id: SongId,
    pub title: String,
    pub author: String,
    /// Length in whole seconds, never negative
    pub duration: i64,
    /// Name of the blob in the song directory
    #[serde(rename = "music_file_url")]
    pub file_reference: String,
}
