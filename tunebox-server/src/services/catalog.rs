//! Catalog Service
//!
//! Persists song rows. Business validation (duration, file format) happens
//! in the upload workflow before anything reaches this layer.

use sqlx::SqlitePool;
use thiserror::Error;
use tunebox_common::db::{Song, SongId};
use tunebox_common::Error as StoreError;

use crate::db::songs::{self, NewSong};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Song not found: {0}")]
    NotFound(SongId),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Clone)]
pub struct CatalogService {
    db: SqlitePool,
}

impl CatalogService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Insert a row and return the stored record
    pub async fn add(
        &self,
        title: &str,
        author: &str,
        duration: i64,
        file_reference: &str,
    ) -> Result<Song, CatalogError> {
        let new_song = NewSong {
            title: title.to_owned(),
            author: author.to_owned(),
            duration,
            file_reference: file_reference.to_owned(),
        };
        let id = songs::insert_song(&self.db, &new_song).await?;

        Ok(Song {
            id,
            title: new_song.title,
            author: new_song.author,
            duration: new_song.duration,
            file_reference: new_song.file_reference,
        })
    }

    pub async fn get(&self, song_id: SongId) -> Result<Song, CatalogError> {
        songs::load_song(&self.db, song_id)
            .await?
            .ok_or(CatalogError::NotFound(song_id))
    }

    /// All songs, in insertion order
    pub async fn list(&self) -> Result<Vec<Song>, CatalogError> {
        Ok(songs::load_all_songs(&self.db).await?)
    }

    /// Remove the row only; the caller owns blob cleanup
    pub async fn delete(&self, song_id: SongId) -> Result<(), CatalogError> {
        if songs::delete_song(&self.db, song_id).await? {
            Ok(())
        } else {
            Err(CatalogError::NotFound(song_id))
        }
    }
}
