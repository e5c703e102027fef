//! Catalog Store operations

use sqlx::SqlitePool;
use tunebox_common::db::{Song, SongId};
use tunebox_common::Result;

/// Fields of a song row before the store assigns its id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSong {
    pub title: String,
    pub author: String,
    pub duration: i64,
    pub file_reference: String,
}

/// Insert a song row and return its store-assigned id
pub async fn insert_song(pool: &SqlitePool, song: &NewSong) -> Result<SongId> {
    let done = sqlx::query(
        r#"
        INSERT INTO songs (title, author, duration, file_reference)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(&song.title)
    .bind(&song.author)
    .bind(song.duration)
    .bind(&song.file_reference)
    .execute(pool)
    .await?;

    Ok(done.last_insert_rowid())
}

/// Load song by id
pub async fn load_song(pool: &SqlitePool, song_id: SongId) -> Result<Option<Song>> {
    let song = sqlx::query_as::<_, Song>(
        "SELECT id, title, author, duration, file_reference FROM songs WHERE id = ?",
    )
    .bind(song_id)
    .fetch_optional(pool)
    .await?;

    Ok(song)
}

/// Load every song in insertion order
pub async fn load_all_songs(pool: &SqlitePool) -> Result<Vec<Song>> {
    let songs = sqlx::query_as::<_, Song>(
        "SELECT id, title, author, duration, file_reference FROM songs ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    Ok(songs)
}

/// Delete song by id; returns false when no row matched
pub async fn delete_song(pool: &SqlitePool, song_id: SongId) -> Result<bool> {
    let done = sqlx::query("DELETE FROM songs WHERE id = ?")
        .bind(song_id)
        .execute(pool)
        .await?;

    Ok(done.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::test_pool;

    fn new_song(title: &str, file: &str) -> NewSong {
        NewSong {
            title: title.to_string(),
            author: "Author".to_string(),
            duration: 200,
            file_reference: file.to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_distinct_ids() {
        let (pool, _dir) = test_pool().await;

        let a = insert_song(&pool, &new_song("A", "a.mp3")).await.unwrap();
        let b = insert_song(&pool, &new_song("B", "b.mp3")).await.unwrap();

        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_load_all_in_insertion_order() {
        let (pool, _dir) = test_pool().await;

        for title in ["first", "second", "third"] {
            insert_song(&pool, &new_song(title, "x.mp3")).await.unwrap();
        }

        let titles: Vec<String> = load_all_songs(&pool)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.title)
            .collect();
        assert_eq!(titles, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_delete_reports_missing_row() {
        let (pool, _dir) = test_pool().await;

        let id = insert_song(&pool, &new_song("A", "a.mp3")).await.unwrap();

        assert!(delete_song(&pool, id).await.unwrap());
        assert!(!delete_song(&pool, id).await.unwrap());
        assert!(load_song(&pool, id).await.unwrap().is_none());
    }
}
