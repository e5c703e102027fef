//! Tests for database initialization
//!
//! Covers automatic creation, reopening an existing file, and the
//! constraints the two relations enforce natively.

use tempfile::TempDir;
use tunebox_common::db::init::init_database;

#[tokio::test]
async fn test_database_creation_when_missing() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("nested").join("tunebox.db");

    let result = init_database(&db_path).await;

    assert!(result.is_ok(), "Database initialization failed: {:?}", result.err());
    assert!(db_path.exists(), "Database file was not created");
}

#[tokio::test]
async fn test_database_path_with_url_characters() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("music?mode=ro %20 #1");
    let db_path = root.join("tunebox.db");

    let pool = init_database(&db_path).await.expect("odd root folder name");
    pool.close().await;

    assert!(db_path.exists(), "Database file was not created at the literal path");
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[tokio::test]
async fn test_database_opens_existing() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("tunebox.db");

    let pool1 = init_database(&db_path).await.expect("first open");
    sqlx::query("INSERT INTO songs (title, author, duration, file_reference) VALUES ('T', 'A', 1, 'a.mp3')")
        .execute(&pool1)
        .await
        .unwrap();
    pool1.close().await;

    // Second open must keep existing rows (CREATE TABLE IF NOT EXISTS)
    let pool2 = init_database(&db_path).await.expect("second open");
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM songs")
        .fetch_one(&pool2)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_users_username_is_unique() {
    let dir = TempDir::new().unwrap();
    let pool = init_database(&dir.path().join("tunebox.db")).await.unwrap();

    sqlx::query("INSERT INTO users (username, password_hash) VALUES ('alice', 'h1')")
        .execute(&pool)
        .await
        .unwrap();
    let err = sqlx::query("INSERT INTO users (username, password_hash) VALUES ('alice', 'h2')")
        .execute(&pool)
        .await
        .unwrap_err();

    let err = tunebox_common::Error::from(err);
    assert!(err.is_unique_violation(), "expected unique violation, got {err}");
}

#[tokio::test]
async fn test_songs_reject_negative_duration() {
    let dir = TempDir::new().unwrap();
    let pool = init_database(&dir.path().join("tunebox.db")).await.unwrap();

    let result = sqlx::query("INSERT INTO songs (title, author, duration, file_reference) VALUES ('T', 'A', -1, 'a.mp3')")
        .execute(&pool)
        .await;

    assert!(result.is_err(), "negative duration must be rejected by the store");
}
