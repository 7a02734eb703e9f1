//! Database initialization
//!
//! Creates the database file on first run and brings the schema up
//! idempotently. Every table and index is created with IF NOT EXISTS, so
//! re-running against an existing database is safe.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Use sqlite options to create database if it doesn't exist
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // Enable foreign keys
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await?;

    // WAL allows a reader (the stats API) alongside the ingest writer
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;

    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    create_tables(&pool).await?;

    Ok(pool)
}

/// Initialize an in-memory database with the full schema
///
/// A single connection keeps the in-memory database alive and visible
/// across all calls on the pool.
pub async fn init_memory_database() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;

    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await?;

    create_tables(&pool).await?;

    Ok(pool)
}

/// Create all tables and indexes (idempotent)
pub async fn create_tables(pool: &SqlitePool) -> Result<()> {
    create_artists_table(pool).await?;
    create_albums_table(pool).await?;
    create_album_artists_table(pool).await?;
    create_tracks_table(pool).await?;
    create_track_artists_table(pool).await?;
    create_track_lyrics_table(pool).await?;
    create_audio_features_table(pool).await?;
    create_artist_album_count_year_table(pool).await?;
    create_track_likes_table(pool).await?;
    create_track_like_events_table(pool).await?;
    Ok(())
}

async fn create_artists_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS artists (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            name_key TEXT NOT NULL UNIQUE
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_albums_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS albums (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            release_date TEXT,
            release_year INTEGER,
            album_key TEXT NOT NULL UNIQUE
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_albums_release_year ON albums(release_year)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_album_artists_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS album_artists (
            album_id INTEGER NOT NULL REFERENCES albums(id),
            artist_id INTEGER NOT NULL REFERENCES artists(id),
            PRIMARY KEY (album_id, artist_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_album_artists_artist ON album_artists(artist_id)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_tracks_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tracks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            track_hash TEXT NOT NULL UNIQUE,
            title TEXT NOT NULL,
            duration_ms INTEGER,
            duration_text TEXT,
            genre TEXT,
            mood TEXT,
            explicit INTEGER NOT NULL DEFAULT 0,
            popularity INTEGER,
            album_id INTEGER REFERENCES albums(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_tracks_album ON tracks(album_id)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_track_artists_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS track_artists (
            track_id INTEGER NOT NULL REFERENCES tracks(id),
            artist_id INTEGER NOT NULL REFERENCES artists(id),
            PRIMARY KEY (track_id, artist_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_track_artists_artist ON track_artists(artist_id)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_track_lyrics_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS track_lyrics (
            track_id INTEGER PRIMARY KEY REFERENCES tracks(id),
            lyrics TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_audio_features_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS audio_features (
            track_id INTEGER PRIMARY KEY REFERENCES tracks(id),
            tempo REAL,
            loudness REAL,
            energy INTEGER,
            danceability INTEGER,
            positiveness INTEGER,
            speechiness INTEGER,
            liveness INTEGER,
            acousticness INTEGER,
            instrumentalness INTEGER,
            musical_key TEXT,
            time_signature TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_artist_album_count_year_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS artist_album_count_year (
            release_year INTEGER NOT NULL,
            artist_id INTEGER NOT NULL REFERENCES artists(id),
            album_count INTEGER NOT NULL,
            PRIMARY KEY (release_year, artist_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Serves the year-filtered stats listing in its output order
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_year_stats_order \
         ON artist_album_count_year(release_year, album_count DESC, artist_id)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_track_likes_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS track_likes (
            track_id INTEGER PRIMARY KEY REFERENCES tracks(id),
            like_count INTEGER NOT NULL DEFAULT 0
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_track_like_events_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS track_like_events (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            track_id INTEGER NOT NULL REFERENCES tracks(id),
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // The top-N listing scans by event time
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_track_like_events_created \
         ON track_like_events(created_at)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_database_has_all_tables() {
        let pool = init_memory_database().await.unwrap();

        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )
        .fetch_all(&pool)
        .await
        .unwrap();

        assert_eq!(
            tables,
            vec![
                "album_artists",
                "albums",
                "artist_album_count_year",
                "artists",
                "audio_features",
                "track_artists",
                "track_like_events",
                "track_likes",
                "track_lyrics",
                "tracks",
            ]
        );
    }

    #[tokio::test]
    async fn create_tables_is_idempotent() {
        let pool = init_memory_database().await.unwrap();
        create_tables(&pool).await.unwrap();
        create_tables(&pool).await.unwrap();
    }

    #[tokio::test]
    async fn init_database_creates_file_and_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("nested").join("melodex.db");

        let pool = init_database(&db_path).await.unwrap();
        assert!(db_path.exists());

        sqlx::query("INSERT INTO artists (name, name_key) VALUES ('IU', 'iu')")
            .execute(&pool)
            .await
            .unwrap();
        pool.close().await;
    }
}
