//! Track persistence
//!
//! Identity is the content hash of the natural key. Re-ingest refreshes
//! every mutable column but never the hash.

use std::collections::HashMap;

use melodex_common::Result;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use super::{chunked_sum, fetch_id_map};

/// One track row, index-aligned with its source record during a batch
#[derive(Debug, Clone, PartialEq)]
pub struct TrackRow {
    pub track_hash: String,
    pub title: String,
    pub duration_ms: Option<i64>,
    pub duration_text: Option<String>,
    pub genre: Option<String>,
    pub mood: Option<String>,
    pub explicit: bool,
    pub popularity: Option<i64>,
    pub album_id: Option<i64>,
}

/// Rows per INSERT statement
const CHUNK: usize = 300;

/// Upsert by track_hash, refreshing mutable attributes on conflict
pub async fn upsert(conn: &mut SqliteConnection, rows: &[TrackRow]) -> Result<u64> {
    chunked_sum(conn, rows, CHUNK, |conn, chunk| {
        Box::pin(upsert_chunk(conn, chunk))
    })
    .await
}

async fn upsert_chunk(conn: &mut SqliteConnection, rows: &[TrackRow]) -> Result<u64> {
    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
        "INSERT INTO tracks (track_hash, title, duration_ms, duration_text, \
         genre, mood, explicit, popularity, album_id) ",
    );
    builder.push_values(rows, |mut b, row| {
        b.push_bind(&row.track_hash)
            .push_bind(&row.title)
            .push_bind(row.duration_ms)
            .push_bind(&row.duration_text)
            .push_bind(&row.genre)
            .push_bind(&row.mood)
            .push_bind(row.explicit)
            .push_bind(row.popularity)
            .push_bind(row.album_id);
    });
    builder.push(
        " ON CONFLICT(track_hash) DO UPDATE SET \
         title = excluded.title, \
         duration_ms = excluded.duration_ms, \
         duration_text = excluded.duration_text, \
         genre = excluded.genre, \
         mood = excluded.mood, \
         explicit = excluded.explicit, \
         popularity = excluded.popularity, \
         album_id = excluded.album_id",
    );

    let result = builder.build().execute(conn).await?;
    Ok(result.rows_affected())
}

/// Fetch track_hash -> id for the given hashes
pub async fn ids_by_hash(
    conn: &mut SqliteConnection,
    hashes: &[String],
) -> Result<HashMap<String, i64>> {
    fetch_id_map(
        conn,
        "SELECT track_hash, id FROM tracks WHERE track_hash IN (",
        hashes,
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use melodex_common::db::init_memory_database;

    fn row(hash: &str, title: &str, popularity: Option<i64>) -> TrackRow {
        TrackRow {
            track_hash: hash.to_string(),
            title: title.to_string(),
            duration_ms: Some(227_000),
            duration_text: Some("03:47".to_string()),
            genre: Some("k-pop".to_string()),
            mood: Some("joy".to_string()),
            explicit: false,
            popularity,
            album_id: None,
        }
    }

    #[tokio::test]
    async fn upsert_refreshes_mutables_but_not_identity() {
        let pool = init_memory_database().await.unwrap();
        let mut conn = pool.acquire().await.unwrap();

        upsert(&mut conn, &[row("h1", "S1", Some(10))]).await.unwrap();
        let id_before: i64 = sqlx::query_scalar("SELECT id FROM tracks WHERE track_hash = 'h1'")
            .fetch_one(&mut *conn)
            .await
            .unwrap();

        upsert(&mut conn, &[row("h1", "s1 remaster", Some(99))])
            .await
            .unwrap();

        let (id_after, title, popularity): (i64, String, Option<i64>) =
            sqlx::query_as("SELECT id, title, popularity FROM tracks WHERE track_hash = 'h1'")
                .fetch_one(&mut *conn)
                .await
                .unwrap();
        assert_eq!(id_after, id_before);
        assert_eq!(title, "s1 remaster");
        assert_eq!(popularity, Some(99));

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tracks")
            .fetch_one(&mut *conn)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn ids_by_hash_resolves_inserted_rows() {
        let pool = init_memory_database().await.unwrap();
        let mut conn = pool.acquire().await.unwrap();

        upsert(&mut conn, &[row("h1", "S1", None), row("h2", "S2", None)])
            .await
            .unwrap();

        let ids = ids_by_hash(&mut conn, &["h1".to_string(), "h2".to_string(), "h3".to_string()])
            .await
            .unwrap();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains_key("h1"));
        assert!(ids.contains_key("h2"));
    }
}
