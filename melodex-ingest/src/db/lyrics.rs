//! Track lyrics persistence
//!
//! Lyrics rows carry large text bodies, so the chunk size is the smallest
//! of the write paths.

use melodex_common::Result;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use super::chunked_sum;

/// Lyric text for one track
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LyricsRow {
    pub track_id: i64,
    pub lyrics: String,
}

/// Rows per INSERT statement
const CHUNK: usize = 200;

/// Upsert by track id, refreshing the text on conflict
pub async fn upsert(conn: &mut SqliteConnection, rows: &[LyricsRow]) -> Result<u64> {
    chunked_sum(conn, rows, CHUNK, |conn, chunk| {
        Box::pin(upsert_chunk(conn, chunk))
    })
    .await
}

async fn upsert_chunk(conn: &mut SqliteConnection, rows: &[LyricsRow]) -> Result<u64> {
    let mut builder: QueryBuilder<Sqlite> =
        QueryBuilder::new("INSERT INTO track_lyrics (track_id, lyrics) ");
    builder.push_values(rows, |mut b, row| {
        b.push_bind(row.track_id).push_bind(&row.lyrics);
    });
    builder.push(" ON CONFLICT(track_id) DO UPDATE SET lyrics = excluded.lyrics");

    let result = builder.build().execute(conn).await?;
    Ok(result.rows_affected())
}
