//! Album-artist join persistence

use melodex_common::Result;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use super::chunked_sum;

/// One (album, artist) membership
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlbumArtistRow {
    pub album_id: i64,
    pub artist_id: i64,
}

/// Rows per INSERT statement
const CHUNK: usize = 800;

/// Idempotent insert; existing pairs are absorbed silently
pub async fn insert_ignore(conn: &mut SqliteConnection, rows: &[AlbumArtistRow]) -> Result<u64> {
    chunked_sum(conn, rows, CHUNK, |conn, chunk| {
        Box::pin(insert_chunk(conn, chunk))
    })
    .await
}

async fn insert_chunk(conn: &mut SqliteConnection, rows: &[AlbumArtistRow]) -> Result<u64> {
    let mut builder: QueryBuilder<Sqlite> =
        QueryBuilder::new("INSERT INTO album_artists (album_id, artist_id) ");
    builder.push_values(rows, |mut b, row| {
        b.push_bind(row.album_id).push_bind(row.artist_id);
    });
    builder.push(" ON CONFLICT(album_id, artist_id) DO NOTHING");

    let result = builder.build().execute(conn).await?;
    Ok(result.rows_affected())
}
