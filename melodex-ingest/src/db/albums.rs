//! Album persistence

use std::collections::HashMap;

use melodex_common::Result;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use super::{chunked_sum, fetch_id_map};
use crate::extract::AlbumSeed;
use crate::normalize::release_year;

/// Rows per INSERT statement
const CHUNK: usize = 400;

/// Idempotent insert by album_key; existing albums are left untouched
pub async fn insert_ignore(conn: &mut SqliteConnection, seeds: &[AlbumSeed]) -> Result<u64> {
    chunked_sum(conn, seeds, CHUNK, |conn, chunk| {
        Box::pin(insert_chunk(conn, chunk))
    })
    .await
}

async fn insert_chunk(conn: &mut SqliteConnection, seeds: &[AlbumSeed]) -> Result<u64> {
    let mut builder: QueryBuilder<Sqlite> =
        QueryBuilder::new("INSERT INTO albums (name, release_date, release_year, album_key) ");
    builder.push_values(seeds, |mut b, seed| {
        b.push_bind(&seed.name)
            .push_bind(seed.release_date)
            .push_bind(release_year(seed.release_date))
            .push_bind(&seed.key);
    });
    builder.push(" ON CONFLICT(album_key) DO NOTHING");

    let result = builder.build().execute(conn).await?;
    Ok(result.rows_affected())
}

/// Fetch album_key -> id for the given keys
pub async fn ids_by_key(
    conn: &mut SqliteConnection,
    keys: &[String],
) -> Result<HashMap<String, i64>> {
    fetch_id_map(
        conn,
        "SELECT album_key, id FROM albums WHERE album_key IN (",
        keys,
    )
    .await
}
