//! Artist persistence

use std::collections::HashMap;

use melodex_common::Result;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use super::{chunked_sum, fetch_id_map};
use crate::extract::ArtistSeed;

/// Rows per INSERT statement
const CHUNK: usize = 500;

/// Idempotent insert by name_key; existing artists are left untouched
pub async fn insert_ignore(conn: &mut SqliteConnection, seeds: &[ArtistSeed]) -> Result<u64> {
    chunked_sum(conn, seeds, CHUNK, |conn, chunk| {
        Box::pin(insert_chunk(conn, chunk))
    })
    .await
}

async fn insert_chunk(conn: &mut SqliteConnection, seeds: &[ArtistSeed]) -> Result<u64> {
    let mut builder: QueryBuilder<Sqlite> =
        QueryBuilder::new("INSERT INTO artists (name, name_key) ");
    builder.push_values(seeds, |mut b, seed| {
        b.push_bind(&seed.display_name).push_bind(&seed.key);
    });
    builder.push(" ON CONFLICT(name_key) DO NOTHING");

    let result = builder.build().execute(conn).await?;
    Ok(result.rows_affected())
}

/// Fetch name_key -> id for the given keys
pub async fn ids_by_key(
    conn: &mut SqliteConnection,
    keys: &[String],
) -> Result<HashMap<String, i64>> {
    fetch_id_map(
        conn,
        "SELECT name_key, id FROM artists WHERE name_key IN (",
        keys,
    )
    .await
}
