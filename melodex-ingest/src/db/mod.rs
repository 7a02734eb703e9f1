//! Per-table persistence modules and the shared chunking helper
//!
//! Every write operation takes `&mut SqliteConnection` so it composes
//! inside the orchestrator's transaction.

pub mod album_artists;
pub mod albums;
pub mod artists;
pub mod audio_features;
pub mod lyrics;
pub mod track_artists;
pub mod tracks;
pub mod year_stats;

use std::collections::{HashMap, HashSet};

use futures::future::BoxFuture;
use melodex_common::Result;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

/// Apply `apply` over `items` in contiguous chunks of at most
/// `chunk_size`, strictly in order, summing affected-row counts
///
/// Chunk N+1 is not started before chunk N's result is known. Empty input
/// returns 0 without invoking `apply` at all.
pub async fn chunked_sum<T, S, F>(
    state: &mut S,
    items: &[T],
    chunk_size: usize,
    mut apply: F,
) -> Result<u64>
where
    F: for<'a> FnMut(&'a mut S, &'a [T]) -> BoxFuture<'a, Result<u64>>,
{
    let mut total = 0u64;
    for chunk in items.chunks(chunk_size) {
        total += apply(state, chunk).await?;
    }
    Ok(total)
}

/// Fetch a key -> id map for the given keys
///
/// `select_prefix` must select (key, id) and end with an open IN list,
/// e.g. `"SELECT name_key, id FROM artists WHERE name_key IN ("`.
/// Duplicate keys in the input are queried once.
pub(crate) async fn fetch_id_map(
    conn: &mut SqliteConnection,
    select_prefix: &str,
    keys: &[String],
) -> Result<HashMap<String, i64>> {
    let mut seen = HashSet::new();
    let unique: Vec<&str> = keys
        .iter()
        .map(String::as_str)
        .filter(|k| seen.insert(*k))
        .collect();
    if unique.is_empty() {
        return Ok(HashMap::new());
    }

    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(select_prefix);
    let mut separated = builder.separated(", ");
    for key in unique {
        separated.push_bind(key);
    }
    separated.push_unseparated(")");

    let rows: Vec<(String, i64)> = builder.build_query_as().fetch_all(conn).await?;
    Ok(rows.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn splits_801_rows_into_two_calls() {
        let items: Vec<u32> = (0..801).collect();
        let mut chunk_sizes: Vec<usize> = Vec::new();

        let total = chunked_sum(&mut chunk_sizes, &items, 800, |sizes, chunk| {
            sizes.push(chunk.len());
            let n = chunk.len() as u64;
            Box::pin(async move { Ok(n) })
        })
        .await
        .unwrap();

        assert_eq!(chunk_sizes, vec![800, 1]);
        assert_eq!(total, 801);
    }

    #[tokio::test]
    async fn empty_input_returns_zero_without_calls() {
        let items: Vec<u32> = Vec::new();
        let mut calls = 0usize;

        let total = chunked_sum(&mut calls, &items, 100, |calls, _chunk| {
            *calls += 1;
            Box::pin(async { Ok(0) })
        })
        .await
        .unwrap();

        assert_eq!(calls, 0);
        assert_eq!(total, 0);
    }

    #[tokio::test]
    async fn chunks_run_in_input_order() {
        let items: Vec<u32> = (0..10).collect();
        let mut first_elements: Vec<u32> = Vec::new();

        chunked_sum(&mut first_elements, &items, 3, |firsts, chunk| {
            firsts.push(chunk[0]);
            Box::pin(async { Ok(0) })
        })
        .await
        .unwrap();

        assert_eq!(first_elements, vec![0, 3, 6, 9]);
    }

    #[tokio::test]
    async fn error_stops_at_failing_chunk() {
        let items: Vec<u32> = (0..6).collect();
        let mut calls = 0usize;

        let result = chunked_sum(&mut calls, &items, 2, |calls, _chunk| {
            *calls += 1;
            let fail = *calls == 2;
            Box::pin(async move {
                if fail {
                    Err(melodex_common::Error::Config("boom".to_string()))
                } else {
                    Ok(1)
                }
            })
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls, 2);
    }
}
