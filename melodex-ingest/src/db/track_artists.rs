//! Track-artist join persistence

use melodex_common::Result;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use super::chunked_sum;

/// One (track, artist) credit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackArtistRow {
    pub track_id: i64,
    pub artist_id: i64,
}

/// Rows per INSERT statement
const CHUNK: usize = 800;

/// Idempotent insert; existing pairs are absorbed silently
pub async fn insert_ignore(conn: &mut SqliteConnection, rows: &[TrackArtistRow]) -> Result<u64> {
    chunked_sum(conn, rows, CHUNK, |conn, chunk| {
        Box::pin(insert_chunk(conn, chunk))
    })
    .await
}

async fn insert_chunk(conn: &mut SqliteConnection, rows: &[TrackArtistRow]) -> Result<u64> {
    let mut builder: QueryBuilder<Sqlite> =
        QueryBuilder::new("INSERT INTO track_artists (track_id, artist_id) ");
    builder.push_values(rows, |mut b, row| {
        b.push_bind(row.track_id).push_bind(row.artist_id);
    });
    builder.push(" ON CONFLICT(track_id, artist_id) DO NOTHING");

    let result = builder.build().execute(conn).await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use melodex_common::db::init_memory_database;

    #[tokio::test]
    async fn reinsert_does_not_duplicate_credits() {
        let pool = init_memory_database().await.unwrap();
        let mut conn = pool.acquire().await.unwrap();

        sqlx::query("INSERT INTO artists (name, name_key) VALUES ('IU', 'iu')")
            .execute(&mut *conn)
            .await
            .unwrap();
        sqlx::query("INSERT INTO tracks (track_hash, title) VALUES ('h1', 'S1')")
            .execute(&mut *conn)
            .await
            .unwrap();

        let row = TrackArtistRow {
            track_id: 1,
            artist_id: 1,
        };
        assert_eq!(insert_ignore(&mut conn, &[row]).await.unwrap(), 1);
        assert_eq!(insert_ignore(&mut conn, &[row]).await.unwrap(), 0);

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM track_artists")
            .fetch_one(&mut *conn)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }
}
