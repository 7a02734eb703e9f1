//! Derived per-year album counts
//!
//! `artist_album_count_year` is rebuilt wholesale from the committed
//! relational state, never updated incrementally.

use melodex_common::Result;
use sqlx::SqliteConnection;

/// Remove every derived row
pub async fn clear(conn: &mut SqliteConnection) -> Result<u64> {
    let result = sqlx::query("DELETE FROM artist_album_count_year")
        .execute(conn)
        .await?;
    Ok(result.rows_affected())
}

/// Repopulate from album_artists joined to albums
///
/// Albums without a release year contribute nothing; there is no
/// null-year bucket.
pub async fn rebuild_from_albums(conn: &mut SqliteConnection) -> Result<u64> {
    let result = sqlx::query(
        "INSERT INTO artist_album_count_year (release_year, artist_id, album_count) \
         SELECT al.release_year, aa.artist_id, COUNT(*) \
         FROM album_artists aa \
         JOIN albums al ON al.id = aa.album_id \
         WHERE al.release_year IS NOT NULL \
         GROUP BY al.release_year, aa.artist_id",
    )
    .execute(conn)
    .await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use melodex_common::db::init_memory_database;
    use sqlx::SqlitePool;

    async fn exec(pool: &SqlitePool, sql: &str) {
        sqlx::query(sql).execute(pool).await.unwrap();
    }

    #[tokio::test]
    async fn groups_by_year_and_artist_excluding_undated() {
        let pool = init_memory_database().await.unwrap();

        exec(&pool, "INSERT INTO artists (name, name_key) VALUES ('IU', 'iu'), ('BTS', 'bts')").await;
        exec(
            &pool,
            "INSERT INTO albums (name, release_date, release_year, album_key) VALUES \
             ('A', '2020-01-01', 2020, 'a|2020-01-01'), \
             ('B', '2020-06-01', 2020, 'b|2020-06-01'), \
             ('C', NULL, NULL, 'c|null')",
        )
        .await;
        // IU on A, B and the undated C; BTS on A only
        exec(
            &pool,
            "INSERT INTO album_artists (album_id, artist_id) VALUES (1, 1), (2, 1), (3, 1), (1, 2)",
        )
        .await;

        let mut conn = pool.acquire().await.unwrap();
        let inserted = rebuild_from_albums(&mut conn).await.unwrap();
        assert_eq!(inserted, 2);

        let rows: Vec<(i64, i64, i64)> = sqlx::query_as(
            "SELECT release_year, artist_id, album_count \
             FROM artist_album_count_year ORDER BY artist_id",
        )
        .fetch_all(&mut *conn)
        .await
        .unwrap();
        assert_eq!(rows, vec![(2020, 1, 2), (2020, 2, 1)]);
    }

    #[tokio::test]
    async fn clear_then_rebuild_replaces_stale_rows() {
        let pool = init_memory_database().await.unwrap();

        exec(&pool, "INSERT INTO artists (name, name_key) VALUES ('IU', 'iu')").await;
        exec(
            &pool,
            "INSERT INTO artist_album_count_year (release_year, artist_id, album_count) \
             VALUES (1999, 1, 42)",
        )
        .await;

        let mut conn = pool.acquire().await.unwrap();
        assert_eq!(clear(&mut conn).await.unwrap(), 1);
        assert_eq!(rebuild_from_albums(&mut conn).await.unwrap(), 0);

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM artist_album_count_year")
            .fetch_one(&mut *conn)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }
}
