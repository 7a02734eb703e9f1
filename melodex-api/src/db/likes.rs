//! Like counter and like event storage
//!
//! Every like writes two rows in one transaction: an append-only event
//! carrying its timestamp, and an upsert on the per-track counter. The
//! counter answers "how many likes total" without scanning events; the
//! event log answers "which tracks gained the most likes recently".

use chrono::NaiveDateTime;
use melodex_common::Result;
use serde::Serialize;
use sqlx::SqlitePool;

/// One track with its like increment inside the queried window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TopLikeRow {
    pub track_id: i64,
    pub inc_count: i64,
    pub title: String,
    pub artist_names: Option<String>,
}

/// Whether a track row exists at all
pub async fn track_exists(db: &SqlitePool, track_id: i64) -> Result<bool> {
    let found: Option<i64> = sqlx::query_scalar("SELECT id FROM tracks WHERE id = ?1")
        .bind(track_id)
        .fetch_optional(db)
        .await?;
    Ok(found.is_some())
}

/// Record one like and return the new total for the track
pub async fn record_like(db: &SqlitePool, track_id: i64, at: NaiveDateTime) -> Result<i64> {
    let mut tx = db.begin().await?;

    sqlx::query("INSERT INTO track_like_events (track_id, created_at) VALUES (?1, ?2)")
        .bind(track_id)
        .bind(at)
        .execute(&mut *tx)
        .await?;

    let like_count: i64 = sqlx::query_scalar(
        "INSERT INTO track_likes (track_id, like_count) VALUES (?1, 1) \
         ON CONFLICT(track_id) DO UPDATE SET like_count = like_count + 1 \
         RETURNING like_count",
    )
    .bind(track_id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(like_count)
}

/// Tracks with the most like events since `since`, largest first
///
/// Ties break on track_id so the order is deterministic. Artist names are
/// concatenated alphabetically; tracks with no artist rows come back with
/// a NULL name list.
pub async fn top_increased(
    db: &SqlitePool,
    since: NaiveDateTime,
    limit: i64,
) -> Result<Vec<TopLikeRow>> {
    let rows = sqlx::query_as(
        "SELECT e.track_id, COUNT(*) AS inc_count, t.title, \
                (SELECT group_concat(ar.name, ', ' ORDER BY ar.name) \
                 FROM track_artists ta \
                 JOIN artists ar ON ar.id = ta.artist_id \
                 WHERE ta.track_id = e.track_id) AS artist_names \
         FROM track_like_events e \
         JOIN tracks t ON t.id = e.track_id \
         WHERE e.created_at >= ?1 \
         GROUP BY e.track_id, t.title \
         ORDER BY inc_count DESC, e.track_id \
         LIMIT ?2",
    )
    .bind(since)
    .bind(limit)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use melodex_common::db::init_memory_database;

    async fn exec(pool: &SqlitePool, sql: &str) {
        sqlx::query(sql).execute(pool).await.unwrap();
    }

    /// Tracks S1 (1, by IU and BTS) and S2 (2, by IU)
    async fn seeded_pool() -> SqlitePool {
        let pool = init_memory_database().await.unwrap();
        exec(
            &pool,
            "INSERT INTO artists (name, name_key) VALUES ('IU', 'iu'), ('BTS', 'bts')",
        )
        .await;
        exec(
            &pool,
            "INSERT INTO tracks (track_hash, title) VALUES ('h1', 'S1'), ('h2', 'S2')",
        )
        .await;
        exec(
            &pool,
            "INSERT INTO track_artists (track_id, artist_id) VALUES (1, 1), (1, 2), (2, 1)",
        )
        .await;
        pool
    }

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 8, 30)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    #[tokio::test]
    async fn like_increments_counter_and_logs_event() {
        let pool = seeded_pool().await;

        assert_eq!(record_like(&pool, 1, at(12, 0)).await.unwrap(), 1);
        assert_eq!(record_like(&pool, 1, at(12, 5)).await.unwrap(), 2);
        assert_eq!(record_like(&pool, 2, at(12, 10)).await.unwrap(), 1);

        let events: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM track_like_events")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(events, 3);
    }

    #[tokio::test]
    async fn track_exists_checks_the_row() {
        let pool = seeded_pool().await;
        assert!(track_exists(&pool, 1).await.unwrap());
        assert!(!track_exists(&pool, 999).await.unwrap());
    }

    #[tokio::test]
    async fn top_counts_only_events_inside_the_window() {
        let pool = seeded_pool().await;

        // Two old likes for S2, then fresh activity favoring S1
        record_like(&pool, 2, at(9, 0)).await.unwrap();
        record_like(&pool, 2, at(9, 30)).await.unwrap();
        record_like(&pool, 1, at(12, 0)).await.unwrap();
        record_like(&pool, 1, at(12, 30)).await.unwrap();
        record_like(&pool, 2, at(12, 45)).await.unwrap();

        let rows = top_increased(&pool, at(11, 0), 10).await.unwrap();
        assert_eq!(
            rows,
            vec![
                TopLikeRow {
                    track_id: 1,
                    inc_count: 2,
                    title: "S1".to_string(),
                    artist_names: Some("BTS, IU".to_string()),
                },
                TopLikeRow {
                    track_id: 2,
                    inc_count: 1,
                    title: "S2".to_string(),
                    artist_names: Some("IU".to_string()),
                },
            ]
        );
    }

    #[tokio::test]
    async fn top_honors_the_limit() {
        let pool = seeded_pool().await;
        record_like(&pool, 1, at(12, 0)).await.unwrap();
        record_like(&pool, 2, at(12, 1)).await.unwrap();

        let rows = top_increased(&pool, at(11, 0), 1).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].track_id, 1);
    }
}
