//! Keyset reads for the album statistics endpoints
//!
//! Year-restricted counts come from the derived `artist_album_count_year`
//! table; unrestricted counts are computed live from the join tables.
//! Every listing orders by a strict key tuple and accepts an optional
//! "after" position so the handlers can fetch size+1 rows per page.

use melodex_common::Result;
use serde::Serialize;
use sqlx::SqlitePool;

/// One artist with its distinct-album count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ArtistCountRow {
    pub artist_id: i64,
    pub name: String,
    pub album_count: i64,
}

/// One album of an artist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AlbumRow {
    pub id: i64,
    pub name: String,
    pub release_date: Option<String>,
    pub release_year: Option<i64>,
}

/// Per-artist album counts for one release year, from the derived table
///
/// Sort: album_count DESC, artist_id ASC. `after` is the last seen
/// (album_count, artist_id) pair.
pub async fn artist_counts_for_year(
    db: &SqlitePool,
    year: i64,
    after: Option<(i64, i64)>,
    limit: i64,
) -> Result<Vec<ArtistCountRow>> {
    let rows = match after {
        Some((count, artist_id)) => {
            sqlx::query_as(
                "SELECT s.artist_id, a.name, s.album_count \
                 FROM artist_album_count_year s \
                 JOIN artists a ON a.id = s.artist_id \
                 WHERE s.release_year = ?1 \
                   AND (s.album_count < ?2 OR (s.album_count = ?2 AND s.artist_id > ?3)) \
                 ORDER BY s.album_count DESC, s.artist_id \
                 LIMIT ?4",
            )
            .bind(year)
            .bind(count)
            .bind(artist_id)
            .bind(limit)
            .fetch_all(db)
            .await?
        }
        None => {
            sqlx::query_as(
                "SELECT s.artist_id, a.name, s.album_count \
                 FROM artist_album_count_year s \
                 JOIN artists a ON a.id = s.artist_id \
                 WHERE s.release_year = ?1 \
                 ORDER BY s.album_count DESC, s.artist_id \
                 LIMIT ?2",
            )
            .bind(year)
            .bind(limit)
            .fetch_all(db)
            .await?
        }
    };
    Ok(rows)
}

/// Per-artist distinct album counts across all years, computed live
///
/// Undated albums are excluded from the counts; they can never appear in
/// a year bucket, so the unrestricted listing must not count them either.
pub async fn artist_counts_all(
    db: &SqlitePool,
    after: Option<(i64, i64)>,
    limit: i64,
) -> Result<Vec<ArtistCountRow>> {
    let rows = match after {
        Some((count, artist_id)) => {
            sqlx::query_as(
                "SELECT aa.artist_id, a.name, COUNT(DISTINCT aa.album_id) AS album_count \
                 FROM album_artists aa \
                 JOIN albums al ON al.id = aa.album_id \
                 JOIN artists a ON a.id = aa.artist_id \
                 WHERE al.release_year IS NOT NULL \
                 GROUP BY aa.artist_id, a.name \
                 HAVING (album_count < ?1 OR (album_count = ?1 AND aa.artist_id > ?2)) \
                 ORDER BY album_count DESC, aa.artist_id \
                 LIMIT ?3",
            )
            .bind(count)
            .bind(artist_id)
            .bind(limit)
            .fetch_all(db)
            .await?
        }
        None => {
            sqlx::query_as(
                "SELECT aa.artist_id, a.name, COUNT(DISTINCT aa.album_id) AS album_count \
                 FROM album_artists aa \
                 JOIN albums al ON al.id = aa.album_id \
                 JOIN artists a ON a.id = aa.artist_id \
                 WHERE al.release_year IS NOT NULL \
                 GROUP BY aa.artist_id, a.name \
                 ORDER BY album_count DESC, aa.artist_id \
                 LIMIT ?1",
            )
            .bind(limit)
            .fetch_all(db)
            .await?
        }
    };
    Ok(rows)
}

/// Total album count, optionally restricted to one release year
pub async fn count_albums(db: &SqlitePool, year: Option<i64>) -> Result<i64> {
    let total = match year {
        Some(year) => {
            sqlx::query_scalar("SELECT COUNT(*) FROM albums WHERE release_year = ?1")
                .bind(year)
                .fetch_one(db)
                .await?
        }
        None => {
            sqlx::query_scalar("SELECT COUNT(*) FROM albums")
                .fetch_one(db)
                .await?
        }
    };
    Ok(total)
}

/// Total album count for one artist, optionally restricted to one year
pub async fn count_artist_albums(
    db: &SqlitePool,
    artist_id: i64,
    year: Option<i64>,
) -> Result<i64> {
    let total = match year {
        Some(year) => {
            sqlx::query_scalar(
                "SELECT COUNT(*) FROM album_artists aa \
                 JOIN albums al ON al.id = aa.album_id \
                 WHERE aa.artist_id = ?1 AND al.release_year = ?2",
            )
            .bind(artist_id)
            .bind(year)
            .fetch_one(db)
            .await?
        }
        None => {
            sqlx::query_scalar(
                "SELECT COUNT(*) FROM album_artists aa \
                 JOIN albums al ON al.id = aa.album_id \
                 WHERE aa.artist_id = ?1",
            )
            .bind(artist_id)
            .fetch_one(db)
            .await?
        }
    };
    Ok(total)
}

/// Whether an artist row exists at all
pub async fn artist_exists(db: &SqlitePool, artist_id: i64) -> Result<bool> {
    let found: Option<i64> = sqlx::query_scalar("SELECT id FROM artists WHERE id = ?1")
        .bind(artist_id)
        .fetch_optional(db)
        .await?;
    Ok(found.is_some())
}

/// One artist's albums, newest first, undated albums last
///
/// SQLite sorts NULL below every integer, so `release_year DESC` already
/// places undated albums at the end. `after` is the last seen
/// (release_year, id) pair.
pub async fn albums_for_artist(
    db: &SqlitePool,
    artist_id: i64,
    after: Option<(Option<i64>, i64)>,
    limit: i64,
) -> Result<Vec<AlbumRow>> {
    let rows = match after {
        Some((Some(year), id)) => {
            sqlx::query_as(
                "SELECT al.id, al.name, al.release_date, al.release_year \
                 FROM albums al \
                 JOIN album_artists aa ON aa.album_id = al.id \
                 WHERE aa.artist_id = ?1 \
                   AND (al.release_year < ?2 OR al.release_year IS NULL \
                        OR (al.release_year = ?2 AND al.id > ?3)) \
                 ORDER BY al.release_year DESC, al.id \
                 LIMIT ?4",
            )
            .bind(artist_id)
            .bind(year)
            .bind(id)
            .bind(limit)
            .fetch_all(db)
            .await?
        }
        Some((None, id)) => {
            sqlx::query_as(
                "SELECT al.id, al.name, al.release_date, al.release_year \
                 FROM albums al \
                 JOIN album_artists aa ON aa.album_id = al.id \
                 WHERE aa.artist_id = ?1 \
                   AND al.release_year IS NULL AND al.id > ?2 \
                 ORDER BY al.release_year DESC, al.id \
                 LIMIT ?3",
            )
            .bind(artist_id)
            .bind(id)
            .bind(limit)
            .fetch_all(db)
            .await?
        }
        None => {
            sqlx::query_as(
                "SELECT al.id, al.name, al.release_date, al.release_year \
                 FROM albums al \
                 JOIN album_artists aa ON aa.album_id = al.id \
                 WHERE aa.artist_id = ?1 \
                 ORDER BY al.release_year DESC, al.id \
                 LIMIT ?2",
            )
            .bind(artist_id)
            .bind(limit)
            .fetch_all(db)
            .await?
        }
    };
    Ok(rows)
}

/// One artist's albums within a single release year, in id order
///
/// The year pins the sort, so the resume position is the id alone.
pub async fn albums_for_artist_in_year(
    db: &SqlitePool,
    artist_id: i64,
    year: i64,
    after_id: Option<i64>,
    limit: i64,
) -> Result<Vec<AlbumRow>> {
    let rows = match after_id {
        Some(id) => {
            sqlx::query_as(
                "SELECT al.id, al.name, al.release_date, al.release_year \
                 FROM albums al \
                 JOIN album_artists aa ON aa.album_id = al.id \
                 WHERE aa.artist_id = ?1 AND al.release_year = ?2 AND al.id > ?3 \
                 ORDER BY al.id \
                 LIMIT ?4",
            )
            .bind(artist_id)
            .bind(year)
            .bind(id)
            .bind(limit)
            .fetch_all(db)
            .await?
        }
        None => {
            sqlx::query_as(
                "SELECT al.id, al.name, al.release_date, al.release_year \
                 FROM albums al \
                 JOIN album_artists aa ON aa.album_id = al.id \
                 WHERE aa.artist_id = ?1 AND al.release_year = ?2 \
                 ORDER BY al.id \
                 LIMIT ?3",
            )
            .bind(artist_id)
            .bind(year)
            .bind(limit)
            .fetch_all(db)
            .await?
        }
    };
    Ok(rows)
}
