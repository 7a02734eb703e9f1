//! Album statistics endpoints
//!
//! Both listings are keyset-paginated: the client passes back the opaque
//! cursor from the previous page and never sees an offset.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::cursor::{self, AlbumCursor, CountCursor};
use crate::db::stats::{self, AlbumRow, ArtistCountRow};
use crate::page::{self, Page};
use crate::AppState;

const DEFAULT_SIZE: i64 = 20;
const MAX_SIZE: i64 = 200;
const MIN_YEAR: i64 = 1900;
const MAX_YEAR: i64 = 2100;

/// Query parameters for the artist counts listing
#[derive(Debug, Deserialize)]
pub struct CountsQuery {
    pub year: Option<i64>,
    pub size: Option<i64>,
    pub cursor: Option<String>,
}

/// Query parameters for the per-artist album listing
#[derive(Debug, Deserialize)]
pub struct AlbumsQuery {
    pub year: Option<i64>,
    pub size: Option<i64>,
    pub cursor: Option<String>,
}

/// Artist counts page with its catalog-wide total
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtistCountsResponse {
    pub year: Option<i64>,
    pub total_albums: i64,
    pub page: Page<ArtistCountRow>,
}

/// One artist's album page with that artist's total
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtistAlbumsResponse {
    pub artist_id: i64,
    pub year: Option<i64>,
    pub total_albums: i64,
    pub page: Page<AlbumRow>,
}

/// GET /api/albums/stats/artists
///
/// Per-artist distinct album counts, optionally restricted to one release
/// year. Sorted by album_count DESC, artist_id ASC.
pub async fn artist_album_counts(
    State(state): State<AppState>,
    Query(query): Query<CountsQuery>,
) -> Result<Json<ArtistCountsResponse>, ApiError> {
    let size = validate_size(query.size)?;
    let year = validate_year(query.year)?;
    let after = match query.cursor.as_deref() {
        Some(token) => {
            let c: CountCursor = cursor::decode(token).ok_or(ApiError::BadCursor)?;
            Some((c.count, c.artist_id))
        }
        None => None,
    };

    let rows = match year {
        Some(year) => stats::artist_counts_for_year(&state.db, year, after, size + 1).await?,
        None => stats::artist_counts_all(&state.db, after, size + 1).await?,
    };
    let total_albums = stats::count_albums(&state.db, year).await?;

    let page = page::assemble(rows, size, |row| {
        cursor::encode(&CountCursor {
            count: row.album_count,
            artist_id: row.artist_id,
        })
    });
    Ok(Json(ArtistCountsResponse {
        year,
        total_albums,
        page,
    }))
}

/// GET /api/albums/stats/artists/:artist_id
///
/// One artist's albums. Without a year: newest first, undated albums
/// last. With a year: only that year's albums, in id order.
pub async fn artist_albums(
    State(state): State<AppState>,
    Path(artist_id): Path<i64>,
    Query(query): Query<AlbumsQuery>,
) -> Result<Json<ArtistAlbumsResponse>, ApiError> {
    let size = validate_size(query.size)?;
    let year = validate_year(query.year)?;

    if !stats::artist_exists(&state.db, artist_id).await? {
        return Err(ApiError::UnknownArtist(artist_id));
    }

    let rows = match year {
        Some(year) => {
            let after_id = match query.cursor.as_deref() {
                Some(token) => {
                    let c: AlbumCursor = cursor::decode(token).ok_or(ApiError::BadCursor)?;
                    Some(c.id)
                }
                None => None,
            };
            stats::albums_for_artist_in_year(&state.db, artist_id, year, after_id, size + 1)
                .await?
        }
        None => {
            let after = match query.cursor.as_deref() {
                Some(token) => {
                    let c: AlbumCursor = cursor::decode(token).ok_or(ApiError::BadCursor)?;
                    Some((c.year, c.id))
                }
                None => None,
            };
            stats::albums_for_artist(&state.db, artist_id, after, size + 1).await?
        }
    };
    let total_albums = stats::count_artist_albums(&state.db, artist_id, year).await?;

    // In year mode the year is pinned, so the cursor carries the id alone
    let page = page::assemble(rows, size, |row| {
        cursor::encode(&AlbumCursor {
            year: if year.is_some() {
                None
            } else {
                row.release_year
            },
            id: row.id,
        })
    });
    Ok(Json(ArtistAlbumsResponse {
        artist_id,
        year,
        total_albums,
        page,
    }))
}

fn validate_size(size: Option<i64>) -> Result<i64, ApiError> {
    let size = size.unwrap_or(DEFAULT_SIZE);
    if !(1..=MAX_SIZE).contains(&size) {
        return Err(ApiError::InvalidInput(format!(
            "size must be within 1..={}, got {}",
            MAX_SIZE, size
        )));
    }
    Ok(size)
}

fn validate_year(year: Option<i64>) -> Result<Option<i64>, ApiError> {
    if let Some(year) = year {
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(ApiError::InvalidInput(format!(
                "year must be within {}..={}, got {}",
                MIN_YEAR, MAX_YEAR, year
            )));
        }
    }
    Ok(year)
}

/// Stats API errors
#[derive(Debug)]
pub enum ApiError {
    BadCursor,
    InvalidInput(String),
    UnknownArtist(i64),
    UnknownTrack(i64),
    DatabaseError(String),
}

impl From<melodex_common::Error> for ApiError {
    fn from(error: melodex_common::Error) -> Self {
        ApiError::DatabaseError(error.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadCursor => (StatusCode::BAD_REQUEST, "Invalid cursor".to_string()),
            ApiError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::UnknownArtist(id) => {
                (StatusCode::NOT_FOUND, format!("Unknown artist: {}", id))
            }
            ApiError::UnknownTrack(id) => (StatusCode::NOT_FOUND, format!("Unknown track: {}", id)),
            ApiError::DatabaseError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", msg),
            ),
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}
