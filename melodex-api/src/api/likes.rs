//! Track like endpoints
//!
//! POST records a like and returns the track's running total; GET lists
//! the tracks whose like count grew the most inside a trailing window.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::api::stats::ApiError;
use crate::db::likes::{self, TopLikeRow};
use crate::AppState;

const DEFAULT_WINDOW_MINUTES: i64 = 60;
const MAX_WINDOW_MINUTES: i64 = 1440;
const DEFAULT_TOP_LIMIT: i64 = 10;
const MAX_TOP_LIMIT: i64 = 200;

/// Query parameters for the top-liked listing
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopQuery {
    pub window_minutes: Option<i64>,
    pub limit: Option<i64>,
}

/// A track's like total after a like was recorded
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeResponse {
    pub track_id: i64,
    pub like_count: i64,
}

/// POST /api/tracks/:track_id/likes
pub async fn like_track(
    State(state): State<AppState>,
    Path(track_id): Path<i64>,
) -> Result<Json<LikeResponse>, ApiError> {
    if track_id <= 0 {
        return Err(ApiError::InvalidInput(format!(
            "track id must be positive, got {}",
            track_id
        )));
    }
    if !likes::track_exists(&state.db, track_id).await? {
        return Err(ApiError::UnknownTrack(track_id));
    }

    let like_count = likes::record_like(&state.db, track_id, Utc::now().naive_utc()).await?;
    Ok(Json(LikeResponse {
        track_id,
        like_count,
    }))
}

/// GET /api/tracks/likes/top
///
/// Tracks ranked by like events inside the trailing window, largest
/// increment first.
pub async fn top_liked_tracks(
    State(state): State<AppState>,
    Query(query): Query<TopQuery>,
) -> Result<Json<Vec<TopLikeRow>>, ApiError> {
    let window_minutes = query.window_minutes.unwrap_or(DEFAULT_WINDOW_MINUTES);
    if !(1..=MAX_WINDOW_MINUTES).contains(&window_minutes) {
        return Err(ApiError::InvalidInput(format!(
            "windowMinutes must be within 1..={}, got {}",
            MAX_WINDOW_MINUTES, window_minutes
        )));
    }
    let limit = query.limit.unwrap_or(DEFAULT_TOP_LIMIT);
    if !(1..=MAX_TOP_LIMIT).contains(&limit) {
        return Err(ApiError::InvalidInput(format!(
            "limit must be within 1..={}, got {}",
            MAX_TOP_LIMIT, limit
        )));
    }

    let since = Utc::now().naive_utc() - Duration::minutes(window_minutes);
    let rows = likes::top_increased(&state.db, since, limit).await?;
    Ok(Json(rows))
}
