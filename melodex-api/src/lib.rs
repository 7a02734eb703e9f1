//! melodex-api library - album statistics and likes service
//!
//! HTTP surface over the melodex database: keyset-paginated per-artist
//! album counts and album listings, plus track like recording and a
//! windowed top-liked ranking.

use axum::Router;
use sqlx::SqlitePool;

pub mod api;
pub mod cursor;
pub mod db;
pub mod page;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};
    use tower_http::trace::TraceLayer;

    Router::new()
        .route(
            "/api/albums/stats/artists",
            get(api::stats::artist_album_counts),
        )
        .route(
            "/api/albums/stats/artists/:artist_id",
            get(api::stats::artist_albums),
        )
        .route("/api/tracks/:track_id/likes", post(api::likes::like_track))
        .route("/api/tracks/likes/top", get(api::likes::top_liked_tracks))
        .merge(api::health::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
