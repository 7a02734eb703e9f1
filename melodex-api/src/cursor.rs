//! Opaque keyset cursors
//!
//! A cursor is URL-safe unpadded base64 over a small JSON object holding
//! the last returned row's sort-key values. Clients carry it back
//! verbatim; a cursor that fails to decode is the caller's error, never a
//! panic.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Cursor for the per-artist album-count listing
///
/// Sort order is album_count DESC, artist_id ASC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountCursor {
    pub count: i64,
    pub artist_id: i64,
}

/// Cursor for one artist's album listing
///
/// Sort order is release_year DESC with undated albums last, then id ASC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumCursor {
    pub year: Option<i64>,
    pub id: i64,
}

/// Encode a cursor value as an opaque token
pub fn encode<T: Serialize>(value: &T) -> String {
    let json = serde_json::to_vec(value).expect("cursor values serialize infallibly");
    URL_SAFE_NO_PAD.encode(json)
}

/// Decode an opaque token; None for anything malformed
pub fn decode<T: DeserializeOwned>(token: &str) -> Option<T> {
    let bytes = URL_SAFE_NO_PAD.decode(token).ok()?;
    serde_json::from_slice(&bytes).ok()
}
