//! Raw feed record shape

use serde::Deserialize;

/// One track as it appears on a feed line
///
/// Member names follow the feed's own header casing. Unknown members are
/// ignored; missing members deserialize to None.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTrackRecord {
    #[serde(rename = "Artist(s)")]
    pub artists: Option<String>,
    pub song: Option<String>,
    pub text: Option<String>,
    #[serde(rename = "Length")]
    pub length: Option<String>,
    pub emotion: Option<String>,
    #[serde(rename = "Genre")]
    pub genre: Option<String>,
    #[serde(rename = "Album")]
    pub album: Option<String>,
    #[serde(rename = "Release Date")]
    pub release_date: Option<String>,
    #[serde(rename = "Key")]
    pub key: Option<String>,
    #[serde(rename = "Tempo")]
    pub tempo: Option<f64>,
    #[serde(rename = "Loudness (db)")]
    pub loudness: Option<f64>,
    #[serde(rename = "Time signature")]
    pub time_signature: Option<String>,
    #[serde(rename = "Explicit")]
    pub explicit: Option<String>,
    #[serde(rename = "Popularity")]
    pub popularity: Option<i64>,
    #[serde(rename = "Energy")]
    pub energy: Option<i64>,
    #[serde(rename = "Danceability")]
    pub danceability: Option<i64>,
    #[serde(rename = "Positiveness")]
    pub positiveness: Option<i64>,
    #[serde(rename = "Speechiness")]
    pub speechiness: Option<i64>,
    #[serde(rename = "Liveness")]
    pub liveness: Option<i64>,
    #[serde(rename = "Acousticness")]
    pub acousticness: Option<i64>,
    #[serde(rename = "Instrumentalness")]
    pub instrumentalness: Option<i64>,
}
