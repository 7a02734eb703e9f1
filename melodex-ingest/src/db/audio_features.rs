//! Audio feature persistence
//!
//! One row per track, materialized even when every feature is None.

use melodex_common::Result;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use super::chunked_sum;

/// Numeric descriptors and notation fields for one track
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AudioFeatureRow {
    pub track_id: i64,
    pub tempo: Option<f64>,
    pub loudness: Option<f64>,
    pub energy: Option<i64>,
    pub danceability: Option<i64>,
    pub positiveness: Option<i64>,
    pub speechiness: Option<i64>,
    pub liveness: Option<i64>,
    pub acousticness: Option<i64>,
    pub instrumentalness: Option<i64>,
    pub musical_key: Option<String>,
    pub time_signature: Option<String>,
}

/// Rows per INSERT statement
const CHUNK: usize = 400;

/// Upsert by track id, refreshing every feature column on conflict
pub async fn upsert(conn: &mut SqliteConnection, rows: &[AudioFeatureRow]) -> Result<u64> {
    chunked_sum(conn, rows, CHUNK, |conn, chunk| {
        Box::pin(upsert_chunk(conn, chunk))
    })
    .await
}

async fn upsert_chunk(conn: &mut SqliteConnection, rows: &[AudioFeatureRow]) -> Result<u64> {
    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
        "INSERT INTO audio_features (track_id, tempo, loudness, energy, danceability, \
         positiveness, speechiness, liveness, acousticness, instrumentalness, \
         musical_key, time_signature) ",
    );
    builder.push_values(rows, |mut b, row| {
        b.push_bind(row.track_id)
            .push_bind(row.tempo)
            .push_bind(row.loudness)
            .push_bind(row.energy)
            .push_bind(row.danceability)
            .push_bind(row.positiveness)
            .push_bind(row.speechiness)
            .push_bind(row.liveness)
            .push_bind(row.acousticness)
            .push_bind(row.instrumentalness)
            .push_bind(&row.musical_key)
            .push_bind(&row.time_signature);
    });
    builder.push(
        " ON CONFLICT(track_id) DO UPDATE SET \
         tempo = excluded.tempo, \
         loudness = excluded.loudness, \
         energy = excluded.energy, \
         danceability = excluded.danceability, \
         positiveness = excluded.positiveness, \
         speechiness = excluded.speechiness, \
         liveness = excluded.liveness, \
         acousticness = excluded.acousticness, \
         instrumentalness = excluded.instrumentalness, \
         musical_key = excluded.musical_key, \
         time_signature = excluded.time_signature",
    );

    let result = builder.build().execute(conn).await?;
    Ok(result.rows_affected())
}
