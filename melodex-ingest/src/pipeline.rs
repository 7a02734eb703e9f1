//! Batch ingest orchestration
//!
//! A batch walks a fixed phase order inside one transaction: seed
//! extraction, artist persistence and id resolution, album persistence
//! and id resolution, album-artist joins, track rows, track id
//! resolution, then dependent rows. Each phase reads only state produced
//! by earlier phases. Any failure propagates out and drops the
//! transaction, rolling the whole batch back.

use std::collections::HashMap;

use melodex_common::Result;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::db::{
    album_artists, albums, artists, audio_features, lyrics, track_artists, tracks, year_stats,
};
use crate::db::tracks::TrackRow;
use crate::extract::{self, SeedBatch, TrackRelations};
use crate::model::RawTrackRecord;

/// Batch ingest entry point
pub struct IngestService {
    db: SqlitePool,
}

impl IngestService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Apply one batch atomically; returns the total affected-row count
    pub async fn ingest_batch(&self, records: &[RawTrackRecord]) -> Result<u64> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut tx = self.db.begin().await?;
        let mut batch = BatchState::new(records);

        batch.extract_seeds();
        batch.persist_artists(&mut tx).await?;
        batch.resolve_artist_ids(&mut tx).await?;
        batch.persist_albums(&mut tx).await?;
        batch.resolve_album_ids(&mut tx).await?;
        batch.persist_album_artists(&mut tx).await?;
        batch.build_track_rows();
        batch.persist_tracks(&mut tx).await?;
        batch.resolve_track_ids(&mut tx).await?;
        batch.build_dependent_rows();
        batch.persist_dependents(&mut tx).await?;

        tx.commit().await?;

        info!(
            "Batch ingested: {} records, {} artist seeds, {} album seeds, {} rows affected",
            records.len(),
            batch.seeds.artists.len(),
            batch.seeds.albums.len(),
            batch.affected
        );
        Ok(batch.affected)
    }

    /// Recompute the per-year album counts from committed state
    pub async fn rebuild_aggregates(&self) -> Result<u64> {
        let mut tx = self.db.begin().await?;
        let cleared = year_stats::clear(&mut tx).await?;
        let inserted = year_stats::rebuild_from_albums(&mut tx).await?;
        tx.commit().await?;

        info!(
            "Aggregate rebuilt: {} rows cleared, {} rows inserted",
            cleared, inserted
        );
        Ok(inserted)
    }
}

/// Phase-ordered state for one batch
///
/// Fields fill in as phases advance; a phase only reads fields written by
/// earlier phases. The id maps are batch-local and die with this value.
struct BatchState<'a> {
    records: &'a [RawTrackRecord],
    seeds: SeedBatch,
    artist_ids: HashMap<String, i64>,
    album_ids: HashMap<String, i64>,
    track_rows: Vec<TrackRow>,
    track_ids: HashMap<String, i64>,
    relations: TrackRelations,
    affected: u64,
}

impl<'a> BatchState<'a> {
    fn new(records: &'a [RawTrackRecord]) -> Self {
        Self {
            records,
            seeds: SeedBatch::default(),
            artist_ids: HashMap::new(),
            album_ids: HashMap::new(),
            track_rows: Vec::new(),
            track_ids: HashMap::new(),
            relations: TrackRelations::default(),
            affected: 0,
        }
    }

    fn extract_seeds(&mut self) {
        self.seeds = extract::extract_seeds(self.records);
        debug!(
            "Extracted {} artist seeds, {} album seeds",
            self.seeds.artists.len(),
            self.seeds.albums.len()
        );
    }

    async fn persist_artists(&mut self, conn: &mut SqliteConnection) -> Result<()> {
        let inserted = artists::insert_ignore(conn, &self.seeds.artists).await?;
        self.affected += inserted;
        debug!("Persisted artists: {} new", inserted);
        Ok(())
    }

    async fn resolve_artist_ids(&mut self, conn: &mut SqliteConnection) -> Result<()> {
        let keys: Vec<String> = self.seeds.artists.iter().map(|s| s.key.clone()).collect();
        self.artist_ids = artists::ids_by_key(conn, &keys).await?;
        Ok(())
    }

    async fn persist_albums(&mut self, conn: &mut SqliteConnection) -> Result<()> {
        let inserted = albums::insert_ignore(conn, &self.seeds.albums).await?;
        self.affected += inserted;
        debug!("Persisted albums: {} new", inserted);
        Ok(())
    }

    async fn resolve_album_ids(&mut self, conn: &mut SqliteConnection) -> Result<()> {
        let keys: Vec<String> = self.seeds.albums.iter().map(|s| s.key.clone()).collect();
        self.album_ids = albums::ids_by_key(conn, &keys).await?;
        Ok(())
    }

    async fn persist_album_artists(&mut self, conn: &mut SqliteConnection) -> Result<()> {
        let rows =
            extract::build_album_artist_rows(self.records, &self.album_ids, &self.artist_ids);
        let inserted = album_artists::insert_ignore(conn, &rows).await?;
        self.affected += inserted;
        debug!("Persisted album-artist joins: {} new", inserted);
        Ok(())
    }

    fn build_track_rows(&mut self) {
        self.track_rows = extract::build_track_rows(self.records, &self.album_ids);
    }

    async fn persist_tracks(&mut self, conn: &mut SqliteConnection) -> Result<()> {
        let affected = tracks::upsert(conn, &self.track_rows).await?;
        self.affected += affected;
        debug!("Persisted tracks: {} affected", affected);
        Ok(())
    }

    async fn resolve_track_ids(&mut self, conn: &mut SqliteConnection) -> Result<()> {
        let hashes: Vec<String> = self
            .track_rows
            .iter()
            .map(|r| r.track_hash.clone())
            .collect();
        self.track_ids = tracks::ids_by_hash(conn, &hashes).await?;
        Ok(())
    }

    fn build_dependent_rows(&mut self) {
        self.relations = extract::build_track_relations(
            self.records,
            &self.track_rows,
            &self.track_ids,
            &self.artist_ids,
        );
    }

    async fn persist_dependents(&mut self, conn: &mut SqliteConnection) -> Result<()> {
        let credits = track_artists::insert_ignore(conn, &self.relations.track_artists).await?;
        let lyric_rows = lyrics::upsert(conn, &self.relations.lyrics).await?;
        let audio_rows = audio_features::upsert(conn, &self.relations.audio).await?;
        self.affected += credits + lyric_rows + audio_rows;
        debug!(
            "Persisted dependents: {} credits, {} lyrics, {} audio",
            credits, lyric_rows, audio_rows
        );
        Ok(())
    }
}
