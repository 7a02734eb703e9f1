//! Seed extraction and dependent-row construction
//!
//! Pure batch scans: no database access happens here. The orchestrator
//! persists what these builders produce, so the skip policy for
//! unresolvable keys (warn and drop the row, never fail the batch) lives
//! in this module.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use tracing::warn;

use crate::db::album_artists::AlbumArtistRow;
use crate::db::audio_features::AudioFeatureRow;
use crate::db::lyrics::LyricsRow;
use crate::db::track_artists::TrackArtistRow;
use crate::db::tracks::TrackRow;
use crate::model::RawTrackRecord;
use crate::normalize::{
    album_key, content_hash, norm, parse_duration_ms, parse_explicit, parse_release_date,
    simplify, split_artists, track_natural_key,
};

/// Deduplicated artist candidate, keyed by the folded name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtistSeed {
    pub key: String,
    pub display_name: String,
}

/// Deduplicated album candidate, keyed by folded name + date
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumSeed {
    pub key: String,
    pub name: String,
    pub release_date: Option<NaiveDate>,
}

/// Output of one extraction pass over a raw batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedBatch {
    pub artists: Vec<ArtistSeed>,
    pub albums: Vec<AlbumSeed>,
}

/// Dependent rows built once track ids are known
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackRelations {
    pub track_artists: Vec<TrackArtistRow>,
    pub lyrics: Vec<LyricsRow>,
    pub audio: Vec<AudioFeatureRow>,
}

/// Scan a batch once, collecting key-deduplicated artist and album seeds
///
/// First occurrence wins: seeds keep the display name and the insertion
/// order of the first record that mentioned them, so repeated extraction
/// over the same batch is stable.
pub fn extract_seeds(records: &[RawTrackRecord]) -> SeedBatch {
    let mut seeds = SeedBatch::default();
    let mut seen_artists: HashSet<String> = HashSet::new();
    let mut seen_albums: HashSet<String> = HashSet::new();

    for record in records {
        for name in split_artists(record.artists.as_deref()) {
            let key = simplify(&name);
            if seen_artists.insert(key.clone()) {
                seeds.artists.push(ArtistSeed {
                    key,
                    display_name: name,
                });
            }
        }

        let date = parse_release_date(record.release_date.as_deref());
        if let Some(name) = norm(record.album.as_deref()) {
            if let Some(key) = album_key(Some(&name), date) {
                if seen_albums.insert(key.clone()) {
                    seeds.albums.push(AlbumSeed {
                        key,
                        name,
                        release_date: date,
                    });
                }
            }
        }
    }

    seeds
}

/// One join row per (resolvable album, resolvable artist) pair per record
pub fn build_album_artist_rows(
    records: &[RawTrackRecord],
    album_ids: &HashMap<String, i64>,
    artist_ids: &HashMap<String, i64>,
) -> Vec<AlbumArtistRow> {
    let mut rows = Vec::new();

    for record in records {
        let date = parse_release_date(record.release_date.as_deref());
        let Some(key) = album_key(record.album.as_deref(), date) else {
            continue;
        };
        let Some(album_id) = album_ids.get(&key).copied() else {
            warn!("Unresolved album key {:?}, skipping album-artist joins", key);
            continue;
        };

        for name in split_artists(record.artists.as_deref()) {
            if let Some(artist_id) = artist_ids.get(&simplify(&name)).copied() {
                rows.push(AlbumArtistRow {
                    album_id,
                    artist_id,
                });
            }
        }
    }

    rows
}

/// One track row per record, in input order
///
/// Index alignment with the input batch is load-bearing: dependent-row
/// construction pairs records with these rows by position.
pub fn build_track_rows(
    records: &[RawTrackRecord],
    album_ids: &HashMap<String, i64>,
) -> Vec<TrackRow> {
    let mut rows = Vec::with_capacity(records.len());

    for record in records {
        let date = parse_release_date(record.release_date.as_deref());
        let artists = split_artists(record.artists.as_deref());
        let natural_key = track_natural_key(
            record.song.as_deref(),
            record.album.as_deref(),
            date,
            &artists,
        );

        let album_id = match album_key(record.album.as_deref(), date) {
            Some(key) => {
                let id = album_ids.get(&key).copied();
                if id.is_none() {
                    warn!("Unresolved album key {:?} while building track row", key);
                }
                id
            }
            None => None,
        };

        rows.push(TrackRow {
            track_hash: content_hash(&natural_key),
            title: norm(record.song.as_deref()).unwrap_or_default(),
            duration_ms: parse_duration_ms(record.length.as_deref()),
            duration_text: norm(record.length.as_deref()),
            genre: norm(record.genre.as_deref()),
            mood: norm(record.emotion.as_deref()),
            explicit: parse_explicit(record.explicit.as_deref()),
            popularity: record.popularity,
            album_id,
        });
    }

    rows
}

/// Join, lyrics, and audio rows for every record whose track id resolved
///
/// Lyrics rows exist only for records with non-blank text; audio rows are
/// materialized for every resolved record even when all features are None.
pub fn build_track_relations(
    records: &[RawTrackRecord],
    track_rows: &[TrackRow],
    track_ids: &HashMap<String, i64>,
    artist_ids: &HashMap<String, i64>,
) -> TrackRelations {
    let mut relations = TrackRelations::default();

    for (record, row) in records.iter().zip(track_rows) {
        let Some(track_id) = track_ids.get(&row.track_hash).copied() else {
            warn!(
                "Unresolved track hash {}, skipping dependent rows",
                row.track_hash
            );
            continue;
        };

        for name in split_artists(record.artists.as_deref()) {
            if let Some(artist_id) = artist_ids.get(&simplify(&name)).copied() {
                relations.track_artists.push(TrackArtistRow {
                    track_id,
                    artist_id,
                });
            }
        }

        if let Some(text) = norm(record.text.as_deref()) {
            relations.lyrics.push(LyricsRow {
                track_id,
                lyrics: text,
            });
        }

        relations.audio.push(AudioFeatureRow {
            track_id,
            tempo: record.tempo,
            loudness: record.loudness,
            energy: record.energy,
            danceability: record.danceability,
            positiveness: record.positiveness,
            speechiness: record.speechiness,
            liveness: record.liveness,
            acousticness: record.acousticness,
            instrumentalness: record.instrumentalness,
            musical_key: norm(record.key.as_deref()),
            time_signature: norm(record.time_signature.as_deref()),
        });
    }

    relations
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(artists: &str, song: &str, album: &str, date: &str) -> RawTrackRecord {
        RawTrackRecord {
            artists: Some(artists.to_string()),
            song: Some(song.to_string()),
            album: Some(album.to_string()),
            release_date: Some(date.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn seeds_dedup_first_wins_in_order() {
        let batch = vec![
            rec("IU, BTS", "S1", "Album A", "2020-01-01"),
            rec("iu", "S2", " album a ", "2020-01-01"),
            rec("BTS, Chung Ha", "S3", "Album B", "2021-05-05"),
        ];

        let seeds = extract_seeds(&batch);

        let names: Vec<&str> = seeds.artists.iter().map(|s| s.display_name.as_str()).collect();
        assert_eq!(names, vec!["IU", "BTS", "Chung Ha"]);

        let albums: Vec<&str> = seeds.albums.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(albums, vec!["Album A", "Album B"]);
    }

    #[test]
    fn extraction_is_deterministic() {
        let batch = vec![
            rec("IU, BTS", "S1", "A", "2020-01-01"),
            rec("BTS", "S2", "B", "2021-01-01"),
        ];
        assert_eq!(extract_seeds(&batch), extract_seeds(&batch));
    }

    #[test]
    fn blank_album_contributes_no_seed() {
        let seeds = extract_seeds(&[rec("IU", "S1", "   ", "2020-01-01")]);
        assert!(seeds.albums.is_empty());
        assert_eq!(seeds.artists.len(), 1);
    }

    #[test]
    fn same_name_different_date_makes_two_album_seeds() {
        let batch = vec![
            rec("IU", "S1", "A", "2020-01-01"),
            rec("IU", "S2", "A", "2021-01-01"),
        ];
        let seeds = extract_seeds(&batch);
        assert_eq!(seeds.albums.len(), 2);
    }

    #[test]
    fn album_artist_rows_skip_unresolved_albums() {
        let batch = vec![rec("IU", "S1", "A", "2020-01-01")];
        let artist_ids = HashMap::from([("iu".to_string(), 7)]);

        let rows = build_album_artist_rows(&batch, &HashMap::new(), &artist_ids);
        assert!(rows.is_empty());

        let album_ids = HashMap::from([("a|2020-01-01".to_string(), 3)]);
        let rows = build_album_artist_rows(&batch, &album_ids, &artist_ids);
        assert_eq!(
            rows,
            vec![AlbumArtistRow {
                album_id: 3,
                artist_id: 7
            }]
        );
    }

    #[test]
    fn track_rows_align_with_input_and_default_title() {
        let mut no_title = rec("IU", "S1", "A", "2020-01-01");
        no_title.song = None;
        let batch = vec![no_title, rec("BTS", "S2", "", "bad-date")];

        let rows = build_track_rows(&batch, &HashMap::new());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].title, "");
        assert_eq!(rows[1].title, "S2");
        assert!(rows[0].album_id.is_none());
        assert!(rows[1].album_id.is_none());
        assert_eq!(rows[0].track_hash.len(), 64);
    }

    #[test]
    fn relations_follow_lyrics_and_audio_policy() {
        let mut with_text = rec("IU", "S1", "A", "2020-01-01");
        with_text.text = Some("la la".to_string());
        with_text.tempo = Some(120.0);
        let without_text = rec("IU", "S2", "A", "2020-01-01");
        let batch = vec![with_text, without_text];

        let artist_ids = HashMap::from([("iu".to_string(), 1)]);
        let track_rows = build_track_rows(&batch, &HashMap::new());
        let track_ids = HashMap::from([
            (track_rows[0].track_hash.clone(), 10),
            (track_rows[1].track_hash.clone(), 11),
        ]);

        let relations = build_track_relations(&batch, &track_rows, &track_ids, &artist_ids);
        assert_eq!(relations.track_artists.len(), 2);
        assert_eq!(relations.lyrics.len(), 1);
        assert_eq!(relations.lyrics[0].track_id, 10);
        assert_eq!(relations.audio.len(), 2);
        assert_eq!(relations.audio[0].tempo, Some(120.0));
        assert_eq!(relations.audio[1].tempo, None);
    }

    #[test]
    fn relations_skip_unresolved_track_hashes() {
        let batch = vec![rec("IU", "S1", "A", "2020-01-01")];
        let track_rows = build_track_rows(&batch, &HashMap::new());

        let relations =
            build_track_relations(&batch, &track_rows, &HashMap::new(), &HashMap::new());
        assert!(relations.track_artists.is_empty());
        assert!(relations.lyrics.is_empty());
        assert!(relations.audio.is_empty());
    }
}
