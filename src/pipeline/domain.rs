//! Track records as they move through the pipeline.
//!
//! A [`TrackRecord`] is a [`BaseTrackRecord`] plus, once enriched, an
//! [`Enrichment`]. The enriched flag is derived from the presence of the
//! enrichment, so a record can never claim to be enriched without carrying
//! the columns.

use crate::source::{ArtistInfo, AudioFeatures, SourceError};

use super::checkpoint::CheckpointError;

/// Canonical unenriched track record
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BaseTrackRecord {
    /// Stable identifier and merge key
    pub track_id: String,
    pub name: String,
    /// All artist names joined with ", "
    pub artist_label: String,
    pub album: String,
    pub album_type: Option<String>,
    pub release_date: Option<String>,
    pub duration_ms: Option<u64>,
    /// "minutes:seconds", derived from `duration_ms`
    pub duration_display: Option<String>,
    pub added_at: Option<String>,
    pub added_by_id: Option<String>,
    /// 0-100
    pub track_popularity: Option<u32>,
    /// Parallel to `artist_names`
    pub artist_uris: Vec<String>,
    pub artist_names: Vec<String>,
}

/// Columns attached by the enrichment engine
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Enrichment {
    /// One genre list per artist, parallel to `artist_uris`
    pub artists_genres: Vec<Vec<String>>,
    pub artists_popularities: Vec<u32>,
    /// Mean of `artists_popularities`; `None` when the track lists no artists
    pub artists_avg_popularity: Option<f64>,
    /// All `None` when the source has no features for the track
    pub audio: AudioFeatures,
    /// Display name of the user who added the track
    pub added_by_name: Option<String>,
}

/// A base record, enriched or not
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackRecord {
    pub base: BaseTrackRecord,
    pub enrichment: Option<Enrichment>,
}

impl TrackRecord {
    pub fn unenriched(base: BaseTrackRecord) -> Self {
        Self {
            base,
            enrichment: None,
        }
    }

    pub fn is_enriched(&self) -> bool {
        self.enrichment.is_some()
    }

    pub fn track_id(&self) -> &str {
        &self.base.track_id
    }

    /// Who added the track: display name when known, otherwise the user id
    pub fn contributor(&self) -> Option<&str> {
        self.enrichment
            .as_ref()
            .and_then(|e| e.added_by_name.as_deref())
            .or(self.base.added_by_id.as_deref())
    }
}

impl From<BaseTrackRecord> for TrackRecord {
    fn from(base: BaseTrackRecord) -> Self {
        Self::unenriched(base)
    }
}

/// Per-artist details for one track
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArtistDetails {
    pub genres: Vec<Vec<String>>,
    pub popularities: Vec<u32>,
    pub avg_popularity: Option<f64>,
}

impl ArtistDetails {
    /// Collect per-artist details in artist order
    pub fn from_artists(artists: &[ArtistInfo]) -> Self {
        let popularities: Vec<u32> = artists.iter().map(|a| a.popularity).collect();
        Self {
            genres: artists.iter().map(|a| a.genres.clone()).collect(),
            avg_popularity: mean(&popularities),
            popularities,
        }
    }
}

/// Arithmetic mean, `None` for an empty slice
pub fn mean(values: &[u32]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let sum: u64 = values.iter().map(|&v| u64::from(v)).sum();
    Some(sum as f64 / values.len() as f64)
}

/// Format milliseconds as "minutes:seconds" with two-digit seconds
pub fn format_duration(duration_ms: u64) -> String {
    let minutes = duration_ms / 60_000;
    let seconds = (duration_ms % 60_000) / 1_000;
    format!("{}:{:02}", minutes, seconds)
}

/// Counts reported at the end of an enrichment pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    /// Rows that went from unenriched to enriched in this run
    pub enriched_this_run: usize,
    /// Rows that were already enriched and passed through untouched
    pub already_enriched: usize,
    /// Rows whose lookups failed in this run
    pub failed: usize,
    pub remaining_unenriched: usize,
    /// The run was interrupted before every row was visited
    pub cancelled: bool,
}

/// Fatal pipeline errors
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Playlist {playlist_id} unavailable: {source}")]
    SourceUnavailable {
        playlist_id: String,
        #[source]
        source: SourceError,
    },

    #[error("Malformed record at position {position}: missing {field}")]
    MalformedRecord { position: usize, field: &'static str },

    #[error("Overlap undefined: {0} is empty")]
    DivisionUndefined(&'static str),

    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),
}
