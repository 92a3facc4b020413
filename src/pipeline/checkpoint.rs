//! Persisted table of track records.
//!
//! The table is stored as JSON Lines: one flat object per row, with the base
//! columns, the enrichment columns and the `enriched` flag. Missing cells are
//! `null`. The table is the only record of what has been enriched.
//!
//! Writes go to a temp file that is renamed over the target, so a crash mid
//! write leaves the previous checkpoint intact.

use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::source::AudioFeatures;

use super::domain::{BaseTrackRecord, Enrichment, TrackRecord};

/// One persisted row. Column names are the on-disk schema.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CheckpointRow {
    pub track_id: Option<String>,
    pub name: Option<String>,
    #[serde(alias = "artist")]
    pub artist_label: Option<String>,
    pub album: Option<String>,
    pub album_type: Option<String>,
    pub release_date: Option<String>,
    pub duration_ms: Option<u64>,
    #[serde(alias = "duration")]
    pub duration_display: Option<String>,
    pub added_at: Option<String>,
    pub added_by_id: Option<String>,
    #[serde(alias = "added_by")]
    pub added_by_name: Option<String>,
    pub track_popularity: Option<u32>,
    pub artist_uris: Vec<String>,
    pub artist_names: Vec<String>,
    pub artists_genres: Option<Vec<Vec<String>>>,
    pub artists_popularities: Option<Vec<u32>>,
    pub artists_avg_popularity: Option<f64>,
    pub danceability: Option<f64>,
    pub energy: Option<f64>,
    pub key: Option<i32>,
    pub loudness: Option<f64>,
    pub mode: Option<i32>,
    pub speechiness: Option<f64>,
    pub acousticness: Option<f64>,
    pub instrumentalness: Option<f64>,
    pub liveness: Option<f64>,
    pub valence: Option<f64>,
    pub tempo: Option<f64>,
    pub time_signature: Option<i32>,
    /// Absent in tables written before the flag existed
    pub enriched: Option<bool>,
}

impl From<&TrackRecord> for CheckpointRow {
    fn from(record: &TrackRecord) -> Self {
        let base = &record.base;
        let enrichment = record.enrichment.as_ref();
        let audio = enrichment.map(|e| &e.audio);

        Self {
            track_id: Some(base.track_id.clone()),
            name: Some(base.name.clone()),
            artist_label: Some(base.artist_label.clone()),
            album: Some(base.album.clone()),
            album_type: base.album_type.clone(),
            release_date: base.release_date.clone(),
            duration_ms: base.duration_ms,
            duration_display: base.duration_display.clone(),
            added_at: base.added_at.clone(),
            added_by_id: base.added_by_id.clone(),
            added_by_name: enrichment.and_then(|e| e.added_by_name.clone()),
            track_popularity: base.track_popularity,
            artist_uris: base.artist_uris.clone(),
            artist_names: base.artist_names.clone(),
            artists_genres: enrichment.map(|e| e.artists_genres.clone()),
            artists_popularities: enrichment.map(|e| e.artists_popularities.clone()),
            artists_avg_popularity: enrichment.and_then(|e| e.artists_avg_popularity),
            danceability: audio.and_then(|a| a.danceability),
            energy: audio.and_then(|a| a.energy),
            key: audio.and_then(|a| a.key),
            loudness: audio.and_then(|a| a.loudness),
            mode: audio.and_then(|a| a.mode),
            speechiness: audio.and_then(|a| a.speechiness),
            acousticness: audio.and_then(|a| a.acousticness),
            instrumentalness: audio.and_then(|a| a.instrumentalness),
            liveness: audio.and_then(|a| a.liveness),
            valence: audio.and_then(|a| a.valence),
            tempo: audio.and_then(|a| a.tempo),
            time_signature: audio.and_then(|a| a.time_signature),
            enriched: Some(record.is_enriched()),
        }
    }
}

impl CheckpointRow {
    /// Rebuild a record. Rows without a track id can't take part in a merge.
    fn into_record(self, line: usize) -> Result<TrackRecord, CheckpointError> {
        let track_id = self
            .track_id
            .filter(|id| !id.is_empty())
            .ok_or(CheckpointError::InvalidRow {
                line,
                reason: "missing track_id",
            })?;

        let enrichment = (self.enriched == Some(true)).then(|| Enrichment {
            artists_genres: self.artists_genres.unwrap_or_default(),
            artists_popularities: self.artists_popularities.unwrap_or_default(),
            artists_avg_popularity: self.artists_avg_popularity,
            audio: AudioFeatures {
                danceability: self.danceability,
                energy: self.energy,
                key: self.key,
                loudness: self.loudness,
                mode: self.mode,
                speechiness: self.speechiness,
                acousticness: self.acousticness,
                instrumentalness: self.instrumentalness,
                liveness: self.liveness,
                valence: self.valence,
                tempo: self.tempo,
                time_signature: self.time_signature,
            },
            added_by_name: self.added_by_name,
        });

        Ok(TrackRecord {
            base: BaseTrackRecord {
                track_id,
                name: self.name.unwrap_or_default(),
                artist_label: self.artist_label.unwrap_or_default(),
                album: self.album.unwrap_or_default(),
                album_type: self.album_type,
                release_date: self.release_date,
                duration_ms: self.duration_ms,
                duration_display: self.duration_display,
                added_at: self.added_at,
                added_by_id: self.added_by_id,
                track_popularity: self.track_popularity,
                artist_uris: self.artist_uris,
                artist_names: self.artist_names,
            },
            enrichment,
        })
    }
}

/// A loaded checkpoint
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckpointTable {
    pub rows: Vec<TrackRecord>,
    /// False when no row carried the `enriched` column
    pub has_enriched_column: bool,
}

impl CheckpointTable {
    /// Wrap records produced by this version of the pipeline
    pub fn from_records(rows: Vec<TrackRecord>) -> Self {
        Self {
            rows,
            has_enriched_column: true,
        }
    }

    pub fn enriched_count(&self) -> usize {
        self.rows.iter().filter(|r| r.is_enriched()).count()
    }
}

/// Somewhere the engine can persist progress mid-run
pub trait CheckpointSink: Send + Sync {
    fn persist(&self, records: &[TrackRecord]) -> Result<(), CheckpointError>;
}

/// JSON Lines checkpoint file
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    path: PathBuf,
}

impl CheckpointStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the table. `Ok(None)` on a first run, when the file doesn't exist.
    pub fn load(&self) -> Result<Option<CheckpointTable>, CheckpointError> {
        let file = match std::fs::File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(target: "pipeline::checkpoint", path = %self.path.display(), "No checkpoint found, starting fresh");
                return Ok(None);
            }
            Err(e) => return Err(CheckpointError::io(&self.path, e)),
        };

        let mut rows = Vec::new();
        let mut has_enriched_column = false;
        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line_number = index + 1;
            let line = line.map_err(|e| CheckpointError::io(&self.path, e))?;
            if line.trim().is_empty() {
                continue;
            }
            let row: CheckpointRow =
                serde_json::from_str(&line).map_err(|source| CheckpointError::Parse {
                    path: self.path.clone(),
                    line: line_number,
                    source,
                })?;
            has_enriched_column |= row.enriched.is_some();
            rows.push(row.into_record(line_number)?);
        }

        // An empty table has nothing to misread
        let table = CheckpointTable {
            has_enriched_column: has_enriched_column || rows.is_empty(),
            rows,
        };
        tracing::info!(
            target: "pipeline::checkpoint",
            path = %self.path.display(),
            rows = table.rows.len(),
            enriched = table.enriched_count(),
            "Loaded checkpoint"
        );
        Ok(Some(table))
    }

    /// Write the full table atomically
    pub fn save(&self, records: &[TrackRecord]) -> Result<(), CheckpointError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|e| CheckpointError::io(dir, e))?;
        }

        let temp_path = temp_path_for(&self.path);
        {
            let file =
                std::fs::File::create(&temp_path).map_err(|e| CheckpointError::io(&temp_path, e))?;
            let mut writer = std::io::BufWriter::new(file);
            for record in records {
                serde_json::to_writer(&mut writer, &CheckpointRow::from(record))
                    .map_err(CheckpointError::Serialize)?;
                writer
                    .write_all(b"\n")
                    .map_err(|e| CheckpointError::io(&temp_path, e))?;
            }
            writer
                .flush()
                .map_err(|e| CheckpointError::io(&temp_path, e))?;
        }
        std::fs::rename(&temp_path, &self.path).map_err(|e| CheckpointError::io(&self.path, e))?;

        tracing::debug!(target: "pipeline::checkpoint", path = %self.path.display(), rows = records.len(), "Saved checkpoint");
        Ok(())
    }
}

impl CheckpointSink for CheckpointStore {
    fn persist(&self, records: &[TrackRecord]) -> Result<(), CheckpointError> {
        self.save(records)
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Checkpoint persistence errors
#[derive(Debug, thiserror::Error)]
pub enum CheckpointError {
    #[error("Checkpoint I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid checkpoint row in {path} line {line}: {source}")]
    Parse {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid checkpoint row at line {line}: {reason}")]
    InvalidRow { line: usize, reason: &'static str },

    #[error("Failed to serialize checkpoint row: {0}")]
    Serialize(serde_json::Error),
}

impl CheckpointError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
