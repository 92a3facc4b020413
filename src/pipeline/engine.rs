//! Enrichment engine - attaches artist, audio-feature and contributor data.
//!
//! Rows are visited strictly in order, one at a time:
//! 1. Already enriched rows pass through with no lookups at all
//! 2. Otherwise look up every artist, the audio features and the contributor
//! 3. On success attach the results; on any lookup failure leave the row
//!    unenriched, report it and move on
//!
//! Failed rows are picked up again by the next run. Nothing is retried within
//! a run.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use crate::source::{AudioFeatures, PlaylistSource, SourceError};

use super::checkpoint::CheckpointSink;
use super::domain::{ArtistDetails, BaseTrackRecord, Enrichment, RunSummary, TrackRecord};
use super::reporter::PipelineReporter;

/// Shared flag that asks a running engine to stop before the next row
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Records plus what happened to them
#[derive(Debug, Clone)]
pub struct EnrichmentOutcome {
    /// Same length and order as the input
    pub records: Vec<TrackRecord>,
    pub summary: RunSummary,
}

pub struct EnrichmentEngine<'a> {
    source: &'a dyn PlaylistSource,
    reporter: &'a dyn PipelineReporter,
    checkpoint: Option<&'a dyn CheckpointSink>,
    checkpoint_every: usize,
    cancel: CancellationFlag,
    /// Display names by user id, for this run only
    users: Mutex<HashMap<String, Option<String>>>,
}

impl<'a> EnrichmentEngine<'a> {
    pub fn new(source: &'a dyn PlaylistSource, reporter: &'a dyn PipelineReporter) -> Self {
        Self {
            source,
            reporter,
            checkpoint: None,
            checkpoint_every: 0,
            cancel: CancellationFlag::new(),
            users: Mutex::new(HashMap::new()),
        }
    }

    /// Persist the whole table every `every` newly enriched rows (0 disables)
    pub fn with_checkpoint(mut self, sink: &'a dyn CheckpointSink, every: usize) -> Self {
        self.checkpoint = Some(sink);
        self.checkpoint_every = every;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Enrich every unenriched record. Never fails: lookup errors stay per row.
    pub async fn enrich(&self, mut records: Vec<TrackRecord>) -> EnrichmentOutcome {
        let mut summary = RunSummary {
            total: records.len(),
            ..Default::default()
        };

        for position in 0..records.len() {
            if self.cancel.is_cancelled() {
                tracing::warn!(
                    target: "pipeline::engine",
                    position,
                    "Run cancelled, remaining rows left for the next run"
                );
                summary.cancelled = true;
                break;
            }

            if records[position].is_enriched() {
                summary.already_enriched += 1;
                continue;
            }

            match self.enrich_one(&records[position].base).await {
                Ok(enrichment) => {
                    records[position].enrichment = Some(enrichment);
                    self.reporter
                        .record_enriched(position, &records[position].base);
                    summary.enriched_this_run += 1;

                    if self.checkpoint_every > 0
                        && summary.enriched_this_run % self.checkpoint_every == 0
                    {
                        self.persist(&records);
                    }
                }
                Err(error) => {
                    self.reporter
                        .record_skipped(position, &records[position].base, &error);
                    summary.failed += 1;
                }
            }
        }

        summary.remaining_unenriched = records.iter().filter(|r| !r.is_enriched()).count();
        tracing::info!(
            target: "pipeline::engine",
            total = summary.total,
            enriched_this_run = summary.enriched_this_run,
            already_enriched = summary.already_enriched,
            failed = summary.failed,
            remaining = summary.remaining_unenriched,
            "Enrichment pass finished"
        );

        EnrichmentOutcome { records, summary }
    }

    /// All lookups for one row; any failure discards the partial results
    async fn enrich_one(&self, base: &BaseTrackRecord) -> Result<Enrichment, SourceError> {
        let artists = fetch_artist_details(self.source, &base.artist_uris).await?;
        let audio = fetch_audio_features(self.source, &base.track_id).await?;
        let added_by_name = match base.added_by_id.as_deref() {
            Some(user_id) => self.display_name(user_id).await?,
            None => None,
        };

        Ok(Enrichment {
            artists_genres: artists.genres,
            artists_popularities: artists.popularities,
            artists_avg_popularity: artists.avg_popularity,
            audio,
            added_by_name,
        })
    }

    /// Display name for a user, looked up once per run
    async fn display_name(&self, user_id: &str) -> Result<Option<String>, SourceError> {
        if let Some(cached) = self.users.lock().get(user_id) {
            return Ok(cached.clone());
        }
        let user = self.source.get_user(user_id).await?;
        self.users
            .lock()
            .insert(user_id.to_string(), user.display_name.clone());
        Ok(user.display_name)
    }

    /// Mid-run persistence is best effort; the caller saves again at the end
    fn persist(&self, records: &[TrackRecord]) {
        let Some(sink) = self.checkpoint else {
            return;
        };
        let enriched = records.iter().filter(|r| r.is_enriched()).count();
        match sink.persist(records) {
            Ok(()) => self.reporter.checkpoint_written(records.len(), enriched),
            Err(e) => {
                tracing::warn!(target: "pipeline::checkpoint", error = %e, "Failed to write checkpoint, continuing");
            }
        }
    }
}

/// One artist lookup per URI, in order
pub async fn fetch_artist_details(
    source: &dyn PlaylistSource,
    artist_uris: &[String],
) -> Result<ArtistDetails, SourceError> {
    let mut artists = Vec::with_capacity(artist_uris.len());
    for uri in artist_uris {
        artists.push(source.get_artist(uri).await?);
    }
    Ok(ArtistDetails::from_artists(&artists))
}

/// Audio features for a track; a track without features gets all-null fields
pub async fn fetch_audio_features(
    source: &dyn PlaylistSource,
    track_id: &str,
) -> Result<AudioFeatures, SourceError> {
    Ok(source
        .get_audio_features(track_id)
        .await?
        .unwrap_or_default())
}
