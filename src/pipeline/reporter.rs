//! Structured pipeline events.
//!
//! The merger and the engine report what happened to each row through a
//! [`PipelineReporter`] passed in by the caller. Production runs use
//! [`TracingReporter`]; tests use [`RecordingReporter`] to assert on events.

use crate::source::SourceError;

use super::domain::BaseTrackRecord;

/// Receiver for pipeline events
pub trait PipelineReporter: Send + Sync {
    /// A row went from unenriched to enriched
    fn record_enriched(&self, position: usize, track: &BaseTrackRecord);

    /// A row's lookups failed; it stays unenriched
    fn record_skipped(&self, position: usize, track: &BaseTrackRecord, error: &SourceError);

    /// The merge could not use the checkpoint
    fn merge_degraded(&self, reason: &str);

    /// The table was persisted mid-run
    fn checkpoint_written(&self, rows: usize, enriched: usize);
}

/// Emits every event as a `tracing` event
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl PipelineReporter for TracingReporter {
    fn record_enriched(&self, position: usize, track: &BaseTrackRecord) {
        tracing::info!(
            target: "pipeline::engine",
            event = "record_enriched",
            position,
            track_id = %track.track_id,
            "Enriched {} - {}",
            track.name,
            track.artist_label
        );
    }

    fn record_skipped(&self, position: usize, track: &BaseTrackRecord, error: &SourceError) {
        if error.is_transient() {
            tracing::warn!(
                target: "pipeline::engine",
                event = "record_skipped",
                position,
                track_id = %track.track_id,
                transient = true,
                error = %error,
                "Lookup failed, leaving {} unenriched",
                track.name
            );
        } else {
            tracing::error!(
                target: "pipeline::engine",
                event = "record_skipped",
                position,
                track_id = %track.track_id,
                transient = false,
                error = %error,
                "Lookup failed, leaving {} unenriched",
                track.name
            );
        }
    }

    fn merge_degraded(&self, reason: &str) {
        tracing::warn!(target: "pipeline::merge", event = "merge_degraded", reason, "Merge degraded");
    }

    fn checkpoint_written(&self, rows: usize, enriched: usize) {
        tracing::debug!(
            target: "pipeline::checkpoint",
            event = "checkpoint_written",
            rows,
            enriched,
            "Checkpoint written"
        );
    }
}

/// An event captured by [`RecordingReporter`]
#[cfg(test)]
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    RecordEnriched { position: usize, track_id: String },
    RecordSkipped { position: usize, track_id: String, transient: bool },
    MergeDegraded { reason: String },
    CheckpointWritten { rows: usize, enriched: usize },
}

/// Collects events in memory for assertions.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingReporter {
    events: parking_lot::Mutex<Vec<PipelineEvent>>,
}

#[cfg(test)]
impl RecordingReporter {
    pub fn events(&self) -> Vec<PipelineEvent> {
        self.events.lock().clone()
    }

    pub fn skipped_ids(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                PipelineEvent::RecordSkipped { track_id, .. } => Some(track_id),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
impl PipelineReporter for RecordingReporter {
    fn record_enriched(&self, position: usize, track: &BaseTrackRecord) {
        self.events.lock().push(PipelineEvent::RecordEnriched {
            position,
            track_id: track.track_id.clone(),
        });
    }

    fn record_skipped(&self, position: usize, track: &BaseTrackRecord, error: &SourceError) {
        self.events.lock().push(PipelineEvent::RecordSkipped {
            position,
            track_id: track.track_id.clone(),
            transient: error.is_transient(),
        });
    }

    fn merge_degraded(&self, reason: &str) {
        self.events.lock().push(PipelineEvent::MergeDegraded {
            reason: reason.to_string(),
        });
    }

    fn checkpoint_written(&self, rows: usize, enriched: usize) {
        self.events
            .lock()
            .push(PipelineEvent::CheckpointWritten { rows, enriched });
    }
}
