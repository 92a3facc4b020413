//! Full pipeline run: fetch -> parse -> merge -> enrich -> persist.
//!
//! Nothing is written until the playlist has been fetched and parsed in full,
//! so a fatal fetch or parse error leaves the previous checkpoint untouched.
//! Once enrichment starts the table is always written at the end, including
//! after a cancellation.

use crate::config::PipelineConfig;
use crate::source::PlaylistSource;

use super::checkpoint::CheckpointStore;
use super::domain::PipelineError;
use super::engine::{CancellationFlag, EnrichmentEngine, EnrichmentOutcome};
use super::fetch::PaginatedFetcher;
use super::merge::CheckpointMerger;
use super::parse::parse_all;
use super::reporter::PipelineReporter;

pub struct PipelineRunner<'a> {
    source: &'a dyn PlaylistSource,
    reporter: &'a dyn PipelineReporter,
    store: &'a CheckpointStore,
    config: PipelineConfig,
    cancel: CancellationFlag,
}

impl<'a> PipelineRunner<'a> {
    pub fn new(
        source: &'a dyn PlaylistSource,
        reporter: &'a dyn PipelineReporter,
        store: &'a CheckpointStore,
        config: PipelineConfig,
    ) -> Self {
        Self {
            source,
            reporter,
            store,
            config,
            cancel: CancellationFlag::new(),
        }
    }

    pub fn with_cancellation(mut self, cancel: CancellationFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub async fn run(&self, playlist_id: &str) -> Result<EnrichmentOutcome, PipelineError> {
        let entries = PaginatedFetcher::new(self.source)
            .fetch_all_track_entries(playlist_id)
            .await?;
        let fresh = parse_all(&entries)?;
        let prior = self.store.load()?;

        let merged = CheckpointMerger::new(self.reporter, self.config.merge_policy)
            .merge(fresh, prior.as_ref());

        let outcome = EnrichmentEngine::new(self.source, self.reporter)
            .with_checkpoint(self.store, self.config.checkpoint_every)
            .with_cancellation(self.cancel.clone())
            .enrich(merged)
            .await;

        self.store.save(&outcome.records)?;
        tracing::info!(
            target: "pipeline::checkpoint",
            path = %self.store.path().display(),
            rows = outcome.records.len(),
            "Wrote table"
        );
        Ok(outcome)
    }
}
