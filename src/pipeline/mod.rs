//! Incremental enrichment pipeline.
//!
//! # Architecture
//!
//! Stages run in order, each consuming the full output of the previous one:
//! - **Fetch** (`fetch.rs`) - walk the paginated playlist
//! - **Parse** (`parse.rs`) - raw entry -> [`BaseTrackRecord`]
//! - **Merge** (`merge.rs`) - carry enrichment forward from the checkpoint
//! - **Enrich** (`engine.rs`) - artist, audio-feature and contributor lookups
//! - **Checkpoint** (`checkpoint.rs`) - the persisted table
//!
//! `overlap.rs` compares two playlists and only uses the fetch stage.
//!
//! # Usage
//!
//! ```ignore
//! use pipeline::{CheckpointStore, PipelineRunner, TracingReporter};
//!
//! let store = CheckpointStore::new("data/playlist.jsonl");
//! let outcome = PipelineRunner::new(&client, &TracingReporter, &store, config.pipeline)
//!     .run("2flYqzsxSNSIHjCNCphCMw")
//!     .await?;
//! println!("{} enriched this run", outcome.summary.enriched_this_run);
//! ```

pub mod checkpoint;
pub mod domain;
pub mod engine;
pub mod fetch;
pub mod merge;
pub mod overlap;
pub mod parse;
pub mod reporter;
pub mod runner;

pub use checkpoint::{CheckpointError, CheckpointStore, CheckpointTable};
pub use domain::{BaseTrackRecord, Enrichment, PipelineError, RunSummary, TrackRecord};
pub use engine::{CancellationFlag, EnrichmentEngine, EnrichmentOutcome};
pub use fetch::PaginatedFetcher;
pub use merge::CheckpointMerger;
pub use overlap::{OverlapCalculator, OverlapReport, asymmetric_overlap, symmetric_overlap};
pub use reporter::{PipelineReporter, TracingReporter};
pub use runner::PipelineRunner;
