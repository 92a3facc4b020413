//! Playlist enrichment command.

use std::path::Path;
use tokio::runtime::Runtime;

use crate::config::MergePolicy;
use crate::error::{Error, ResultExt};
use crate::pipeline::{
    CancellationFlag, CheckpointStore, PipelineRunner, RunSummary, TracingReporter,
};
use crate::source::playlist_id_from;

use super::{Cli, build_client, load_config};

/// Fetch, merge, enrich and persist one playlist
pub fn cmd_enrich(
    rt: &Runtime,
    cli: &Cli,
    playlist: &str,
    output: &Path,
    checkpoint_every: Option<usize>,
    merge_policy: Option<MergePolicy>,
) -> anyhow::Result<()> {
    let config = load_config(cli)?;
    let client = build_client(cli, &config)?;

    let mut pipeline = config.pipeline.clone();
    if let Some(every) = checkpoint_every {
        pipeline.checkpoint_every = every;
    }
    if let Some(policy) = merge_policy {
        pipeline.merge_policy = policy;
    }

    let playlist_id = playlist_id_from(playlist);
    let store = CheckpointStore::new(output);
    let cancel = CancellationFlag::new();

    println!("Enriching playlist {} -> {}", playlist_id, output.display());
    println!();

    let outcome = rt
        .block_on(async {
            let interrupt = tokio::spawn(cancel_on_ctrl_c(cancel.clone()));
            let result = PipelineRunner::new(&client, &TracingReporter, &store, pipeline)
                .with_cancellation(cancel.clone())
                .run(playlist_id)
                .await;
            interrupt.abort();
            result
        })
        .with_context(format!("Enriching playlist {}", playlist_id))?;

    print_summary(&outcome.summary);
    println!();
    println!("✓ Table written to {}", store.path().display());

    if outcome.summary.cancelled {
        return Err(Error::Cancelled {
            enriched: outcome.summary.enriched_this_run,
        }
        .into());
    }
    Ok(())
}

/// Stop the engine before its next row on Ctrl-C
async fn cancel_on_ctrl_c(cancel: CancellationFlag) {
    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::warn!(target: "pipeline::engine", "Interrupt received, stopping after the current row");
        cancel.cancel();
    }
}

fn print_summary(summary: &RunSummary) {
    println!("Tracks:             {}", summary.total);
    println!("Enriched this run:  {}", summary.enriched_this_run);
    println!("Already enriched:   {}", summary.already_enriched);
    if summary.failed > 0 {
        println!("✗ Failed lookups:   {}", summary.failed);
    }
    if summary.remaining_unenriched > 0 {
        println!(
            "Still unenriched:   {} (run again to retry)",
            summary.remaining_unenriched
        );
    } else {
        println!("✓ Every track is enriched");
    }
    if summary.cancelled {
        println!("✗ Cancelled before the end of the playlist");
    }
}
