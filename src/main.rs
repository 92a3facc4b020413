//! Playlist Enricher - incremental enrichment of playlist track tables.
//!
//! Fetches every track of a playlist, attaches artist, audio-feature and
//! contributor data, and persists the result so interrupted or partially
//! failed runs resume where they left off.

pub mod cli;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod source;
pub mod stats;
#[cfg(test)]
pub mod test_utils;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Log targets enabled by default, in addition to `RUST_LOG`
const LOG_TARGETS: [&str; 5] = ["playlist_enricher", "pipeline", "source", "config", "stats"];

fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    // Initialize logging; stdout is reserved for command output
    let level = if args.verbose { "debug" } else { "info" };
    let mut filter = EnvFilter::from_default_env();
    for target in LOG_TARGETS {
        filter = filter.add_directive(format!("{}={}", target, level).parse()?);
    }
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();

    cli::run_command(&args)
}
