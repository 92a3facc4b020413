//! CLI command definitions and dispatch.
//!
//! Each subcommand is implemented in its own submodule:
//! - `enrich`: Fetch, merge, enrich and persist a playlist table
//! - `overlap`: Compare two playlists
//! - `stats`: Summaries of a persisted table
//! - `config`: Inspect or initialize the config file

mod config;
mod enrich;
mod overlap;
mod stats;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio::runtime::Runtime;

use crate::config::{Config, DEFAULT_PROFILE, MergePolicy};
use crate::error::ResultExt;
use crate::source::SpotifyClient;

pub use config::cmd_check_config;
pub use enrich::cmd_enrich;
pub use overlap::cmd_overlap;
pub use stats::cmd_stats;

/// Playlist Enricher CLI
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file to use instead of the one in the OS config directory
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Credential profile from the config file
    #[arg(long, global = true, default_value = DEFAULT_PROFILE)]
    pub profile: String,

    /// Client id, overrides the profile (or set SPOTIFY_CLIENT_ID env var)
    #[arg(long, global = true, env = "SPOTIFY_CLIENT_ID", hide_env_values = true)]
    pub client_id: Option<String>,

    /// Client secret, overrides the profile (or set SPOTIFY_CLIENT_SECRET env var)
    #[arg(long, global = true, env = "SPOTIFY_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,

    /// Debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Fetch a playlist and enrich it, resuming from an existing table
    Enrich {
        /// Playlist id, spotify:playlist: URI or share link
        #[arg(short, long)]
        playlist: String,
        /// Table to resume from and write to (JSON Lines)
        #[arg(short, long)]
        output: PathBuf,
        /// Persist after this many newly enriched rows (0 = only at the end)
        #[arg(long)]
        checkpoint_every: Option<usize>,
        /// How checkpointed rows combine with freshly fetched ones
        #[arg(long, value_enum)]
        merge_policy: Option<MergePolicy>,
    },
    /// Track overlap between two playlists
    Overlap {
        /// First playlist (denominator of the hype overlap)
        first: String,
        /// Second playlist
        second: String,
    },
    /// Print statistics for a persisted table
    Stats {
        /// Table written by `enrich`
        #[arg(short, long)]
        input: PathBuf,
        /// Items to list per contributor
        #[arg(long, default_value = "5")]
        top: usize,
    },
    /// Show where config is read from and which profiles are usable
    CheckConfig {
        /// Write a template config file if none exists
        #[arg(long)]
        init: bool,
    },
}

/// Run the specified CLI command.
pub fn run_command(cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Enrich {
            playlist,
            output,
            checkpoint_every,
            merge_policy,
        } => {
            let rt = Runtime::new()?;
            cmd_enrich(&rt, cli, playlist, output, *checkpoint_every, *merge_policy)
        }
        Commands::Overlap { first, second } => {
            let rt = Runtime::new()?;
            cmd_overlap(&rt, cli, first, second)
        }
        Commands::Stats { input, top } => cmd_stats(input, *top),
        Commands::CheckConfig { init } => cmd_check_config(cli, *init),
    }
}

// ============================================================================
// Shared helper functions
// ============================================================================

/// Config named by `--config`, or the default file (lenient)
pub(crate) fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    match &cli.config {
        Some(path) => Ok(crate::config::load_from(path)
            .with_context(format!("Loading --config {}", path.display()))?),
        None => Ok(crate::config::load()),
    }
}

/// Authenticated client for the selected profile.
///
/// Fails before any request when credentials are missing.
pub(crate) fn build_client(cli: &Cli, config: &Config) -> anyhow::Result<SpotifyClient> {
    let credentials = config.resolve_credentials(
        &cli.profile,
        cli.client_id.as_deref(),
        cli.client_secret.as_deref(),
    )?;
    Ok(SpotifyClient::new(credentials, &config.source)?)
}
