//! Command-line interface for playlist-enricher.
//!
//! Commands for enriching a playlist into a resumable table, comparing two
//! playlists, summarizing a table and checking the configuration.

mod commands;

pub use commands::{Cli, Commands, run_command};
