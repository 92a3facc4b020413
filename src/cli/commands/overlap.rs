//! Playlist overlap command.

use tokio::runtime::Runtime;

use crate::error::ResultExt;
use crate::pipeline::{OverlapCalculator, PaginatedFetcher};
use crate::source::playlist_id_from;

use super::{Cli, build_client, load_config};

/// Print symmetric and hype overlap of two playlists
pub fn cmd_overlap(rt: &Runtime, cli: &Cli, first: &str, second: &str) -> anyhow::Result<()> {
    let config = load_config(cli)?;
    let client = build_client(cli, &config)?;
    let first = playlist_id_from(first);
    let second = playlist_id_from(second);

    let report = rt
        .block_on(OverlapCalculator::new(PaginatedFetcher::new(&client)).compare(first, second))
        .with_context(format!("Comparing {} with {}", first, second))?;

    println!("{}: {} tracks", first, report.first_len);
    println!("{}: {} tracks", second, report.second_len);
    println!();
    println!("Symmetric overlap: {:.2}%", report.symmetric);
    println!("Hype overlap:      {:.2}% of {}", report.hype, first);
    Ok(())
}
