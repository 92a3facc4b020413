//! Table statistics command.

use std::path::Path;

use crate::error::ResultExt;
use crate::pipeline::{CheckpointStore, TrackRecord};
use crate::stats::{self, ContributorItems, ItemColumn, ItemCount, NumericColumn};

/// Print counts, per-contributor tops and averages for a persisted table
pub fn cmd_stats(input: &Path, top: usize) -> anyhow::Result<()> {
    let table = CheckpointStore::new(input)
        .load()
        .with_context(format!("Reading {}", input.display()))?
        .ok_or_else(|| anyhow::anyhow!("No table at {}", input.display()))?;
    let records = &table.rows;

    println!("{} tracks, {} enriched", records.len(), table.enriched_count());

    println!();
    println!("Top artists:");
    print_counts(&stats::count_items(records, ItemColumn::Artists), top);

    println!();
    println!("Top genres:");
    print_counts(&stats::count_items(records, ItemColumn::Genres), top);

    for (label, column) in [("artists", ItemColumn::Artists), ("genres", ItemColumn::Genres)] {
        println!();
        println!("Top {} by contributor:", label);
        print_contributor_items(&stats::top_items_by_contributor(records, column, top));
    }

    println!();
    println!("Averages by contributor:");
    print_averages(records);

    println!();
    println!("Tracks added per month:");
    for (month, count) in stats::tracks_per_month_added(records) {
        println!("  {}  {}", month, count);
    }

    Ok(())
}

fn print_counts(counts: &[ItemCount], top: usize) {
    if counts.is_empty() {
        println!("  (none)");
    }
    for count in counts.iter().take(top) {
        println!("  {:>4}  {}", count.count, count.item);
    }
}

fn print_contributor_items(groups: &[ContributorItems]) {
    for group in groups {
        let items: Vec<String> = group
            .top
            .iter()
            .map(|c| format!("{} ({})", c.item, c.count))
            .collect();
        println!(
            "  {} - {} unique: {}",
            group.contributor,
            group.unique_items,
            items.join(", ")
        );
    }
}

fn print_averages(records: &[TrackRecord]) {
    for column in NumericColumn::ALL {
        let averages = stats::average_by_contributor(records, column);
        if averages.is_empty() {
            continue;
        }
        println!("  {}:", column.label());
        for average in averages {
            println!(
                "    {:<20} {:>10.3}  (n={})",
                average.contributor, average.mean, average.samples
            );
        }
    }
}
