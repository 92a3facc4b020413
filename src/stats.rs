//! Summary statistics over a persisted table.
//!
//! Everything here is a pure function of the records. Tracks are attributed
//! to their contributor ([`TrackRecord::contributor`]); tracks with no
//! contributor at all are left out of the per-contributor figures.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::DateTime;

use crate::pipeline::TrackRecord;

/// Multi-valued column to count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemColumn {
    Artists,
    /// Genres of every credited artist, flattened
    Genres,
}

impl ItemColumn {
    fn items(self, record: &TrackRecord) -> Vec<&str> {
        match self {
            Self::Artists => record.base.artist_names.iter().map(String::as_str).collect(),
            Self::Genres => record
                .enrichment
                .iter()
                .flat_map(|e| e.artists_genres.iter().flatten())
                .map(String::as_str)
                .collect(),
        }
    }
}

/// Numeric column to average
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericColumn {
    DurationMs,
    TrackPopularity,
    ArtistsAvgPopularity,
    Danceability,
    Energy,
    Loudness,
    Speechiness,
    Acousticness,
    Instrumentalness,
    Liveness,
    Valence,
    Tempo,
}

impl NumericColumn {
    pub const ALL: [NumericColumn; 12] = [
        Self::DurationMs,
        Self::TrackPopularity,
        Self::ArtistsAvgPopularity,
        Self::Danceability,
        Self::Energy,
        Self::Loudness,
        Self::Speechiness,
        Self::Acousticness,
        Self::Instrumentalness,
        Self::Liveness,
        Self::Valence,
        Self::Tempo,
    ];

    /// Column name as written in the table
    pub fn label(self) -> &'static str {
        match self {
            Self::DurationMs => "duration_ms",
            Self::TrackPopularity => "track_popularity",
            Self::ArtistsAvgPopularity => "artists_avg_popularity",
            Self::Danceability => "danceability",
            Self::Energy => "energy",
            Self::Loudness => "loudness",
            Self::Speechiness => "speechiness",
            Self::Acousticness => "acousticness",
            Self::Instrumentalness => "instrumentalness",
            Self::Liveness => "liveness",
            Self::Valence => "valence",
            Self::Tempo => "tempo",
        }
    }

    fn value(self, record: &TrackRecord) -> Option<f64> {
        let base = &record.base;
        let enrichment = record.enrichment.as_ref();
        let audio = enrichment.map(|e| &e.audio);
        match self {
            Self::DurationMs => base.duration_ms.map(|v| v as f64),
            Self::TrackPopularity => base.track_popularity.map(f64::from),
            Self::ArtistsAvgPopularity => enrichment.and_then(|e| e.artists_avg_popularity),
            Self::Danceability => audio.and_then(|a| a.danceability),
            Self::Energy => audio.and_then(|a| a.energy),
            Self::Loudness => audio.and_then(|a| a.loudness),
            Self::Speechiness => audio.and_then(|a| a.speechiness),
            Self::Acousticness => audio.and_then(|a| a.acousticness),
            Self::Instrumentalness => audio.and_then(|a| a.instrumentalness),
            Self::Liveness => audio.and_then(|a| a.liveness),
            Self::Valence => audio.and_then(|a| a.valence),
            Self::Tempo => audio.and_then(|a| a.tempo),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemCount {
    pub item: String,
    pub count: usize,
}

/// Items one contributor brought to the playlist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContributorItems {
    pub contributor: String,
    pub unique_items: usize,
    pub top: Vec<ItemCount>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContributorAverage {
    pub contributor: String,
    pub mean: f64,
    /// Non-null cells that went into the mean
    pub samples: usize,
}

/// Occurrences of each artist or genre, most frequent first, ties by name
pub fn count_items(records: &[TrackRecord], column: ItemColumn) -> Vec<ItemCount> {
    tally(records.iter().flat_map(|r| column.items(r)))
}

/// Per contributor: number of distinct items and the `top` most frequent ones
pub fn top_items_by_contributor(
    records: &[TrackRecord],
    column: ItemColumn,
    top: usize,
) -> Vec<ContributorItems> {
    by_contributor(records)
        .into_iter()
        .map(|(contributor, records)| {
            let items: Vec<&str> = records.iter().flat_map(|r| column.items(r)).collect();
            let unique_items = items.iter().collect::<HashSet<_>>().len();
            let mut counts = tally(items);
            counts.truncate(top);
            ContributorItems {
                contributor: contributor.to_string(),
                unique_items,
                top: counts,
            }
        })
        .collect()
}

/// Mean of a numeric column per contributor, skipping null cells.
///
/// Contributors with no non-null cell are omitted.
pub fn average_by_contributor(
    records: &[TrackRecord],
    column: NumericColumn,
) -> Vec<ContributorAverage> {
    by_contributor(records)
        .into_iter()
        .filter_map(|(contributor, records)| {
            let values: Vec<f64> = records.iter().filter_map(|r| column.value(r)).collect();
            if values.is_empty() {
                return None;
            }
            Some(ContributorAverage {
                contributor: contributor.to_string(),
                mean: values.iter().sum::<f64>() / values.len() as f64,
                samples: values.len(),
            })
        })
        .collect()
}

/// Tracks added per calendar month (`YYYY-MM`), oldest first.
///
/// Rows without a parsable `added_at` are skipped.
pub fn tracks_per_month_added(records: &[TrackRecord]) -> BTreeMap<String, usize> {
    let mut months = BTreeMap::new();
    for record in records {
        let Some(added_at) = record.base.added_at.as_deref() else {
            continue;
        };
        match DateTime::parse_from_rfc3339(added_at) {
            Ok(timestamp) => {
                *months
                    .entry(timestamp.format("%Y-%m").to_string())
                    .or_insert(0) += 1;
            }
            Err(e) => {
                tracing::debug!(
                    target: "stats",
                    track_id = %record.base.track_id,
                    added_at,
                    error = %e,
                    "Skipping unparsable added_at"
                );
            }
        }
    }
    months
}

/// Records grouped by contributor, contributors sorted by name
fn by_contributor(records: &[TrackRecord]) -> BTreeMap<&str, Vec<&TrackRecord>> {
    let mut groups: BTreeMap<&str, Vec<&TrackRecord>> = BTreeMap::new();
    for record in records {
        if let Some(contributor) = record.contributor() {
            groups.entry(contributor).or_default().push(record);
        }
    }
    groups
}

fn tally<'a>(items: impl IntoIterator<Item = &'a str>) -> Vec<ItemCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for item in items {
        *counts.entry(item).or_insert(0) += 1;
    }
    let mut counts: Vec<ItemCount> = counts
        .into_iter()
        .map(|(item, count)| ItemCount {
            item: item.to_string(),
            count,
        })
        .collect();
    counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.item.cmp(&b.item)));
    counts
}
