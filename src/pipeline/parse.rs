//! Raw playlist entry -> base record.
//!
//! Pure functions, no I/O. A missing `track.id`, `track.name` or
//! `track.album.name` is an upstream contract violation and fails the parse.

use crate::source::RawTrackEntry;

use super::domain::{BaseTrackRecord, PipelineError, format_duration};

/// Parse one entry. `position` only feeds the error message.
pub fn parse(entry: &RawTrackEntry, position: usize) -> Result<BaseTrackRecord, PipelineError> {
    let malformed = |field| PipelineError::MalformedRecord { position, field };

    let track = entry.track.as_ref().ok_or_else(|| malformed("track"))?;
    let track_id = track.id.clone().ok_or_else(|| malformed("track.id"))?;
    let name = track.name.clone().ok_or_else(|| malformed("track.name"))?;
    let album = track.album.as_ref();
    let album_name = album
        .and_then(|a| a.name.clone())
        .ok_or_else(|| malformed("track.album.name"))?;

    let artist_names: Vec<String> = track
        .artists
        .iter()
        .map(|a| a.name.clone().unwrap_or_default())
        .collect();
    // Every artist must be resolvable, or the row could never be enriched
    let artist_uris: Vec<String> = track
        .artists
        .iter()
        .map(|a| {
            a.uri
                .clone()
                .filter(|uri| !uri.is_empty())
                .or_else(|| a.id.as_ref().map(|id| format!("spotify:artist:{}", id)))
                .ok_or_else(|| malformed("track.artists.id"))
        })
        .collect::<Result<_, _>>()?;

    Ok(BaseTrackRecord {
        track_id,
        name,
        artist_label: artist_names.join(", "),
        album: album_name,
        album_type: album.and_then(|a| a.album_type.clone()),
        release_date: album.and_then(|a| a.release_date.clone()),
        duration_ms: track.duration_ms,
        duration_display: track.duration_ms.map(format_duration),
        added_at: entry.added_at.clone(),
        added_by_id: entry.added_by.as_ref().and_then(|u| u.id.clone()),
        track_popularity: track.popularity,
        artist_uris,
        artist_names,
    })
}

/// Parse every entry in order, stopping at the first malformed one
pub fn parse_all(entries: &[RawTrackEntry]) -> Result<Vec<BaseTrackRecord>, PipelineError> {
    entries
        .iter()
        .enumerate()
        .map(|(position, entry)| parse(entry, position))
        .collect()
}
