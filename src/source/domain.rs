//! Domain models for the playlist source.
//!
//! Raw playlist entries are kept close to what the source sends: every field is
//! optional so the parser can decide what is required. Lookup results (artists,
//! audio features, users) are already converted into our own shapes.

use serde::{Deserialize, Serialize};

/// One playlist slot as delivered by the source.
///
/// `track` is `None` when the track was removed or is unavailable.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct RawTrackEntry {
    pub added_at: Option<String>,
    pub added_by: Option<RawUserRef>,
    #[serde(default)]
    pub is_local: bool,
    pub track: Option<RawTrack>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct RawUserRef {
    pub id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct RawTrack {
    pub id: Option<String>,
    pub uri: Option<String>,
    pub name: Option<String>,
    pub duration_ms: Option<u64>,
    pub popularity: Option<u32>,
    pub album: Option<RawAlbum>,
    #[serde(default)]
    pub artists: Vec<RawArtistRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct RawAlbum {
    pub name: Option<String>,
    pub album_type: Option<String>,
    pub release_date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct RawArtistRef {
    pub id: Option<String>,
    pub uri: Option<String>,
    pub name: Option<String>,
}

/// Opaque continuation token for the next page of a playlist.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageCursor(pub String);

impl PageCursor {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A single page of playlist entries.
#[derive(Debug, Clone, Default)]
pub struct PlaylistPage {
    /// Entries in source order. `None` marks a slot the source returned as null.
    pub items: Vec<Option<RawTrackEntry>>,
    /// Cursor for the next page, `None` on the last page
    pub next_cursor: Option<PageCursor>,
}

/// Artist details returned by an artist lookup
#[derive(Debug, Clone, PartialEq)]
pub struct ArtistInfo {
    pub name: String,
    pub genres: Vec<String>,
    pub popularity: u32,
}

/// Acoustic features for a track. Every field is nullable.
///
/// The default value (all `None`) is what a track without features carries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AudioFeatures {
    pub danceability: Option<f64>,
    pub energy: Option<f64>,
    pub key: Option<i32>,
    pub loudness: Option<f64>,
    pub mode: Option<i32>,
    pub speechiness: Option<f64>,
    pub acousticness: Option<f64>,
    pub instrumentalness: Option<f64>,
    pub liveness: Option<f64>,
    pub valence: Option<f64>,
    pub tempo: Option<f64>,
    pub time_signature: Option<i32>,
}

impl AudioFeatures {
    /// True when the source had no features for the track.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Public profile of the user who added a track
#[derive(Debug, Clone, PartialEq)]
pub struct UserInfo {
    pub id: String,
    pub display_name: Option<String>,
}

/// Errors raised by the playlist source.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SourceError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Rate limited - try again later")]
    RateLimited,

    #[error("Not authorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("API request failed with HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),
}

impl SourceError {
    /// Whether the failure is timeout-class and could succeed on a later run.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network(_) | Self::Timeout(_) | Self::RateLimited => true,
            Self::Api { status, .. } => *status >= 500,
            Self::Unauthorized(_) | Self::NotFound(_) | Self::Parse(_) => false,
        }
    }
}

/// Reduce a playlist id, `spotify:playlist:<id>` URI or share link to the bare id.
pub fn playlist_id_from(input: &str) -> &str {
    let input = input.trim();
    let without_query = input.split('?').next().unwrap_or(input);
    let without_query = without_query.trim_end_matches('/');
    if let Some(rest) = without_query.strip_prefix("spotify:playlist:") {
        return rest;
    }
    without_query.rsplit('/').next().unwrap_or(without_query)
}

/// Reduce a `spotify:<kind>:<id>` URI to its id. Bare ids pass through.
pub fn id_from_uri(uri: &str) -> &str {
    uri.rsplit(':').next().unwrap_or(uri)
}
