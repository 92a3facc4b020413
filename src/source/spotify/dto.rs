//! Spotify Web API Data Transfer Objects
//!
//! These types match what the Web API returns for the endpoints we call.
//! DO NOT use these types outside the spotify module - convert to domain types.
//! Playlist entries are the exception: they are passed on as
//! [`RawTrackEntry`] so the parser owns the required-field checks.
//!
//! API Reference: https://developer.spotify.com/documentation/web-api
//!
//! Example playlist items page:
//! ```json
//! {
//!   "href": "https://api.spotify.com/v1/playlists/abc/tracks?offset=0&limit=100",
//!   "items": [{
//!     "added_at": "2023-01-05T10:00:00Z",
//!     "added_by": {"id": "user-1"},
//!     "is_local": false,
//!     "track": {"id": "t1", "name": "Song", "duration_ms": 222222, "...": "..."}
//!   }],
//!   "limit": 100,
//!   "next": "https://api.spotify.com/v1/playlists/abc/tracks?offset=100&limit=100",
//!   "offset": 0,
//!   "total": 237
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::source::domain::RawTrackEntry;

/// Response of the client-credentials token exchange
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    /// Lifetime in seconds
    pub expires_in: u64,
}

/// One page of `GET /playlists/{id}/tracks`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlaylistTracksPage {
    #[serde(default)]
    pub items: Vec<Option<RawTrackEntry>>,
    /// Full URL of the next page, null on the last page
    pub next: Option<String>,
    pub offset: Option<u32>,
    pub total: Option<u32>,
}

/// `GET /artists/{id}`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Artist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub genres: Vec<String>,
    pub popularity: Option<u32>,
}

/// `GET /audio-features/{id}`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AudioFeatures {
    pub id: Option<String>,
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

/// `GET /users/{id}`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct User {
    pub id: String,
    pub display_name: Option<String>,
}

/// Error body returned by the Web API
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ErrorBody {
    pub status: u16,
    pub message: String,
}
