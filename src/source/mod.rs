//! Playlist source - the external service the pipeline reads from.
//!
//! # Architecture
//!
//! - **Domain models** (`domain.rs`) - Raw playlist entries and lookup results
//! - **Trait** (`traits.rs`) - [`PlaylistSource`], the seam the pipeline depends on
//! - **Spotify** (`spotify/`) - DTOs, adapter and HTTP client for the Web API

pub mod domain;
pub mod spotify;
pub mod traits;

pub use domain::{
    ArtistInfo, AudioFeatures, PageCursor, PlaylistPage, RawTrackEntry, SourceError, UserInfo,
    id_from_uri, playlist_id_from,
};
pub use spotify::SpotifyClient;
pub use traits::PlaylistSource;
