//! Trait definition for the playlist source.
//!
//! The pipeline only talks to the source through [`PlaylistSource`], so tests
//! can substitute a scripted in-memory source (see `test_utils::MockSource`)
//! while production code uses [`SpotifyClient`].
//!
//! # Example
//!
//! ```ignore
//! use playlist_enricher::source::PlaylistSource;
//!
//! async fn first_page(source: &dyn PlaylistSource) -> Result<PlaylistPage, SourceError> {
//!     source.get_playlist_page("2flYqzsxSNSIHjCNCphCMw", None).await
//! }
//! ```

use async_trait::async_trait;

use super::domain::{ArtistInfo, AudioFeatures, PageCursor, PlaylistPage, SourceError, UserInfo};
use super::spotify::SpotifyClient;

/// External source of playlist data and per-track lookups.
///
/// Every call is a single blocking-in-spirit request; callers issue them
/// sequentially.
#[async_trait]
pub trait PlaylistSource: Send + Sync {
    /// Fetch one page of playlist entries. `cursor` is `None` for the first page.
    async fn get_playlist_page(
        &self,
        playlist_id: &str,
        cursor: Option<&PageCursor>,
    ) -> Result<PlaylistPage, SourceError>;

    /// Look up an artist by id or `spotify:artist:` URI.
    async fn get_artist(&self, artist_id: &str) -> Result<ArtistInfo, SourceError>;

    /// Look up audio features. `Ok(None)` means the track has none.
    async fn get_audio_features(&self, track_id: &str)
    -> Result<Option<AudioFeatures>, SourceError>;

    /// Look up a user's public profile.
    async fn get_user(&self, user_id: &str) -> Result<UserInfo, SourceError>;
}

#[async_trait]
impl PlaylistSource for SpotifyClient {
    async fn get_playlist_page(
        &self,
        playlist_id: &str,
        cursor: Option<&PageCursor>,
    ) -> Result<PlaylistPage, SourceError> {
        self.playlist_page(playlist_id, cursor).await
    }

    async fn get_artist(&self, artist_id: &str) -> Result<ArtistInfo, SourceError> {
        self.artist(artist_id).await
    }

    async fn get_audio_features(
        &self,
        track_id: &str,
    ) -> Result<Option<AudioFeatures>, SourceError> {
        self.audio_features(track_id).await
    }

    async fn get_user(&self, user_id: &str) -> Result<UserInfo, SourceError> {
        self.user(user_id).await
    }
}
