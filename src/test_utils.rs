//! Test utilities and fixtures for playlist-enricher tests.
//!
//! Provides raw playlist entries, parsed and enriched records, and
//! [`MockSource`], a scripted in-memory [`PlaylistSource`].
//!
//! # Example
//!
//! ```ignore
//! use crate::test_utils::{MockSource, raw_entry};
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let source = MockSource::new()
//!         .with_playlist_pages("p1", &[100, 37])
//!         .failing_track("p1-t3", SourceError::Timeout("read".to_string()));
//!     // ... test logic
//!     assert_eq!(source.calls().pages, 2);
//! }
//! ```

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::pipeline::{BaseTrackRecord, Enrichment, TrackRecord};
use crate::source::domain::{RawAlbum, RawArtistRef, RawTrack, RawUserRef};
use crate::source::{
    ArtistInfo, AudioFeatures, PageCursor, PlaylistPage, PlaylistSource, RawTrackEntry,
    SourceError, UserInfo, id_from_uri,
};

/// Popularity every mock artist reports
pub const ARTIST_POPULARITY: u32 = 70;

/// A raw entry with one artist (`artist-{id}`), added by `user-1`.
///
/// Customize with struct update syntax or by mutating the returned value:
///
/// ```ignore
/// let mut entry = raw_entry("t1");
/// entry.track.as_mut().unwrap().album = None;
/// ```
pub fn raw_entry(track_id: &str) -> RawTrackEntry {
    let artist_id = format!("artist-{}", track_id);
    let artist_name = format!("Artist {}", track_id);
    raw_entry_with_artists(track_id, &[(artist_id.as_str(), artist_name.as_str())])
}

/// A raw entry crediting the given `(artist id, artist name)` pairs
pub fn raw_entry_with_artists(track_id: &str, artists: &[(&str, &str)]) -> RawTrackEntry {
    RawTrackEntry {
        added_at: Some("2023-01-05T10:00:00Z".to_string()),
        added_by: Some(RawUserRef {
            id: Some("user-1".to_string()),
        }),
        is_local: false,
        track: Some(RawTrack {
            id: Some(track_id.to_string()),
            uri: Some(format!("spotify:track:{}", track_id)),
            name: Some(format!("Track {}", track_id)),
            duration_ms: Some(222_222),
            popularity: Some(50),
            album: Some(RawAlbum {
                name: Some(format!("Album {}", track_id)),
                album_type: Some("album".to_string()),
                release_date: Some("2010-06-14".to_string()),
            }),
            artists: artists
                .iter()
                .map(|(id, name)| RawArtistRef {
                    id: Some(id.to_string()),
                    uri: Some(format!("spotify:artist:{}", id)),
                    name: Some(name.to_string()),
                })
                .collect(),
        }),
    }
}

/// The record [`raw_entry`] parses to
pub fn base_record(track_id: &str) -> BaseTrackRecord {
    BaseTrackRecord {
        track_id: track_id.to_string(),
        name: format!("Track {}", track_id),
        artist_label: format!("Artist {}", track_id),
        album: format!("Album {}", track_id),
        album_type: Some("album".to_string()),
        release_date: Some("2010-06-14".to_string()),
        duration_ms: Some(222_222),
        duration_display: Some("3:42".to_string()),
        added_at: Some("2023-01-05T10:00:00Z".to_string()),
        added_by_id: Some("user-1".to_string()),
        track_popularity: Some(50),
        artist_uris: vec![format!("spotify:artist:artist-{}", track_id)],
        artist_names: vec![format!("Artist {}", track_id)],
    }
}

/// [`base_record`] enriched the way [`MockSource`] would enrich it
pub fn enriched_record(track_id: &str) -> TrackRecord {
    TrackRecord {
        base: base_record(track_id),
        enrichment: Some(Enrichment {
            artists_genres: vec![vec![format!("genre-artist-{}", track_id)]],
            artists_popularities: vec![ARTIST_POPULARITY],
            artists_avg_popularity: Some(ARTIST_POPULARITY as f64),
            audio: mock_audio_features(),
            added_by_name: Some("User user-1".to_string()),
        }),
    }
}

/// Features every mock track reports. Values are exact in binary so they
/// survive a JSON round trip unchanged.
pub fn mock_audio_features() -> AudioFeatures {
    AudioFeatures {
        danceability: Some(0.5),
        energy: Some(0.75),
        key: Some(5),
        loudness: Some(-6.5),
        mode: Some(1),
        speechiness: Some(0.125),
        acousticness: Some(0.25),
        instrumentalness: Some(0.0),
        liveness: Some(0.125),
        valence: Some(0.625),
        tempo: Some(120.0),
        time_signature: Some(4),
    }
}

/// Number of source calls made so far, by kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MockCalls {
    pub pages: usize,
    pub artists: usize,
    pub audio_features: usize,
    pub users: usize,
}

impl MockCalls {
    /// Every per-track lookup (artists, features, users)
    pub fn lookups(&self) -> usize {
        self.artists + self.audio_features + self.users
    }
}

/// Scripted in-memory playlist source.
///
/// Playlists are stored as explicit pages; the cursor is the next page
/// index. Unknown playlists answer `NotFound`. Every call is counted before
/// any scripted failure is applied.
#[derive(Default)]
pub struct MockSource {
    playlists: HashMap<String, Vec<Vec<Option<RawTrackEntry>>>>,
    page_failures: HashMap<(String, usize), SourceError>,
    track_failures: HashMap<String, SourceError>,
    artist_failures: HashMap<String, SourceError>,
    lookup_failure: Option<SourceError>,
    featureless: HashSet<String>,
    calls: Mutex<MockCalls>,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Playlist with explicit pages
    pub fn with_playlist(
        mut self,
        playlist_id: &str,
        pages: Vec<Vec<Option<RawTrackEntry>>>,
    ) -> Self {
        self.playlists.insert(playlist_id.to_string(), pages);
        self
    }

    /// Playlist of generated tracks `{playlist_id}-t{n}`, numbered across pages
    pub fn with_playlist_pages(self, playlist_id: &str, page_sizes: &[usize]) -> Self {
        let mut next = 0;
        let pages = page_sizes
            .iter()
            .map(|&size| {
                let page = (next..next + size)
                    .map(|n| Some(raw_entry(&format!("{}-t{}", playlist_id, n))))
                    .collect();
                next += size;
                page
            })
            .collect();
        self.with_playlist(playlist_id, pages)
    }

    /// Fail the request for one page (0-based)
    pub fn failing_page(mut self, playlist_id: &str, page: usize, error: SourceError) -> Self {
        self.page_failures
            .insert((playlist_id.to_string(), page), error);
        self
    }

    /// Fail the audio-features lookup for one track
    pub fn failing_track(mut self, track_id: &str, error: SourceError) -> Self {
        self.track_failures.insert(track_id.to_string(), error);
        self
    }

    /// Fail the lookup for one artist id
    pub fn failing_artist(mut self, artist_id: &str, error: SourceError) -> Self {
        self.artist_failures.insert(artist_id.to_string(), error);
        self
    }

    /// Fail every artist, feature and user lookup; pages still work
    pub fn failing_all_lookups(mut self, error: SourceError) -> Self {
        self.lookup_failure = Some(error);
        self
    }

    /// Report no audio features for one track
    pub fn without_features(mut self, track_id: &str) -> Self {
        self.featureless.insert(track_id.to_string());
        self
    }

    pub fn calls(&self) -> MockCalls {
        *self.calls.lock()
    }

    fn lookup_failure(&self) -> Result<(), SourceError> {
        match &self.lookup_failure {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl PlaylistSource for MockSource {
    async fn get_playlist_page(
        &self,
        playlist_id: &str,
        cursor: Option<&PageCursor>,
    ) -> Result<PlaylistPage, SourceError> {
        self.calls.lock().pages += 1;

        let pages = self
            .playlists
            .get(playlist_id)
            .ok_or_else(|| SourceError::NotFound(format!("playlist {}", playlist_id)))?;
        let index = match cursor {
            Some(cursor) => cursor
                .as_str()
                .parse::<usize>()
                .map_err(|_| SourceError::Parse(format!("bad cursor {}", cursor.as_str())))?,
            None => 0,
        };
        if let Some(error) = self.page_failures.get(&(playlist_id.to_string(), index)) {
            return Err(error.clone());
        }

        Ok(PlaylistPage {
            items: pages.get(index).cloned().unwrap_or_default(),
            next_cursor: (index + 1 < pages.len()).then(|| PageCursor((index + 1).to_string())),
        })
    }

    async fn get_artist(&self, artist_id: &str) -> Result<ArtistInfo, SourceError> {
        self.calls.lock().artists += 1;
        self.lookup_failure()?;

        let id = id_from_uri(artist_id);
        if let Some(error) = self.artist_failures.get(id) {
            return Err(error.clone());
        }
        Ok(ArtistInfo {
            name: format!("Name of {}", id),
            genres: vec![format!("genre-{}", id)],
            popularity: ARTIST_POPULARITY,
        })
    }

    async fn get_audio_features(
        &self,
        track_id: &str,
    ) -> Result<Option<AudioFeatures>, SourceError> {
        self.calls.lock().audio_features += 1;
        self.lookup_failure()?;

        if let Some(error) = self.track_failures.get(track_id) {
            return Err(error.clone());
        }
        if self.featureless.contains(track_id) {
            return Ok(None);
        }
        Ok(Some(mock_audio_features()))
    }

    async fn get_user(&self, user_id: &str) -> Result<UserInfo, SourceError> {
        self.calls.lock().users += 1;
        self.lookup_failure()?;

        Ok(UserInfo {
            id: user_id.to_string(),
            display_name: Some(format!("User {}", user_id)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::parse::parse;

    #[test]
    fn test_base_record_matches_parsed_raw_entry() {
        assert_eq!(parse(&raw_entry("t1"), 0).unwrap(), base_record("t1"));
    }

    #[test]
    fn test_enriched_record_shares_base() {
        let record = enriched_record("t1");
        assert!(record.is_enriched());
        assert_eq!(record.base, base_record("t1"));
    }

    #[tokio::test]
    async fn test_mock_source_pages_and_counts() {
        let source = MockSource::new().with_playlist_pages("p1", &[2, 1]);

        let first = source.get_playlist_page("p1", None).await.unwrap();
        assert_eq!(first.items.len(), 2);
        let second = source
            .get_playlist_page("p1", first.next_cursor.as_ref())
            .await
            .unwrap();
        assert_eq!(second.items.len(), 1);
        assert!(second.next_cursor.is_none());

        assert_eq!(source.calls().pages, 2);
        assert_eq!(source.calls().lookups(), 0);
    }

    #[tokio::test]
    async fn test_mock_source_scripted_failures() {
        let source = MockSource::new()
            .failing_artist("a1", SourceError::RateLimited)
            .without_features("t1");

        assert_eq!(
            source.get_artist("spotify:artist:a1").await,
            Err(SourceError::RateLimited)
        );
        assert_eq!(source.get_audio_features("t1").await, Ok(None));
        assert!(matches!(
            source.get_playlist_page("nope", None).await,
            Err(SourceError::NotFound(_))
        ));
        assert_eq!(source.calls().artists, 1);
    }
}
