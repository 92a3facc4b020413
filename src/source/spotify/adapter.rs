//! Adapter layer: Convert Spotify DTOs to domain models
//!
//! This is the ONLY place where Spotify DTO types are converted to domain types.

use super::dto;
use crate::source::domain::{ArtistInfo, AudioFeatures, PageCursor, PlaylistPage, UserInfo};

/// Convert a playlist items page into a domain page
pub fn to_playlist_page(page: dto::PlaylistTracksPage) -> PlaylistPage {
    PlaylistPage {
        items: page.items,
        next_cursor: page.next.filter(|next| !next.is_empty()).map(PageCursor),
    }
}

/// Convert an artist response. A missing popularity counts as zero.
pub fn to_artist(artist: dto::Artist) -> ArtistInfo {
    ArtistInfo {
        name: artist.name,
        genres: artist.genres,
        popularity: artist.popularity.unwrap_or(0),
    }
}

/// Convert an audio-features response
pub fn to_audio_features(features: dto::AudioFeatures) -> AudioFeatures {
    AudioFeatures {
        danceability: features.danceability,
        energy: features.energy,
        key: features.key,
        loudness: features.loudness,
        mode: features.mode,
        speechiness: features.speechiness,
        acousticness: features.acousticness,
        instrumentalness: features.instrumentalness,
        liveness: features.liveness,
        valence: features.valence,
        tempo: features.tempo,
        time_signature: features.time_signature,
    }
}

pub fn to_user(user: dto::User) -> UserInfo {
    UserInfo {
        id: user.id,
        display_name: user.display_name,
    }
}
