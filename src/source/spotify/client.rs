//! Spotify Web API HTTP client
//!
//! Handles communication with the Spotify Web API.
//! See: https://developer.spotify.com/documentation/web-api
//!
//! ## Authentication
//! Uses the client-credentials flow. The access token is cached and refreshed
//! shortly before it expires. A 401 drops the cached token so the next request
//! fetches a new one.
//!
//! ## Pagination
//! The playlist items endpoint returns a full `next` URL. We hand that URL out
//! as the page cursor and request it verbatim.

use std::time::{Duration, Instant};

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;

use super::{adapter, dto};
use crate::config::{Credentials, SourceConfig};
use crate::source::domain::{
    ArtistInfo, AudioFeatures, PageCursor, PlaylistPage, SourceError, UserInfo, id_from_uri,
};

/// Refresh the token this long before the server says it expires
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// The playlist items endpoint caps `limit` at 100
pub const MAX_PAGE_SIZE: u32 = 100;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

struct AccessToken {
    value: String,
    expires_at: Instant,
}

/// Spotify Web API client
pub struct SpotifyClient {
    http_client: reqwest::Client,
    credentials: Credentials,
    api_base_url: String,
    auth_url: String,
    page_size: u32,
    token: Mutex<Option<AccessToken>>,
}

impl SpotifyClient {
    /// Create a new client
    ///
    /// The client is configured to:
    /// - Accept gzip-compressed responses
    /// - Time out individual requests after `timeout_secs`
    pub fn new(credentials: Credentials, config: &SourceConfig) -> Result<Self, SourceError> {
        let http_client = reqwest::Client::builder()
            .gzip(true)
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SourceError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            credentials,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            auth_url: config.auth_url.clone(),
            page_size: config.page_size.clamp(1, MAX_PAGE_SIZE),
            token: Mutex::new(None),
        })
    }

    /// Fetch one page of playlist items
    pub async fn playlist_page(
        &self,
        playlist_id: &str,
        cursor: Option<&PageCursor>,
    ) -> Result<PlaylistPage, SourceError> {
        let url = match cursor {
            Some(cursor) => cursor.as_str().to_string(),
            None => self.first_page_url(playlist_id),
        };
        tracing::debug!(target: "source::spotify", %url, "Fetching playlist page");

        let page: dto::PlaylistTracksPage = self.get_json(&url).await?;
        Ok(adapter::to_playlist_page(page))
    }

    /// Look up an artist by id or URI
    pub async fn artist(&self, artist_id: &str) -> Result<ArtistInfo, SourceError> {
        let url = format!(
            "{}/artists/{}",
            self.api_base_url,
            urlencoding::encode(id_from_uri(artist_id))
        );
        let artist: dto::Artist = self.get_json(&url).await?;
        Ok(adapter::to_artist(artist))
    }

    /// Look up audio features; a 404 or null body means the track has none
    pub async fn audio_features(
        &self,
        track_id: &str,
    ) -> Result<Option<AudioFeatures>, SourceError> {
        let url = format!(
            "{}/audio-features/{}",
            self.api_base_url,
            urlencoding::encode(id_from_uri(track_id))
        );
        match self.get_json::<Option<dto::AudioFeatures>>(&url).await {
            Ok(features) => Ok(features.map(adapter::to_audio_features)),
            Err(SourceError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Look up a user's public profile
    pub async fn user(&self, user_id: &str) -> Result<UserInfo, SourceError> {
        let url = format!(
            "{}/users/{}",
            self.api_base_url,
            urlencoding::encode(user_id)
        );
        let user: dto::User = self.get_json(&url).await?;
        Ok(adapter::to_user(user))
    }

    fn first_page_url(&self, playlist_id: &str) -> String {
        format!(
            "{}/playlists/{}/tracks?limit={}&offset=0",
            self.api_base_url,
            urlencoding::encode(playlist_id),
            self.page_size
        )
    }

    /// Send an authorized GET and decode the JSON body
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, SourceError> {
        let token = self.access_token().await?;

        let response = self
            .http_client
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            if status == StatusCode::UNAUTHORIZED {
                self.token.lock().await.take();
            }
            let body = response.text().await.unwrap_or_default();
            return Err(map_status(status, &body, url));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| SourceError::Parse(e.to_string()))
    }

    /// Return a valid access token, exchanging credentials if needed
    async fn access_token(&self) -> Result<String, SourceError> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref()
            && token.expires_at > Instant::now()
        {
            return Ok(token.value.clone());
        }

        tracing::debug!(target: "source::spotify", "Requesting access token");
        let response = self
            .http_client
            .post(&self.auth_url)
            .basic_auth(
                &self.credentials.client_id,
                Some(&self.credentials.client_secret),
            )
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // The token endpoint answers bad credentials with 400 invalid_client
            if status == StatusCode::BAD_REQUEST || status == StatusCode::UNAUTHORIZED {
                return Err(SourceError::Unauthorized(truncate(&body)));
            }
            return Err(map_status(status, &body, &self.auth_url));
        }

        let token: dto::TokenResponse = response
            .json()
            .await
            .map_err(|e| SourceError::Parse(e.to_string()))?;

        let lifetime = Duration::from_secs(token.expires_in).saturating_sub(TOKEN_EXPIRY_MARGIN);
        let value = token.access_token;
        *cached = Some(AccessToken {
            value: value.clone(),
            expires_at: Instant::now() + lifetime,
        });
        Ok(value)
    }
}

fn map_transport_error(e: reqwest::Error) -> SourceError {
    if e.is_timeout() {
        SourceError::Timeout(e.to_string())
    } else {
        SourceError::Network(e.to_string())
    }
}

/// Map a non-success HTTP status to a source error
fn map_status(status: StatusCode, body: &str, url: &str) -> SourceError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            SourceError::Unauthorized(error_message(body).unwrap_or_else(|| status.to_string()))
        }
        StatusCode::NOT_FOUND => SourceError::NotFound(url.to_string()),
        StatusCode::TOO_MANY_REQUESTS => SourceError::RateLimited,
        _ => SourceError::Api {
            status: status.as_u16(),
            message: error_message(body).unwrap_or_else(|| {
                status.canonical_reason().unwrap_or("Unknown").to_string()
            }),
        },
    }
}

/// Pull the message out of a Web API error body, if it is one
fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<dto::ErrorResponse>(body)
        .ok()
        .map(|e| e.error.message)
        .or_else(|| (!body.is_empty()).then(|| truncate(body)))
}

fn truncate(body: &str) -> String {
    body.chars().take(200).collect()
}
