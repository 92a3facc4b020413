//! Spotify Web API integration
//!
//! Provides playlist pages, artist details, audio features and user profiles.
//!
//! API docs: https://developer.spotify.com/documentation/web-api

pub mod dto;
mod adapter;
mod client;

pub use client::{MAX_PAGE_SIZE, SpotifyClient};
