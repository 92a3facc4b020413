//! Configuration system using TOML files.
//!
//! Config is stored in the OS-standard config directory:
//! - Windows: %APPDATA%\playlist-enricher\config.toml
//! - macOS: ~/Library/Application Support/playlist-enricher/config.toml
//! - Linux: ~/.config/playlist-enricher/config.toml
//!
//! A different file can be named with `--config`. Credentials live in named
//! profiles so several API apps can be used side by side:
//!
//! ```toml
//! [credentials.spotify]
//! client_id = "..."
//! client_secret = "..."
//!
//! [pipeline]
//! checkpoint_every = 25
//! merge_policy = "prefer_checkpoint"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Profile used when none is given on the command line
pub const DEFAULT_PROFILE: &str = "spotify";

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// API credentials by profile name
    pub credentials: BTreeMap<String, Credentials>,

    /// Playlist source settings
    pub source: SourceConfig,

    /// Pipeline behaviour
    pub pipeline: PipelineConfig,
}

/// Client-credentials pair for the Web API
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

impl Credentials {
    /// Both halves present and non-blank
    pub fn is_complete(&self) -> bool {
        !self.client_id.trim().is_empty() && !self.client_secret.trim().is_empty()
    }
}

// Keep the secret out of logs and panics
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// Playlist source settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Web API base URL
    pub api_base_url: String,

    /// Token endpoint for the client-credentials flow
    pub auth_url: String,

    /// Entries requested per playlist page (1-100)
    pub page_size: u32,

    /// Per-request timeout; expiry surfaces as a transient lookup error
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.spotify.com/v1".to_string(),
            auth_url: "https://accounts.spotify.com/api/token".to_string(),
            page_size: 100,
            timeout_secs: 30,
        }
    }
}

/// How a checkpointed enriched row is combined with its freshly fetched base row
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum MergePolicy {
    /// The checkpointed row wins wholesale, stale base columns included
    #[default]
    PreferCheckpoint,
    /// Fresh base columns, checkpointed enrichment columns
    RefreshBase,
}

/// Pipeline behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Persist the table after this many newly enriched rows (0 = only at the end)
    pub checkpoint_every: usize,

    /// Merge policy for already enriched rows
    pub merge_policy: MergePolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            checkpoint_every: 25,
            merge_policy: MergePolicy::PreferCheckpoint,
        }
    }
}

impl Config {
    /// Resolve credentials for a profile, letting explicit values override the file.
    ///
    /// Fails before any request is made if either half is missing.
    pub fn resolve_credentials(
        &self,
        profile: &str,
        client_id: Option<&str>,
        client_secret: Option<&str>,
    ) -> Result<Credentials, ConfigError> {
        let from_file = self.credentials.get(profile).cloned().unwrap_or_default();
        let resolved = Credentials {
            client_id: client_id.map(str::to_string).unwrap_or(from_file.client_id),
            client_secret: client_secret
                .map(str::to_string)
                .unwrap_or(from_file.client_secret),
        };

        if resolved.is_complete() {
            Ok(resolved)
        } else {
            Err(ConfigError::MissingCredentials(profile.to_string()))
        }
    }
}

// ============================================================================
// Config File Operations
// ============================================================================

/// Get the config directory path
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("playlist-enricher"))
}

/// Get the full path to the default config file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Load configuration from the default location
///
/// Returns default config if the file doesn't exist or can't be parsed.
/// Logs warnings but doesn't fail - we always return a usable config.
pub fn load() -> Config {
    let Some(path) = config_path() else {
        tracing::warn!(target: "config", "Could not determine config directory, using defaults");
        return Config::default();
    };

    if !path.exists() {
        tracing::info!(target: "config", "No config file found at {:?}, using defaults", path);
        return Config::default();
    }

    match load_from(&path) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(target: "config", "{}", e);
            tracing::warn!(target: "config", "Using default configuration");
            Config::default()
        }
    }
}

/// Load configuration from an explicitly named file
///
/// Unlike [`load`], a missing or broken file is an error.
pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
    let contents =
        std::fs::read_to_string(path).map_err(|e| ConfigError::Read(path.to_path_buf(), e))?;
    let config =
        toml::from_str(&contents).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))?;
    tracing::info!(target: "config", "Loaded config from {:?}", path);
    Ok(config)
}

/// Save configuration to disk
///
/// Creates the parent directory if it doesn't exist.
pub fn save(config: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| ConfigError::CreateDir(dir.to_path_buf(), e))?;
    }

    let contents = toml::to_string_pretty(config).map_err(ConfigError::Serialize)?;

    // Write atomically (write to temp, then rename)
    let temp_path = path.with_extension("toml.tmp");
    std::fs::write(&temp_path, &contents).map_err(|e| ConfigError::Write(temp_path.clone(), e))?;
    std::fs::rename(&temp_path, path)
        .map_err(|e| ConfigError::Rename(temp_path, path.to_path_buf(), e))?;

    tracing::info!(target: "config", "Saved config to {:?}", path);
    Ok(())
}

// ============================================================================
// Error Types
// ============================================================================

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("No credentials for profile '{0}' (set client_id and client_secret in the config file or SPOTIFY_CLIENT_ID / SPOTIFY_CLIENT_SECRET)")]
    MissingCredentials(String),

    #[error("Failed to read config file {0}: {1}")]
    Read(PathBuf, std::io::Error),

    #[error("Failed to parse config file {0}: {1}")]
    Parse(PathBuf, toml::de::Error),

    #[error("Failed to create config directory {0}: {1}")]
    CreateDir(PathBuf, std::io::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(toml::ser::Error),

    #[error("Failed to write config to {0}: {1}")]
    Write(PathBuf, std::io::Error),

    #[error("Failed to rename temp file {0} to {1}: {2}")]
    Rename(PathBuf, PathBuf, std::io::Error),
}

// ============================================================================
// Tests
// ============================================================================
