//! Application-wide error types.
//!
//! Library modules use specific error types via `thiserror`, while
//! CLI/main uses `anyhow` for convenient error propagation.
//!
//! # Design
//!
//! - [`Error`]: Top-level application error enum
//! - Module-specific errors ([`SourceError`], [`PipelineError`],
//!   [`CheckpointError`], [`ConfigError`]) for detailed handling
//! - All errors implement `std::error::Error` for compatibility
//!
//! # Example
//!
//! ```ignore
//! use playlist_enricher::error::{Result, ResultExt};
//!
//! fn load(path: &Path) -> Result<Config> {
//!     config::load_from(path).with_context(format!("loading {}", path.display()))
//! }
//! ```

use crate::config::ConfigError;
use crate::pipeline::{CheckpointError, PipelineError};
use crate::source::SourceError;

/// Application-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level application error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing credentials or unreadable config file
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Playlist source failure outside a pipeline run
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Fatal pipeline error
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// Persisted table could not be read or written
    #[error("Checkpoint error: {0}")]
    Checkpoint(#[from] CheckpointError),

    /// Run interrupted; progress so far was saved
    #[error("Cancelled after {enriched} newly enriched rows")]
    Cancelled { enriched: usize },

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Add context to an error.
    pub fn context(self, ctx: impl Into<String>) -> Self {
        Self::WithContext {
            context: ctx.into(),
            source: Box::new(self),
        }
    }
}

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn with_context(self, ctx: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Io(e).context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, ConfigError> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Config(e).context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, SourceError> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Source(e).context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, PipelineError> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Pipeline(e).context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, CheckpointError> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Checkpoint(e).context(ctx))
    }
}
