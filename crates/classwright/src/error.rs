//! Error types for the completion service.

use std::path::PathBuf;

/// Result type alias for completion service operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while configuring or loading the service.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Loading the stylesheet package failed.
    #[error(transparent)]
    Style(#[from] classwright_style::Error),

    /// The configuration file could not be read or parsed.
    #[error("Invalid configuration '{}': {message}", path.display())]
    Config { path: PathBuf, message: String },

    /// No package has been loaded yet.
    #[error("No stylesheet package is loaded")]
    NotLoaded,

    /// A background load task panicked or was cancelled.
    #[cfg(feature = "tokio")]
    #[error("Background load failed: {0}")]
    Background(String),
}

impl Error {
    /// Create a configuration error.
    pub fn config(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Config {
            path: path.into(),
            message: message.into(),
        }
    }
}
