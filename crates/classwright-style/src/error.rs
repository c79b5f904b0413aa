//! Error types for stylesheet loading.

use std::path::PathBuf;

/// Result type alias for stylesheet operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building a style model.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The component library could not be found from the starting folder.
    #[error("Failed to locate the stylesheet package from '{start}'")]
    PackageNotFound { start: PathBuf },

    /// An `@import` did not resolve to a file on disk.
    #[error("Failed to resolve the import '{import}' from '{}'", from.display())]
    ImportNotResolved { import: String, from: PathBuf },

    /// The stylesheet grammar rejected the file.
    #[error("Stylesheet parse error in '{}' at line {line}, column {column}: {message}", path.display())]
    Parse {
        path: PathBuf,
        message: String,
        line: u32,
        column: u32,
    },

    /// File I/O error.
    #[error("Failed to read stylesheet '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Hot-reload error.
    #[cfg(feature = "hot-reload")]
    #[error("Hot-reload error: {0}")]
    HotReload(String),
}

impl Error {
    /// Create a parse error.
    pub fn parse(
        path: impl Into<PathBuf>,
        message: impl Into<String>,
        line: u32,
        column: u32,
    ) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
            line,
            column,
        }
    }

    /// Create an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create an unresolved import error.
    pub fn import_not_resolved(import: impl Into<String>, from: impl Into<PathBuf>) -> Self {
        Self::ImportNotResolved {
            import: import.into(),
            from: from.into(),
        }
    }

    /// Returns true for failures a nested import may recover from by being skipped.
    pub fn is_recoverable_import(&self) -> bool {
        matches!(self, Self::ImportNotResolved { .. } | Self::Io { .. })
    }
}
