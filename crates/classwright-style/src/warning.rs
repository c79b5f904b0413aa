//! Recoverable load problems.

use std::fmt;
use std::path::PathBuf;

/// A problem that did not stop the load.
///
/// Warnings are kept on the model for diagnostics and logged as they occur;
/// they never reach completion results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadWarning {
    /// An `@import` matched no file; the import was skipped.
    ImportNotResolved { import: String, from: PathBuf },
    /// An imported file exists but could not be read; the import was skipped.
    UnreadableImport { path: PathBuf, message: String },
    /// An `@include` matched no mixin; it contributes nothing.
    IncludeNotResolved { mixin: String, name: String },
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ImportNotResolved { import, from } => {
                write!(f, "couldn't find the imported file {import} while loading {}", from.display())
            }
            Self::UnreadableImport { path, message } => {
                write!(f, "couldn't read the imported file {}: {message}", path.display())
            }
            Self::IncludeNotResolved { mixin, name } => {
                write!(f, "failed to resolve the included mixin {name} in {mixin}")
            }
        }
    }
}
