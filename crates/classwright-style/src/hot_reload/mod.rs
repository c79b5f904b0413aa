//! Hot-reload support for stylesheet packages.
//!
//! This module is only available with the `hot-reload` feature.

mod watcher;

pub use watcher::{ChangeKind, StylesheetChangeEvent, StylesheetWatcher};
