//! Watching a package's stylesheet folder.

use notify::{RecommendedWatcher, RecursiveMode};
use notify_debouncer_mini::{DebouncedEvent, DebouncedEventKind, Debouncer, new_debouncer};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::time::Duration;

use crate::{Error, Result};

/// A stylesheet that changed on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StylesheetChangeEvent {
    pub path: PathBuf,
    pub kind: ChangeKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// Created or modified.
    Modified,
    Removed,
}

/// Reports edits to the stylesheets under one or more folders.
///
/// Any change means the package must be loaded again: a partial can be
/// imported from anywhere, so there is no per-file invalidation.
///
/// # Example
///
/// ```ignore
/// let mut watcher = StylesheetWatcher::new("scss")?;
/// watcher.watch_dir("node_modules/vanilla-framework/scss")?;
///
/// // Later, e.g. on a timer:
/// let changes = watcher.poll();
/// if !changes.is_empty() {
///     service.apply_changes(&changes);
/// }
/// ```
pub struct StylesheetWatcher {
    debouncer: Debouncer<RecommendedWatcher>,
    rx: Receiver<std::result::Result<Vec<DebouncedEvent>, notify::Error>>,
    extension: String,
    watched_dirs: BTreeSet<PathBuf>,
}

impl StylesheetWatcher {
    /// Create a watcher reporting files with the given extension.
    pub fn new(extension: impl Into<String>) -> Result<Self> {
        let (tx, rx) = mpsc::channel();

        let debouncer = new_debouncer(Duration::from_millis(200), tx)
            .map_err(|e| Error::HotReload(e.to_string()))?;

        Ok(Self {
            debouncer,
            rx,
            extension: extension.into(),
            watched_dirs: BTreeSet::new(),
        })
    }

    /// Watch a folder and everything below it.
    pub fn watch_dir(&mut self, dir: impl AsRef<Path>) -> Result<()> {
        let dir = dir
            .as_ref()
            .canonicalize()
            .map_err(|e| Error::io(dir.as_ref(), e))?;

        if !self.watched_dirs.contains(&dir) {
            self.debouncer
                .watcher()
                .watch(&dir, RecursiveMode::Recursive)
                .map_err(|e| Error::HotReload(e.to_string()))?;

            tracing::info!(target: "classwright_style::hot_reload", dir = %dir.display(), "Watching stylesheets");
            self.watched_dirs.insert(dir);
        }

        Ok(())
    }

    /// Stop watching a folder. Unknown folders are ignored.
    pub fn unwatch_dir(&mut self, dir: impl AsRef<Path>) -> Result<()> {
        let Ok(dir) = dir.as_ref().canonicalize() else {
            return Ok(());
        };

        if self.watched_dirs.remove(&dir) {
            self.debouncer
                .watcher()
                .unwatch(&dir)
                .map_err(|e| Error::HotReload(e.to_string()))?;
            tracing::info!(target: "classwright_style::hot_reload", dir = %dir.display(), "Stopped watching stylesheets");
        }

        Ok(())
    }

    /// Drain pending events.
    ///
    /// Returns one event per changed stylesheet, sorted by path. Files with
    /// another extension are left out.
    pub fn poll(&mut self) -> Vec<StylesheetChangeEvent> {
        let mut changes = vec![];

        loop {
            match self.rx.try_recv() {
                Ok(Ok(events)) => {
                    changes.extend(
                        events
                            .into_iter()
                            .filter(|event| event.kind == DebouncedEventKind::Any)
                            .filter(|event| self.is_stylesheet(&event.path))
                            .map(|event| StylesheetChangeEvent {
                                kind: if event.path.exists() {
                                    ChangeKind::Modified
                                } else {
                                    ChangeKind::Removed
                                },
                                path: event.path,
                            }),
                    );
                }
                Ok(Err(e)) => {
                    tracing::warn!(target: "classwright_style::hot_reload", error = %e, "File watcher error");
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    tracing::error!(target: "classwright_style::hot_reload", "File watcher disconnected");
                    break;
                }
            }
        }

        changes.sort_by(|a, b| a.path.cmp(&b.path));
        changes.dedup_by(|a, b| a.path == b.path);
        changes
    }

    fn is_stylesheet(&self, path: &Path) -> bool {
        path.extension().is_some_and(|ext| ext == self.extension.as_str())
    }

    pub fn watched_count(&self) -> usize {
        self.watched_dirs.len()
    }

    pub fn watched_dirs(&self) -> impl Iterator<Item = &Path> {
        self.watched_dirs.iter().map(|p| p.as_path())
    }
}
