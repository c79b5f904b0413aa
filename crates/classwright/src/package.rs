//! Finding the installed component library.

use std::path::{Path, PathBuf};

use crate::config::PackageConfig;
use crate::logging::targets;

/// Find the package's entry stylesheet.
///
/// Looks for `node_modules/<name>/<stylesheet_dir>/<entry_file>` in `start`
/// and each of its ancestors, then in each configured fallback root and its
/// ancestors. Returns the first existing file.
pub fn locate_package(start: Option<&Path>, config: &PackageConfig) -> Option<PathBuf> {
    let relative = config.entry_path();

    let found = start
        .into_iter()
        .chain(config.fallback_roots.iter().map(PathBuf::as_path))
        .find_map(|root| find_up(root, &relative));

    match &found {
        Some(entry) => {
            tracing::debug!(target: targets::PACKAGE, entry = %entry.display(), "Found stylesheet package");
        }
        None => {
            tracing::warn!(
                target: targets::PACKAGE,
                package = %config.name,
                start = ?start,
                "Couldn't find an installed stylesheet package"
            );
        }
    }
    found
}

fn find_up(start: &Path, relative: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(relative))
        .find(|candidate| candidate.is_file())
}
