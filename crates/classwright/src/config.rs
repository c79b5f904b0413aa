//! Service configuration.
//!
//! Every field has a default matching an installed Vanilla Framework, so an
//! empty TOML document is a valid configuration:
//!
//! ```toml
//! [package]
//! name = "vanilla-framework"
//! stylesheet_dir = "scss"
//! entry_file = "_vanilla.scss"
//!
//! [completion]
//! lookback = 500
//! root_items = true
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::locator::DEFAULT_LOOKBACK;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub package: PackageConfig,
    pub completion: CompletionConfig,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::config("<inline>", e.to_string()))
    }

    /// Read a configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| Error::config(path, e.to_string()))?;
        let config = toml::from_str(&text).map_err(|e| Error::config(path, e.to_string()))?;
        tracing::debug!(target: crate::logging::targets::CONFIG, path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    pub fn package(mut self, package: PackageConfig) -> Self {
        self.package = package;
        self
    }

    pub fn completion(mut self, completion: CompletionConfig) -> Self {
        self.completion = completion;
        self
    }
}

/// Where the component library is installed and how its stylesheets are named.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageConfig {
    /// Package folder name under `node_modules`.
    pub name: String,
    /// Stylesheet folder inside the package.
    pub stylesheet_dir: String,
    /// Entry stylesheet inside `stylesheet_dir`.
    pub entry_file: String,
    /// Stylesheet extension, without the dot.
    pub extension: String,
    /// Folders searched, in order, when the workspace has no installed copy.
    pub fallback_roots: Vec<PathBuf>,
}

impl Default for PackageConfig {
    fn default() -> Self {
        Self {
            name: "vanilla-framework".to_string(),
            stylesheet_dir: "scss".to_string(),
            entry_file: "_vanilla.scss".to_string(),
            extension: "scss".to_string(),
            fallback_roots: vec![],
        }
    }
}

impl PackageConfig {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn stylesheet_dir(mut self, dir: impl Into<String>) -> Self {
        self.stylesheet_dir = dir.into();
        self
    }

    pub fn entry_file(mut self, file: impl Into<String>) -> Self {
        self.entry_file = file.into();
        self
    }

    pub fn extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn fallback_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.fallback_roots.push(root.into());
        self
    }

    /// Path of the entry stylesheet relative to a project root.
    pub fn entry_path(&self) -> PathBuf {
        Path::new("node_modules")
            .join(&self.name)
            .join(&self.stylesheet_dir)
            .join(&self.entry_file)
    }
}

/// Completion behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    /// How many characters before the cursor are searched for an open
    /// class attribute.
    pub lookback: usize,
    /// Append the package's top-level classes after the ranked ones.
    pub root_items: bool,
    /// Host and path of the documentation site, without scheme.
    pub docs_base: String,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            lookback: DEFAULT_LOOKBACK,
            root_items: true,
            docs_base: "vanillaframework.io/docs".to_string(),
        }
    }
}

impl CompletionConfig {
    pub fn lookback(mut self, chars: usize) -> Self {
        self.lookback = chars;
        self
    }

    pub fn root_items(mut self, enable: bool) -> Self {
        self.root_items = enable;
        self
    }

    pub fn docs_base(mut self, base: impl Into<String>) -> Self {
        self.docs_base = base.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_default() {
        assert_eq!(Config::from_toml_str("").unwrap(), Config::default());
    }

    #[test]
    fn partial_document_keeps_other_defaults() {
        let config = Config::from_toml_str(
            r#"
            [package]
            name = "my-lib"
            fallback_roots = ["/opt/share/my-lib"]

            [completion]
            root_items = false
            "#,
        )
        .unwrap();

        assert_eq!(config.package.name, "my-lib");
        assert_eq!(config.package.entry_file, "_vanilla.scss");
        assert_eq!(config.package.fallback_roots, vec![PathBuf::from("/opt/share/my-lib")]);
        assert!(!config.completion.root_items);
        assert_eq!(config.completion.lookback, 500);
    }

    #[test]
    fn invalid_document_is_a_config_error() {
        let err = Config::from_toml_str("[completion]\nlookback = \"far\"").unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("classwright.toml");
        std::fs::write(&path, "[completion]\nlookback = 120\n").unwrap();

        assert_eq!(Config::from_file(&path).unwrap().completion.lookback, 120);
        assert!(matches!(
            Config::from_file(dir.path().join("missing.toml")),
            Err(Error::Config { .. })
        ));
    }

    #[test]
    fn builders() {
        let config = Config::new()
            .package(PackageConfig::default().name("lib").stylesheet_dir("sass").entry_file("index.scss"))
            .completion(CompletionConfig::default().lookback(80));

        assert_eq!(
            config.package.entry_path(),
            Path::new("node_modules").join("lib").join("sass").join("index.scss")
        );
        assert_eq!(config.completion.lookback, 80);
    }
}
