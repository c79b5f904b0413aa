//! Loading a stylesheet package into a [`StyleModel`].
//!
//! Loading runs in three steps: the import graph is read with every mixin
//! body turned into class trees, `@include`s are resolved once all mixin
//! names are known, and finally included trees are merged into the mixins
//! that include them.

mod graph;
mod ingest;

use std::path::Path;

pub use graph::{ModuleGraph, ModuleGraphBuilder, resolve_import};
pub use ingest::{TopLevel, classify, import_paths, read_stylesheet};

use crate::Result;
use crate::model::{ModelIndex, StyleModel};
use crate::resolve::{link_dependencies, resolve_includes};

/// Options for loading a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderOptions {
    /// Stylesheet file extension, without the dot.
    pub extension: String,
    /// Name of the entry module. Defaults to the entry file's stem.
    pub namespace: Option<String>,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            extension: "scss".to_string(),
            namespace: None,
        }
    }
}

impl LoaderOptions {
    /// Set the stylesheet extension.
    pub fn extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Set the entry module name.
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }
}

/// Load the package whose entry stylesheet is `entry`.
pub fn load_package(entry: &Path, options: &LoaderOptions) -> Result<StyleModel> {
    tracing::info!(target: "classwright_style::loader", entry = %entry.display(), "Parsing stylesheet package");

    let ModuleGraph {
        modules,
        mut mixins,
        trees,
        root,
        mut warnings,
    } = ModuleGraphBuilder::new(options).build(entry)?;

    let index = ModelIndex::build(root, &modules, &mixins, &trees);
    resolve_includes(&modules, &index, &mut mixins, &mut warnings);
    link_dependencies(&index, &mut mixins);

    tracing::info!(
        target: "classwright_style::loader",
        modules = modules.len(),
        mixins = index.all_mixins.len(),
        classes = index.all_class_trees.len(),
        warnings = warnings.len(),
        "Finished parsing stylesheet package"
    );

    Ok(StyleModel {
        modules,
        mixins,
        trees,
        root,
        index,
        warnings,
    })
}
