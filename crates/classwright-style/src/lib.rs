//! Stylesheet-to-model compiler for Classwright.
//!
//! This crate reads a component library's preprocessed stylesheets and
//! builds a [`StyleModel`] of the classes it defines:
//!
//! - **Parsing**: SCSS structure (rules, at-rules, declarations, comments)
//!   without evaluating values
//! - **Import graph**: `@import` resolution with partials, loading each file
//!   once even when files import each other
//! - **Mixins**: class trees per `@mixin`, `&suffix` expansion and
//!   `@include` merging
//! - **Indexing**: flattened views of every mixin, variable and class
//! - **Hot Reload**: watch a package for edits (feature `hot-reload`)
//!
//! # Example
//!
//! ```ignore
//! use classwright_style::prelude::*;
//!
//! let model = StyleModel::load("node_modules/vanilla-framework/scss/_vanilla.scss", &LoaderOptions::default())?;
//! if let Some((_, tree)) = model.find_class_tree("p-card") {
//!     println!("{}", tree.selector);
//! }
//! ```

pub mod loader;
pub mod model;
pub mod parser;
pub mod resolve;

#[cfg(feature = "hot-reload")]
pub mod hot_reload;

mod error;
mod warning;

pub use error::{Error, Result};
pub use model::StyleModel;
pub use warning::LoadWarning;

/// Prelude module with commonly used types.
pub mod prelude {
    pub use crate::loader::LoaderOptions;
    pub use crate::model::{
        ClassName, ClassTree, ClassTreeId, MixinId, ModuleId, StyleBloc, StyleModel, StyleModule,
        Variable,
    };
    pub use crate::{Error, LoadWarning, Result};

    #[cfg(feature = "hot-reload")]
    pub use crate::hot_reload::{ChangeKind, StylesheetChangeEvent, StylesheetWatcher};
}
