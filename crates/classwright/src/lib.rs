//! Class-name completion for component-library stylesheets.
//!
//! Classwright loads a component library's SCSS sources (by default the
//! Vanilla Framework, found under `node_modules`) and suggests class names
//! while markup is being written:
//!
//! - **Context**: finds the element under the cursor and checks that the
//!   cursor sits in an open `class`, `className` or `[ngClass]` value
//! - **Ranking**: BEM continuations of the parent's classes first, then
//!   classes nested under matched ancestors, then every top-level class
//! - **Variables**: stylesheet documents complete the library's variables
//! - **Reloading**: in the background (feature `tokio`) or when the
//!   stylesheets change on disk (feature `hot-reload`)
//!
//! # Example
//!
//! ```ignore
//! use classwright::prelude::*;
//!
//! let service = CompletionService::new(Config::default());
//! service.load(Some(Path::new(".")))?;
//!
//! let text = r#"<div class="p-card"><img class="p-card__"#;
//! let candidates = service.complete(&CompletionRequest {
//!     uri: "file:///index.html".into(),
//!     language: DocumentLanguage::Markup,
//!     text: text.into(),
//!     position: Position::new(0, text.len() as u32),
//! });
//! for candidate in candidates {
//!     println!("{} {}", candidate.sort_text, candidate.label);
//! }
//! ```

pub mod config;
pub mod docs;
pub mod locator;
pub mod logging;
pub mod markup;
pub mod package;
pub mod ranking;
pub mod service;

mod error;

pub use error::{Error, Result};
pub use service::{
    CandidateKind, CompletionCandidate, CompletionRequest, CompletionService, DocumentLanguage,
};

/// Prelude module with commonly used types.
pub mod prelude {
    pub use crate::config::{CompletionConfig, Config, PackageConfig};
    pub use crate::locator::Position;
    pub use crate::service::{
        CandidateKind, CompletionCandidate, CompletionRequest, CompletionService,
        DocumentLanguage,
    };
    pub use crate::{Error, Result};
    pub use classwright_style::StyleModel;
}
