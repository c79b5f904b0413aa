//! Stylesheet parsing.
//!
//! Turns preprocessed-stylesheet text into a closed [`Node`] tree. Only the
//! structure is recovered (declarations, at-rules, rules and comments with
//! their source spans); values and selectors are kept as raw text.

mod node;
mod scss_parser;
mod source;

use std::fmt;
use std::path::Path;

pub use node::{AtRule, Comment, Declaration, Node, Rule, Span};
pub use scss_parser::{parse_stylesheet, split_selectors};

use crate::Error;

/// Grammar failure with its 1-based position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub message: String,
    pub line: u32,
    pub column: u32,
}

impl SyntaxError {
    pub(crate) fn at(source: &str, offset: usize, message: impl Into<String>) -> Self {
        let (line, column) = source::line_column(source, offset);
        Self {
            message: message.into(),
            line,
            column,
        }
    }

    /// Attach the file the error came from.
    pub fn into_error(self, path: &Path) -> Error {
        Error::parse(path, self.message, self.line, self.column)
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.line, self.column, self.message)
    }
}

impl std::error::Error for SyntaxError {}
