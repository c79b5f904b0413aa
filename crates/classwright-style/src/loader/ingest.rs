//! Reading one stylesheet and sorting its top-level statements.

use std::path::Path;

use crate::model::Variable;
use crate::parser::{AtRule, Node, parse_stylesheet};
use crate::resolve::variable;
use crate::{Error, Result};

/// A top-level statement the loader cares about.
#[derive(Debug)]
pub enum TopLevel<'a> {
    Variable(Variable),
    /// Paths of an `@import`, quotes removed, plain-CSS imports dropped.
    Import(Vec<String>),
    Mixin {
        rule: &'a AtRule,
        description: Option<String>,
    },
}

/// Read and parse a stylesheet file.
pub fn read_stylesheet(path: &Path) -> Result<Vec<Node>> {
    let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    parse_stylesheet(&text).map_err(|e| e.into_error(path))
}

/// Sort top-level nodes into variables, imports and mixins.
///
/// A comment directly before a variable or mixin becomes its description.
/// Plain rules and other at-rules are skipped.
pub fn classify(nodes: &[Node]) -> Vec<TopLevel<'_>> {
    let mut items = vec![];
    let mut pending_comment = None;

    for node in nodes {
        if let Node::Comment(comment) = node {
            pending_comment = Some(comment.cleaned());
            continue;
        }
        let comment = pending_comment.take();

        match node {
            Node::Declaration(decl) if decl.is_variable() => {
                items.push(TopLevel::Variable(variable(decl, comment)));
            }
            Node::AtRule(rule) if rule.name == "import" => {
                items.push(TopLevel::Import(import_paths(&rule.params)));
            }
            Node::AtRule(rule) if rule.name == "mixin" => {
                items.push(TopLevel::Mixin {
                    rule,
                    description: comment,
                });
            }
            Node::AtRule(_) | Node::Declaration(_) | Node::Rule(_) | Node::Comment(_) => {}
        }
    }
    items
}

/// Stylesheet paths named by `@import` params.
///
/// `@import 'a', "b";` names two files. Imports Sass leaves to the browser
/// (`url(...)`, `.css` files, remote URLs) are skipped.
pub fn import_paths(params: &str) -> Vec<String> {
    split_top_level_commas(params)
        .into_iter()
        .filter_map(|part| {
            let part = part.trim();
            if part.starts_with("url(") {
                tracing::debug!(target: "classwright_style::loader", import = part, "Skipping CSS import");
                return None;
            }
            let path = part.trim_matches(|c| c == '"' || c == '\'').trim();
            if path.is_empty()
                || path.ends_with(".css")
                || path.starts_with("http://")
                || path.starts_with("https://")
                || path.starts_with("//")
            {
                tracing::debug!(target: "classwright_style::loader", import = part, "Skipping CSS import");
                return None;
            }
            Some(path.to_string())
        })
        .collect()
}

fn split_top_level_commas(params: &str) -> Vec<&str> {
    let mut parts = vec![];
    let mut quote = None;
    let mut depth = 0usize;
    let mut start = 0;

    for (i, c) in params.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '(') => depth += 1,
            (None, ')') => depth = depth.saturating_sub(1),
            (None, ',') if depth == 0 => {
                parts.push(&params[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&params[start..]);
    parts
}
