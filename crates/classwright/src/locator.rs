//! Finding what the cursor is on.

use std::sync::OnceLock;

use regex::RegexSet;
use ropey::Rope;

use crate::markup::{MarkupDocument, NodeId};

/// Default number of characters searched before the cursor.
pub const DEFAULT_LOOKBACK: usize = 500;

/// An editor position: zero-based line and UTF-16 column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    pub fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

/// Byte offset of `position` in `text`.
///
/// Lines end at `\n`, `\r\n` or `\r`; other Unicode line separators are
/// ordinary characters. A column past the end of its line is clamped to the
/// line end. Returns `None` for a line past the end of the text.
pub fn offset_at(text: &str, position: Position) -> Option<usize> {
    let rope = Rope::from_str(text);
    let line = position.line as usize;
    if line >= rope.len_lines() {
        return None;
    }

    let line_start = rope.line_to_char(line);
    let slice = rope.line(line);
    let chars = slice.len_chars();
    let mut line_break = 0;
    while line_break < chars && matches!(slice.char(chars - 1 - line_break), '\n' | '\r') {
        line_break += 1;
    }
    let line_len = slice.len_utf16_cu() - line_break;
    let column = (position.character as usize).min(line_len);

    let char_idx = rope.utf16_cu_to_char(rope.char_to_utf16_cu(line_start) + column);
    Some(rope.char_to_byte(char_idx))
}

/// The innermost element whose range contains `offset`.
///
/// Descends from the document into the first child element whose range
/// holds the offset, ends included, until no child does.
pub fn locate_element(document: &MarkupDocument, offset: usize) -> Option<NodeId> {
    let mut found = None;
    let mut current = document.root();

    while let Some(child) = document.child_elements(current).find(|&child| {
        let range = &document.node(child).range;
        range.start <= offset && offset <= range.end
    }) {
        found = Some(child);
        current = child;
    }
    found
}

fn class_attribute_patterns() -> &'static RegexSet {
    static PATTERNS: OnceLock<RegexSet> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        RegexSet::new([
            r#"\bclass\s*=\s*(?:"[^"]*|'[^']*)?$"#,
            r#"\bclassName\s*=\s*(?:"[^"]*|'[^']*|\{[^}]*)?$"#,
            r#"\[ngClass\]\s*=\s*(?:"[^"]*|'[^']*)?$"#,
        ])
        .expect("class attribute patterns are valid")
    })
}

/// Whether `offset` is inside a class attribute value of `element` that is
/// still open at the cursor.
///
/// Only the `lookback` characters before the cursor are searched, and never
/// text before the element's start.
pub fn is_inside_class_attribute(
    document: &MarkupDocument,
    element: NodeId,
    text: &str,
    offset: usize,
    lookback: usize,
) -> bool {
    class_attribute_open(text, offset, document.node(element).range.start, lookback)
}

/// Whether the text before `offset` ends in an open class attribute,
/// looking no further back than `floor`.
pub fn class_attribute_open(text: &str, offset: usize, floor: usize, lookback: usize) -> bool {
    let offset = floor_char_boundary(text, offset.min(text.len()));
    let before = &text[..offset];
    let window_start = match lookback {
        0 => offset,
        n => before.char_indices().rev().nth(n - 1).map_or(0, |(i, _)| i),
    };
    let start = floor_char_boundary(text, window_start.max(floor).min(offset));

    class_attribute_patterns().is_match(&text[start..offset])
}

fn floor_char_boundary(text: &str, mut index: usize) -> usize {
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}
