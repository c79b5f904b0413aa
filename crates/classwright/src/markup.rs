//! A lenient markup scanner.
//!
//! Documents being edited are rarely well formed: the tag under the cursor
//! is usually unterminated. The scanner never fails; it recovers a tree of
//! elements and text with the byte range each covers, which is all the
//! context locator needs.
//!
//! Handled: void and self-closing elements, raw-text elements (`script`,
//! `style`, `textarea`, `title`), comments, doctypes and processing
//! instructions (skipped), quoted, unquoted and JSX `{...}` attribute
//! values. An element left open is closed where its parent closes, or at
//! the end of the text.

use std::ops::Range;

use crate::logging::targets;

/// Handle to a node in a [`MarkupDocument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    Element(Element),
    Text,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Tag name as written.
    pub tag: String,
    pub attributes: Vec<Attribute>,
    /// Tokens of the `class` or `className` string value, each once.
    pub class_list: Vec<String>,
}

impl Element {
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    /// Value without its quotes or braces. `None` for a bare attribute.
    pub value: Option<String>,
    /// Whether the value was written as a JSX expression.
    pub is_expression: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupNode {
    pub kind: NodeKind,
    /// Bytes covered by the node, from `<` to the end of its closing tag.
    pub range: Range<usize>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

impl MarkupNode {
    pub fn element(&self) -> Option<&Element> {
        match &self.kind {
            NodeKind::Element(element) => Some(element),
            NodeKind::Document | NodeKind::Text => None,
        }
    }

    pub fn is_element(&self) -> bool {
        self.element().is_some()
    }
}

/// A scanned document.
#[derive(Debug, Clone)]
pub struct MarkupDocument {
    nodes: Vec<MarkupNode>,
}

const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

const RAW_TEXT_TAGS: &[&str] = &["script", "style", "textarea", "title"];

impl MarkupDocument {
    /// Scan `text` into a node tree.
    pub fn parse(text: &str) -> Self {
        Scanner::new(text).run()
    }

    /// The document node; its range spans the whole text.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &MarkupNode {
        &self.nodes[id.0]
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        self.node(id).element()
    }

    /// The closest element above `id`.
    pub fn parent_element(&self, id: NodeId) -> Option<NodeId> {
        self.ancestors(id).next()
    }

    /// Elements above `id`, innermost first.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.node(id).parent, |&id| self.node(id).parent)
            .filter(|&id| self.node(id).is_element())
    }

    /// Element children of `id`.
    pub fn child_elements(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.node(id)
            .children
            .iter()
            .copied()
            .filter(|&child| self.node(child).is_element())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }
}

struct Scanner<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
    nodes: Vec<MarkupNode>,
    /// Open elements, innermost last. The document node is never popped.
    open: Vec<NodeId>,
}

impl<'a> Scanner<'a> {
    fn new(text: &'a str) -> Self {
        let root = MarkupNode {
            kind: NodeKind::Document,
            range: 0..text.len(),
            parent: None,
            children: vec![],
        };
        Self {
            text,
            bytes: text.as_bytes(),
            pos: 0,
            nodes: vec![root],
            open: vec![NodeId(0)],
        }
    }

    fn run(mut self) -> MarkupDocument {
        while self.pos < self.bytes.len() {
            if self.bytes[self.pos] == b'<' {
                self.markup();
            } else {
                self.text_run();
            }
        }

        let end = self.text.len();
        while self.open.len() > 1 {
            if let Some(id) = self.open.pop() {
                self.nodes[id.0].range.end = end;
            }
        }
        MarkupDocument { nodes: self.nodes }
    }

    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn current(&self) -> NodeId {
        self.open.last().copied().unwrap_or(NodeId(0))
    }

    fn push(&mut self, kind: NodeKind, range: Range<usize>) -> NodeId {
        let parent = self.current();
        let id = NodeId(self.nodes.len());
        self.nodes.push(MarkupNode {
            kind,
            range,
            parent: Some(parent),
            children: vec![],
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    fn text_run(&mut self) {
        let start = self.pos;
        let first = self.rest().chars().next().map_or(1, char::len_utf8);
        self.pos = self.text[start + first..]
            .find('<')
            .map_or(self.bytes.len(), |i| start + first + i);
        self.push(NodeKind::Text, start..self.pos);
    }

    /// Skip to just after `needle`, or to the end of the text.
    fn skip_past(&mut self, needle: &str) {
        self.pos = self
            .rest()
            .find(needle)
            .map_or(self.bytes.len(), |i| self.pos + i + needle.len());
    }

    fn markup(&mut self) {
        let rest = self.rest();
        if rest.starts_with("<!--") {
            self.skip_past("-->");
        } else if rest.starts_with("<!") || rest.starts_with("<?") {
            self.skip_past(">");
        } else if rest.starts_with("</") {
            self.close_tag();
        } else if rest[1..].starts_with(|c: char| c.is_ascii_alphabetic()) {
            self.open_tag();
        } else {
            self.text_run();
        }
    }

    fn close_tag(&mut self) {
        let start = self.pos;
        self.pos += 2;
        let name = self.name();
        self.skip_past(">");

        let Some(depth) = self.open.iter().rposition(|&id| {
            self.nodes[id.0]
                .element()
                .is_some_and(|e| e.tag.eq_ignore_ascii_case(name))
        }) else {
            tracing::trace!(target: targets::MARKUP, tag = name, offset = start, "Ignoring stray closing tag");
            return;
        };

        let end = self.pos;
        for id in self.open.drain(depth..) {
            self.nodes[id.0].range.end = end;
        }
    }

    fn open_tag(&mut self) {
        let start = self.pos;
        self.pos += 1;
        let tag = self.name().to_string();

        let mut attributes = vec![];
        let mut self_closing = false;
        let mut terminated = false;
        while self.pos < self.bytes.len() {
            self.skip_whitespace();
            match self.bytes.get(self.pos) {
                None => break,
                Some(b'>') => {
                    self.pos += 1;
                    terminated = true;
                    break;
                }
                Some(b'/') if self.bytes.get(self.pos + 1) == Some(&b'>') => {
                    self.pos += 2;
                    self_closing = true;
                    terminated = true;
                    break;
                }
                Some(b'/') => self.pos += 1,
                Some(_) => attributes.extend(self.attribute()),
            }
        }

        let class_list = class_list(&attributes);
        let element = Element {
            tag,
            attributes,
            class_list,
        };
        let is_void = VOID_TAGS.iter().any(|t| element.tag.eq_ignore_ascii_case(t));
        let is_raw = RAW_TEXT_TAGS.iter().any(|t| element.tag.eq_ignore_ascii_case(t));
        let tag = element.tag.clone();
        let id = self.push(NodeKind::Element(element), start..self.bytes.len());

        if !terminated {
            // Unterminated start tag at the end of the text.
            return;
        }
        if self_closing || is_void {
            self.nodes[id.0].range.end = self.pos;
            return;
        }
        if is_raw {
            self.raw_text(id, &tag);
            return;
        }
        self.open.push(id);
    }

    fn raw_text(&mut self, id: NodeId, tag: &str) {
        let content_start = self.pos;
        let closing = format!("</{}", tag.to_ascii_lowercase());
        let content_end = self.rest().to_ascii_lowercase().find(&closing).map(|i| self.pos + i);

        let content_end = match content_end {
            Some(end) => end,
            None => self.bytes.len(),
        };
        if content_end > content_start {
            self.open.push(id);
            self.push(NodeKind::Text, content_start..content_end);
            self.open.pop();
        }

        self.pos = content_end;
        if self.pos < self.bytes.len() {
            self.skip_past(">");
        }
        self.nodes[id.0].range.end = self.pos;
    }

    fn attribute(&mut self) -> Option<Attribute> {
        let name_start = self.pos;
        while let Some(&b) = self.bytes.get(self.pos) {
            if b.is_ascii_whitespace() || matches!(b, b'=' | b'>' | b'"' | b'\'') {
                break;
            }
            if b == b'/' && self.bytes.get(self.pos + 1) == Some(&b'>') {
                break;
            }
            self.pos += 1;
        }
        if self.pos == name_start {
            // A stray quote or `=`.
            self.pos += 1;
            return None;
        }
        let name = self.text[name_start..self.pos].to_string();

        let before_equals = self.pos;
        self.skip_whitespace();
        if self.bytes.get(self.pos) != Some(&b'=') {
            self.pos = before_equals;
            return Some(Attribute {
                name,
                value: None,
                is_expression: false,
            });
        }
        self.pos += 1;
        self.skip_whitespace();

        let (value, is_expression) = match self.bytes.get(self.pos) {
            Some(&quote @ (b'"' | b'\'')) => {
                let start = self.pos + 1;
                let end = self.text[start..]
                    .find(quote as char)
                    .map_or(self.bytes.len(), |i| start + i);
                self.pos = (end + 1).min(self.bytes.len());
                (self.text[start..end].to_string(), false)
            }
            Some(b'{') => {
                let start = self.pos + 1;
                let end = self.expression_end(start);
                self.pos = (end + 1).min(self.bytes.len());
                (self.text[start..end].to_string(), true)
            }
            _ => {
                let start = self.pos;
                while let Some(&b) = self.bytes.get(self.pos) {
                    if b.is_ascii_whitespace() || b == b'>' {
                        break;
                    }
                    self.pos += 1;
                }
                (self.text[start..self.pos].to_string(), false)
            }
        };

        Some(Attribute {
            name,
            value: Some(value),
            is_expression,
        })
    }

    /// Offset of the `}` closing a JSX expression that starts at `start`.
    fn expression_end(&self, start: usize) -> usize {
        let mut depth = 1usize;
        let mut quote = None;
        for (i, b) in self.bytes[start..].iter().enumerate() {
            match (quote, *b) {
                (Some(q), b) if b == q => quote = None,
                (Some(_), _) => {}
                (None, b'"' | b'\'' | b'`') => quote = Some(*b),
                (None, b'{') => depth += 1,
                (None, b'}') => {
                    depth -= 1;
                    if depth == 0 {
                        return start + i;
                    }
                }
                _ => {}
            }
        }
        self.bytes.len()
    }

    fn name(&mut self) -> &'a str {
        let start = self.pos;
        while let Some(&b) = self.bytes.get(self.pos) {
            if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b':' | b'.') {
                self.pos += 1;
            } else {
                break;
            }
        }
        &self.text[start..self.pos]
    }

    fn skip_whitespace(&mut self) {
        while self.bytes.get(self.pos).is_some_and(u8::is_ascii_whitespace) {
            self.pos += 1;
        }
    }
}

fn class_list(attributes: &[Attribute]) -> Vec<String> {
    let mut classes: Vec<String> = vec![];
    let values = attributes
        .iter()
        .filter(|a| (a.name == "class" || a.name == "className") && !a.is_expression)
        .filter_map(|a| a.value.as_deref());

    for value in values {
        for token in value.split_whitespace() {
            if !classes.iter().any(|c| c == token) {
                classes.push(token.to_string());
            }
        }
    }
    classes
}
