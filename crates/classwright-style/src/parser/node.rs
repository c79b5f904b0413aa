//! Syntax tree produced by the stylesheet parser.

/// Source location of a node.
///
/// `start` and `end` are byte offsets into the original text, `line` and
/// `column` are 1-based and point at `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: u32,
    pub column: u32,
}

/// A node of a parsed stylesheet.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// `prop: value;`
    Declaration(Declaration),
    /// `@name params;` or `@name params { ... }`
    AtRule(AtRule),
    /// `selector, selector { ... }`
    Rule(Rule),
    /// `/* ... */` or `// ...`
    Comment(Comment),
}

impl Node {
    /// Source span of the node.
    pub fn span(&self) -> Span {
        match self {
            Self::Declaration(decl) => decl.span,
            Self::AtRule(rule) => rule.span,
            Self::Rule(rule) => rule.span,
            Self::Comment(comment) => comment.span,
        }
    }

    /// The node as a rule, if it is one.
    pub fn as_rule(&self) -> Option<&Rule> {
        match self {
            Self::Rule(rule) => Some(rule),
            _ => None,
        }
    }

    /// The node as an at-rule with the given name, if it is one.
    pub fn as_at_rule(&self, name: &str) -> Option<&AtRule> {
        match self {
            Self::AtRule(rule) if rule.name == name => Some(rule),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub prop: String,
    pub value: String,
    pub span: Span,
}

impl Declaration {
    /// Whether this declares a preprocessor variable (`$name: value`).
    pub fn is_variable(&self) -> bool {
        self.prop.starts_with('$')
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AtRule {
    /// Name without the `@`.
    pub name: String,
    pub params: String,
    /// Block contents, `None` for statement at-rules ending in `;`.
    pub nodes: Option<Vec<Node>>,
    pub span: Span,
}

impl AtRule {
    /// Child nodes, empty for statement at-rules.
    pub fn children(&self) -> &[Node] {
        self.nodes.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    /// Raw selector text as written.
    pub selector: String,
    /// Comma separated selectors, trimmed.
    pub selectors: Vec<String>,
    pub nodes: Vec<Node>,
    pub span: Span,
}

impl Rule {
    /// Nested rules, in source order.
    pub fn child_rules(&self) -> impl Iterator<Item = &Rule> {
        self.nodes.iter().filter_map(Node::as_rule)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    /// Comment body without the delimiters.
    pub text: String,
    pub span: Span,
}

impl Comment {
    /// Comment text with doc-block decoration removed.
    ///
    /// Leading `*` on each line is stripped and blank edges are trimmed, so
    /// `/**\n * Card pattern\n */` becomes `Card pattern`.
    pub fn cleaned(&self) -> String {
        self.text
            .lines()
            .map(|line| {
                let line = line.trim_start();
                line.strip_prefix('*').unwrap_or(line).trim()
            })
            .collect::<Vec<_>>()
            .join("\n")
            .trim()
            .to_string()
    }
}
