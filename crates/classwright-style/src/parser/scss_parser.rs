//! Preprocessed-stylesheet parser using the `cssparser` tokenizer.
//!
//! The tokenizer already understands blocks, strings and comments, which is
//! all the structure needed here: everything up to a `;` is a declaration or
//! statement at-rule, everything up to a `{` is a rule prelude or block
//! at-rule prelude. Prelude text is sliced straight from the source so
//! preprocessor syntax (`$vars`, `&--suffix`, `%placeholders`) survives.

use cssparser::{
    ParseError as CssParseError, ParseErrorKind, Parser, ParserInput, SourceLocation,
    SourcePosition, Token,
};

use super::SyntaxError;
use super::node::{AtRule, Comment, Declaration, Node, Rule, Span};
use super::source::prepare;

type NodeResult<'i, T> = Result<T, CssParseError<'i, &'static str>>;

/// How a prelude ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Terminator {
    Semicolon,
    Block,
    End,
}

/// Parse stylesheet text into a node tree.
///
/// Line comments are returned as [`Node::Comment`] in source order, next to
/// block comments. Errors are reported for unbalanced braces, stray `}`,
/// unterminated strings or comments, and blocks without a prelude.
///
/// # Example
///
/// ```
/// use classwright_style::parser::{parse_stylesheet, Node};
///
/// let nodes = parse_stylesheet("@mixin vf-p-card { .p-card { color: red; } }").unwrap();
/// assert!(matches!(&nodes[0], Node::AtRule(rule) if rule.name == "mixin"));
/// ```
pub fn parse_stylesheet(source: &str) -> Result<Vec<Node>, SyntaxError> {
    let prepared = prepare(source)?;
    let mut input = ParserInput::new(&prepared.text);
    let mut parser = Parser::new(&mut input);
    let mut builder = TreeBuilder {
        text: &prepared.text,
        line_comments: &prepared.line_comments,
        next_comment: 0,
    };

    builder.parse_block(&mut parser).map_err(syntax_error)
}

/// Split a selector list on top-level commas.
///
/// Commas nested in parentheses, brackets, interpolation or strings do not
/// split. Block comments are dropped and each selector is trimmed.
pub fn split_selectors(selector: &str) -> Vec<String> {
    let selector = strip_block_comments(selector);
    let mut selectors = vec![];
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut current = String::new();

    for c in selector.chars() {
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                }
            }
            None => match c {
                '"' | '\'' => quote = Some(c),
                '(' | '[' | '{' => depth += 1,
                ')' | ']' | '}' => depth = depth.saturating_sub(1),
                ',' if depth == 0 => {
                    selectors.push(std::mem::take(&mut current));
                    continue;
                }
                _ => {}
            },
        }
        current.push(c);
    }
    selectors.push(current);

    selectors
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

struct TreeBuilder<'s> {
    text: &'s str,
    line_comments: &'s [Comment],
    next_comment: usize,
}

impl TreeBuilder<'_> {
    /// Parse nodes until the end of the current block (or input).
    fn parse_block<'i>(&mut self, parser: &mut Parser<'i, '_>) -> NodeResult<'i, Vec<Node>> {
        let mut nodes = vec![];

        loop {
            let start = parser.position();
            let location = parser.current_source_location();
            let token = match parser.next_including_whitespace_and_comments() {
                Ok(token) => token.clone(),
                Err(_) => break,
            };

            match token {
                Token::WhiteSpace(_) | Token::Semicolon => {}
                Token::Comment(text) => {
                    self.flush_line_comments(start.byte_index(), &mut nodes);
                    nodes.push(Node::Comment(Comment {
                        text: text.to_string(),
                        span: span(start, parser.position(), location),
                    }));
                }
                Token::AtKeyword(name) => {
                    self.flush_line_comments(start.byte_index(), &mut nodes);
                    let rule = self.parse_at_rule(parser, name.to_string(), start, location)?;
                    nodes.push(rule);
                }
                Token::CurlyBracketBlock => {
                    return Err(parser.new_custom_error("block without a selector"));
                }
                Token::CloseCurlyBracket => {
                    return Err(parser.new_custom_error("unexpected `}`"));
                }
                Token::BadString(_) => {
                    return Err(parser.new_custom_error("unterminated string"));
                }
                token => {
                    self.flush_line_comments(start.byte_index(), &mut nodes);
                    let after_hash = matches!(token, Token::Delim('#'));
                    if let Some(node) =
                        self.parse_rule_or_declaration(parser, after_hash, start, location)?
                    {
                        nodes.push(node);
                    }
                }
            }
        }

        self.flush_line_comments(parser.position().byte_index(), &mut nodes);
        Ok(nodes)
    }

    fn parse_at_rule<'i>(
        &mut self,
        parser: &mut Parser<'i, '_>,
        name: String,
        start: SourcePosition,
        location: SourceLocation,
    ) -> NodeResult<'i, Node> {
        let params_start = parser.position().byte_index();
        let (params_end, terminator) = scan_prelude(parser, false)?;
        let params = strip_block_comments(&self.text[params_start..params_end])
            .trim()
            .to_string();

        let nodes = match terminator {
            Terminator::Block => Some(parser.parse_nested_block(|p| self.parse_block(p))?),
            Terminator::Semicolon | Terminator::End => None,
        };

        Ok(Node::AtRule(AtRule {
            name,
            params,
            nodes,
            span: span(start, parser.position(), location),
        }))
    }

    /// Parse a rule or a declaration whose first token was already consumed.
    fn parse_rule_or_declaration<'i>(
        &mut self,
        parser: &mut Parser<'i, '_>,
        after_hash: bool,
        start: SourcePosition,
        location: SourceLocation,
    ) -> NodeResult<'i, Option<Node>> {
        let (prelude_end, terminator) = scan_prelude(parser, after_hash)?;
        let prelude = &self.text[start.byte_index()..prelude_end];

        match terminator {
            Terminator::Block => {
                let nodes = parser.parse_nested_block(|p| self.parse_block(p))?;
                let selector = strip_block_comments(prelude).trim().to_string();
                Ok(Some(Node::Rule(Rule {
                    selectors: split_selectors(&selector),
                    selector,
                    nodes,
                    span: span(start, parser.position(), location),
                })))
            }
            Terminator::Semicolon | Terminator::End => {
                let Some((prop, value)) = prelude.split_once(':') else {
                    tracing::debug!("Skipping stray statement: {}", prelude.trim());
                    return Ok(None);
                };
                let prop = prop.trim();
                if prop.is_empty() {
                    return Ok(None);
                }
                Ok(Some(Node::Declaration(Declaration {
                    prop: prop.to_string(),
                    value: value.trim().to_string(),
                    span: span(start, parser.position(), location),
                })))
            }
        }
    }

    /// Emit the line comments that start before `offset`.
    fn flush_line_comments(&mut self, offset: usize, nodes: &mut Vec<Node>) {
        while let Some(comment) = self.line_comments.get(self.next_comment) {
            if comment.span.start >= offset {
                break;
            }
            nodes.push(Node::Comment(comment.clone()));
            self.next_comment += 1;
        }
    }
}

/// Consume a prelude and report where it ended.
///
/// A `{` right after `#` is interpolation (`#{$name}`) and stays part of the
/// prelude; its contents are skipped by the tokenizer.
fn scan_prelude<'i>(
    parser: &mut Parser<'i, '_>,
    mut after_hash: bool,
) -> NodeResult<'i, (usize, Terminator)> {
    loop {
        let before = parser.position().byte_index();
        let token = match parser.next_including_whitespace_and_comments() {
            Ok(token) => token.clone(),
            Err(_) => return Ok((before, Terminator::End)),
        };

        match token {
            Token::Semicolon => return Ok((before, Terminator::Semicolon)),
            Token::CurlyBracketBlock if !after_hash => return Ok((before, Terminator::Block)),
            Token::CloseCurlyBracket => return Err(parser.new_custom_error("unexpected `}`")),
            Token::BadString(_) => return Err(parser.new_custom_error("unterminated string")),
            _ => {}
        }
        after_hash = matches!(token, Token::Delim('#'));
    }
}

fn span(start: SourcePosition, end: SourcePosition, location: SourceLocation) -> Span {
    Span {
        start: start.byte_index(),
        end: end.byte_index(),
        line: location.line + 1,
        column: location.column,
    }
}

fn syntax_error(error: CssParseError<'_, &'static str>) -> SyntaxError {
    let message = match error.kind {
        ParseErrorKind::Custom(message) => message.to_string(),
        ParseErrorKind::Basic(kind) => format!("{kind:?}"),
    };
    SyntaxError {
        message,
        line: error.location.line + 1,
        column: error.location.column,
    }
}

fn strip_block_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(open) = rest.find("/*") {
        out.push_str(&rest[..open]);
        match rest[open + 2..].find("*/") {
            Some(close) => rest = &rest[open + 2 + close + 2..],
            None => {
                rest = "";
                break;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules(nodes: &[Node]) -> Vec<&Rule> {
        nodes.iter().filter_map(Node::as_rule).collect()
    }

    #[test]
    fn parse_variable_declaration() {
        let nodes = parse_stylesheet("$color-brand: #e95420 !default;").unwrap();

        assert_eq!(nodes.len(), 1);
        match &nodes[0] {
            Node::Declaration(decl) => {
                assert_eq!(decl.prop, "$color-brand");
                assert_eq!(decl.value, "#e95420 !default");
            }
            other => panic!("expected declaration, got {other:?}"),
        }
    }

    #[test]
    fn parse_unquoted_data_uri() {
        let nodes =
            parse_stylesheet("$icon: url(data:image/png;base64,iVBOR//8AAA);\n@mixin vf-x { .x { } }").unwrap();

        assert_eq!(nodes.len(), 2);
        match &nodes[0] {
            Node::Declaration(decl) => assert_eq!(decl.value, "url(data:image/png;base64,iVBOR//8AAA)"),
            other => panic!("expected declaration, got {other:?}"),
        }
        assert!(matches!(&nodes[1], Node::AtRule(rule) if rule.name == "mixin"));
    }

    #[test]
    fn parse_mixin_with_nested_rules() {
        let scss = r#"
            @mixin vf-p-card {
                .p-card {
                    padding: 1rem;
                    .p-card__image { width: 100%; }
                    &--highlighted { border: 0; }
                }
            }
        "#;
        let nodes = parse_stylesheet(scss).unwrap();

        let mixin = nodes[0].as_at_rule("mixin").unwrap();
        assert_eq!(mixin.params, "vf-p-card");

        let card = rules(mixin.children())[0];
        assert_eq!(card.selectors, vec![".p-card"]);

        let nested: Vec<_> = card.child_rules().map(|r| r.selector.as_str()).collect();
        assert_eq!(nested, vec![".p-card__image", "&--highlighted"]);
        assert!(matches!(card.nodes[0], Node::Declaration(_)));
    }

    #[test]
    fn parse_statement_at_rules() {
        let nodes = parse_stylesheet("@import 'settings';\n@include vf-base;").unwrap();

        let import = nodes[0].as_at_rule("import").unwrap();
        assert_eq!(import.params, "'settings'");
        assert!(import.nodes.is_none());
        assert_eq!(nodes[1].as_at_rule("include").unwrap().params, "vf-base");
    }

    #[test]
    fn parse_selector_list() {
        let nodes = parse_stylesheet(".p-list,\n> .p-list__item, li:not(.a, .b) { }").unwrap();

        let rule = nodes[0].as_rule().unwrap();
        assert_eq!(rule.selectors, vec![".p-list", "> .p-list__item", "li:not(.a, .b)"]);
    }

    #[test]
    fn parse_interpolation_in_selector() {
        let nodes = parse_stylesheet(".l-fluid-breakout#{$suffix} { .x { } }").unwrap();

        let rule = nodes[0].as_rule().unwrap();
        assert_eq!(rule.selector, ".l-fluid-breakout#{$suffix}");
        assert_eq!(rule.child_rules().count(), 1);
    }

    #[test]
    fn parse_comments_in_order() {
        let scss = "/* brand */\n$a: 1;\n// spacing\n$b: 2;";
        let nodes = parse_stylesheet(scss).unwrap();

        let kinds: Vec<_> = nodes
            .iter()
            .map(|n| match n {
                Node::Comment(c) => format!("comment:{}", c.cleaned()),
                Node::Declaration(d) => format!("decl:{}", d.prop),
                _ => "other".to_string(),
            })
            .collect();
        assert_eq!(kinds, vec!["comment:brand", "decl:$a", "comment:spacing", "decl:$b"]);
    }

    #[test]
    fn parse_line_comment_inside_block() {
        let nodes = parse_stylesheet("@mixin m {\n  // card\n  .p-card { }\n}").unwrap();

        let mixin = nodes[0].as_at_rule("mixin").unwrap();
        assert!(matches!(&mixin.children()[0], Node::Comment(c) if c.text == "card"));
        assert!(matches!(&mixin.children()[1], Node::Rule(_)));
    }

    #[test]
    fn spans_point_at_nodes() {
        let source = "$a: 1;\n.b { }";
        let nodes = parse_stylesheet(source).unwrap();

        let span = nodes[1].span();
        assert_eq!(&source[span.start..span.end], ".b { }");
        assert_eq!((span.line, span.column), (2, 1));
    }

    #[test]
    fn rejects_unbalanced_input() {
        let err = parse_stylesheet("@mixin m {\n  .a {\n}").unwrap_err();
        assert_eq!(err.message, "unclosed block");
        assert_eq!(err.line, 1);

        assert!(parse_stylesheet("{ color: red; }").is_err());
    }

    #[test]
    fn strip_comments_from_selectors() {
        assert_eq!(split_selectors(".a /* x */, .b"), vec![".a", ".b"]);
    }
}
