//! Source preparation ahead of tokenizing.
//!
//! `cssparser` knows nothing about `//` line comments, so they are masked
//! with spaces (byte offsets stay valid) and handed back separately. The
//! same pass checks brace balance, which the tokenizer would otherwise
//! repair silently at end of input.

use super::SyntaxError;
use super::node::{Comment, Span};

/// Stylesheet text ready for the tokenizer.
#[derive(Debug)]
pub(crate) struct PreparedSource {
    /// Original text with line comments replaced by spaces.
    pub text: String,
    /// Line comments in source order.
    pub line_comments: Vec<Comment>,
}

pub(crate) fn prepare(source: &str) -> Result<PreparedSource, SyntaxError> {
    let bytes = source.as_bytes();
    let mut masked = bytes.to_vec();
    let mut line_comments = Vec::new();
    let mut open_braces: Vec<usize> = Vec::new();
    let mut paren_depth = 0usize;
    let mut i = 0;

    while i < bytes.len() {
        if let Some(end) = unquoted_url_end(bytes, i) {
            i = end;
            continue;
        }
        match bytes[i] {
            b'\\' => {
                i += 2;
                continue;
            }
            quote @ (b'"' | b'\'') => {
                let start = i;
                i += 1;
                loop {
                    match bytes.get(i) {
                        None | Some(b'\n') => {
                            return Err(SyntaxError::at(source, start, "unterminated string"));
                        }
                        Some(b'\\') => i += 2,
                        Some(&b) if b == quote => {
                            i += 1;
                            break;
                        }
                        Some(_) => i += 1,
                    }
                }
                continue;
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                match source[i + 2..].find("*/") {
                    Some(end) => i += end + 4,
                    None => return Err(SyntaxError::at(source, i, "unterminated comment")),
                }
                continue;
            }
            b'/' if bytes.get(i + 1) == Some(&b'/') && starts_line_comment(bytes, i, paren_depth) => {
                let end = source[i..].find('\n').map_or(bytes.len(), |n| i + n);
                let (line, column) = line_column(source, i);
                line_comments.push(Comment {
                    text: source[i + 2..end].trim().to_string(),
                    span: Span {
                        start: i,
                        end,
                        line,
                        column,
                    },
                });
                masked[i..end].fill(b' ');
                i = end;
                continue;
            }
            b'(' => paren_depth += 1,
            b')' => paren_depth = paren_depth.saturating_sub(1),
            b'{' => {
                paren_depth = 0;
                open_braces.push(i);
            }
            b'}' => {
                paren_depth = 0;
                if open_braces.pop().is_none() {
                    return Err(SyntaxError::at(source, i, "unexpected `}`"));
                }
            }
            _ => {}
        }
        i += 1;
    }

    if let Some(&open) = open_braces.last() {
        return Err(SyntaxError::at(source, open, "unclosed block"));
    }

    Ok(PreparedSource {
        // Masked runs cover whole characters, so the bytes are still valid UTF-8.
        text: String::from_utf8_lossy(&masked).into_owned(),
        line_comments,
    })
}

/// End of an unquoted `url(...)` token starting at `i`, just past its `)`.
///
/// The body of an unquoted URL is opaque: `//`, `;` and `:` in it are part
/// of the address. Quoted URLs are left to the string handling.
fn unquoted_url_end(bytes: &[u8], i: usize) -> Option<usize> {
    let head = bytes.get(i..i + 4)?;
    if !head.eq_ignore_ascii_case(b"url(") {
        return None;
    }
    if i > 0 && (bytes[i - 1].is_ascii_alphanumeric() || matches!(bytes[i - 1], b'-' | b'_')) {
        return None;
    }

    let mut j = i + 4;
    while bytes.get(j).is_some_and(u8::is_ascii_whitespace) {
        j += 1;
    }
    if matches!(bytes.get(j), Some(b'"' | b'\'')) {
        return None;
    }
    while let Some(&b) = bytes.get(j) {
        match b {
            b'\\' => j += 2,
            b')' => return Some(j + 1),
            b'\n' => return None,
            _ => j += 1,
        }
    }
    None
}

/// Whether the `//` at `i` opens a comment rather than a protocol-relative
/// or absolute URL inside `url(...)`.
fn starts_line_comment(bytes: &[u8], i: usize, paren_depth: usize) -> bool {
    paren_depth == 0 || !matches!(i.checked_sub(1).map(|p| bytes[p]), Some(b'(' | b':'))
}

/// 1-based line and column of a byte offset.
pub(crate) fn line_column(source: &str, offset: usize) -> (u32, u32) {
    let offset = offset.min(source.len());
    let before = &source.as_bytes()[..offset];
    let line = before.iter().filter(|&&b| b == b'\n').count() + 1;
    let line_start = before.iter().rposition(|&b| b == b'\n').map_or(0, |p| p + 1);
    let column = String::from_utf8_lossy(&before[line_start..]).chars().count() + 1;
    (line as u32, column as u32)
}
