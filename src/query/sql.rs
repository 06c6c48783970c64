//! Minimal SQL scanning used to assemble query text safely.
//!
//! The scanner only distinguishes what the query builder needs to know:
//! words, `:named` parameters, quoted literals/identifiers and parentheses.
//! Everything inside quotes is opaque, so keywords or parameter markers
//! appearing in literals are never mistaken for query structure.

use std::ops::Range;

use crate::query::value::{QueryParams, QueryValue};
use crate::repository::errors::{RepositoryError, RepositoryResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenKind {
    Word,
    Parameter,
    Quoted,
    OpenParen,
    CloseParen,
    Other,
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn tokenize(sql: &str) -> Vec<(TokenKind, &str)> {
    let mut tokens = Vec::new();
    let mut chars = sql.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        let kind = match c {
            '\'' | '"' | '`' => {
                // Doubled quotes escape themselves inside the literal.
                while let Some((_, ch)) = chars.next() {
                    if ch == c {
                        if chars.peek().is_some_and(|&(_, next)| next == c) {
                            chars.next();
                            continue;
                        }
                        break;
                    }
                }
                TokenKind::Quoted
            }
            '(' => TokenKind::OpenParen,
            ')' => TokenKind::CloseParen,
            ':' if chars.peek().is_some_and(|&(_, next)| is_ident_start(next)) => {
                while chars.next_if(|&(_, next)| is_ident_char(next)).is_some() {}
                TokenKind::Parameter
            }
            c if is_ident_start(c) => {
                while chars.next_if(|&(_, next)| is_ident_char(next)).is_some() {}
                TokenKind::Word
            }
            _ => TokenKind::Other,
        };
        let end = chars.peek().map_or(sql.len(), |&(i, _)| i);
        tokens.push((kind, &sql[start..end]));
    }

    tokens
}

/// Returns `true` if the first word of `sql` is `FROM`.
pub fn starts_with_from(sql: &str) -> bool {
    tokenize(sql.trim_start())
        .first()
        .is_some_and(|&(kind, text)| kind == TokenKind::Word && text.eq_ignore_ascii_case("from"))
}

/// Name of the Unicode-aware lowering function registered on every pooled
/// connection. SQLite's builtin `lower()` only folds ASCII.
pub const LOWER_FUNCTION: &str = "unicode_lower";

/// Case-insensitive substring test of `field` against the `:parameter` value.
pub fn contains_ignore_case(field: &str, parameter: &str) -> String {
    format!("instr({LOWER_FUNCTION}({field}), {LOWER_FUNCTION}(:{parameter})) > 0")
}

/// Byte range of the condition following a top-level `WHERE`.
///
/// The condition runs up to the next top-level `GROUP`, `ORDER`, `HAVING` or
/// `LIMIT` keyword, or to the end of `sql`. Keywords inside literals and
/// parenthesised sub-queries are ignored.
pub fn where_condition(sql: &str) -> Option<Range<usize>> {
    let mut depth = 0usize;
    let mut offset = 0usize;
    let mut condition_start = None;

    for (kind, text) in tokenize(sql) {
        let start = offset;
        offset += text.len();
        match kind {
            TokenKind::OpenParen => depth += 1,
            TokenKind::CloseParen => depth = depth.saturating_sub(1),
            TokenKind::Word if depth == 0 => match condition_start {
                None if text.eq_ignore_ascii_case("where") => condition_start = Some(offset),
                Some(begin)
                    if CLAUSE_KEYWORDS
                        .iter()
                        .any(|keyword| text.eq_ignore_ascii_case(keyword)) =>
                {
                    return Some(begin..start);
                }
                _ => {}
            },
            _ => {}
        }
    }

    condition_start.map(|begin| begin..sql.len())
}

const CLAUSE_KEYWORDS: [&str; 4] = ["group", "order", "having", "limit"];

/// Rewrites `:name` markers into positional `?` placeholders.
///
/// Returns the rewritten query with the values in bind order. A marker with
/// no entry in `params` is a query execution error.
pub fn bind_named(sql: &str, params: &QueryParams) -> RepositoryResult<(String, Vec<QueryValue>)> {
    let mut rewritten = String::with_capacity(sql.len());
    let mut values = Vec::new();

    for (kind, text) in tokenize(sql) {
        if kind == TokenKind::Parameter {
            let name = &text[1..];
            let value = params.get(name).ok_or_else(|| {
                RepositoryError::QueryExecution(format!("unbound query parameter :{name}"))
            })?;
            rewritten.push('?');
            values.push(value.clone());
        } else {
            rewritten.push_str(text);
        }
    }

    Ok((rewritten, values))
}
