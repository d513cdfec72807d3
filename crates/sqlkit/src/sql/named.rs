//! Named-placeholder SQL templates.

use crate::error::{DbError, DbResult};

/// A SQL template compiled from named-placeholder form to positional form.
///
/// Compilation replaces each `:name` placeholder with a single `?` marker and
/// records the placeholder names left to right. A name used twice yields two
/// entries; each occurrence is bound independently.
///
/// Compilation is a pure function of the template text, so a compiled
/// template can be cached and reused across executions with different
/// parameter sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedSql {
    sql: String,
    names: Vec<String>,
}

impl NamedSql {
    /// Compile a template into positional SQL and its placeholder name list.
    ///
    /// Scanning rules:
    /// - Inside a single-quoted literal every character is copied verbatim;
    ///   a colon in a literal is never a placeholder.
    /// - A placeholder starts at a colon followed immediately by an
    ///   identifier character (letter, digit or underscore).
    /// - `::` is emitted literally and the text after it is not scanned as a
    ///   placeholder, so cast syntax like `expr::bigint` survives.
    /// - A colon followed by anything else (whitespace, punctuation, end of
    ///   input) is literal text.
    ///
    /// Fails with [`DbError::MalformedTemplate`] when the template ends
    /// inside an unterminated single-quoted literal.
    pub fn compile(template: &str) -> DbResult<Self> {
        let mut sql = String::with_capacity(template.len());
        let mut names = Vec::new();

        let mut chars = template.char_indices().peekable();
        let mut literal_start: Option<usize> = None;

        while let Some((pos, ch)) = chars.next() {
            if literal_start.is_some() {
                sql.push(ch);
                if ch == '\'' {
                    // A doubled quote ('') re-enters literal state on the
                    // next character, so escaped quotes stay opaque.
                    literal_start = None;
                }
                continue;
            }

            match ch {
                '\'' => {
                    literal_start = Some(pos);
                    sql.push(ch);
                }
                ':' => match chars.peek() {
                    Some(&(_, ':')) => {
                        // Cast syntax: emit both colons and skip placeholder
                        // scanning for the identifier that follows.
                        sql.push(':');
                        sql.push(':');
                        chars.next();
                        while let Some(&(_, next)) = chars.peek() {
                            if is_ident_char(next) {
                                sql.push(next);
                                chars.next();
                            } else {
                                break;
                            }
                        }
                    }
                    Some(&(_, next)) if is_ident_char(next) => {
                        let mut name = String::new();
                        while let Some(&(_, next)) = chars.peek() {
                            if is_ident_char(next) {
                                name.push(next);
                                chars.next();
                            } else {
                                break;
                            }
                        }
                        sql.push('?');
                        names.push(name);
                    }
                    _ => sql.push(':'),
                },
                _ => sql.push(ch),
            }
        }

        if let Some(offset) = literal_start {
            return Err(DbError::MalformedTemplate { offset });
        }

        Ok(Self { sql, names })
    }

    /// The positional SQL text, with one `?` per placeholder occurrence.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Placeholder names in positional order, duplicates preserved.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of bind markers in the positional SQL.
    pub fn placeholder_count(&self) -> usize {
        self.names.len()
    }
}

fn is_ident_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}
