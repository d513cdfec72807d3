//! SQL display diagnostics.
//!
//! The configuration source carries three display flags (`showSql`,
//! `formatSql`, `showParams`). They are parsed into a [`SqlLog`] and injected
//! into the executor instead of living in process-global state, so two pools
//! with different display settings do not fight over one switch.

use crate::value::SqlValue;

/// Configuration for statement display logging.
///
/// Disabled by default; every emitted line goes through `tracing` at debug
/// level under the `sqlkit::sql` target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SqlLog {
    /// Whether to log each statement before execution.
    pub show_sql: bool,
    /// Keep the statement's own layout instead of collapsing whitespace.
    pub format_sql: bool,
    /// Whether to log the resolved bind values alongside the statement.
    pub show_params: bool,
}

impl SqlLog {
    /// Create a disabled configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable statement logging.
    pub fn show_sql(mut self) -> Self {
        self.show_sql = true;
        self
    }

    /// Preserve statement layout when logging.
    pub fn format_sql(mut self) -> Self {
        self.format_sql = true;
        self
    }

    /// Log resolved bind values with each statement.
    pub fn show_params(mut self) -> Self {
        self.show_params = true;
        self
    }

    /// Log one statement with its resolved bind values, if enabled.
    pub(crate) fn statement(&self, sql: &str, values: &[SqlValue]) {
        if !self.show_sql {
            return;
        }
        let rendered;
        let sql = if self.format_sql {
            sql
        } else {
            rendered = collapse_whitespace(sql);
            &rendered
        };
        if self.show_params && !values.is_empty() {
            let params = values
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            tracing::debug!(target: "sqlkit::sql", params = %params, "{sql}");
        } else {
            tracing::debug!(target: "sqlkit::sql", "{sql}");
        }
    }
}

// Collapse runs of whitespace outside single-quoted literals. Whitespace
// inside a literal is part of the value and must be displayed as written.
fn collapse_whitespace(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len());
    let mut in_space = false;
    let mut in_literal = false;
    for ch in sql.chars() {
        if in_literal {
            out.push(ch);
            if ch == '\'' {
                in_literal = false;
            }
            continue;
        }
        if ch == '\'' {
            in_literal = true;
            in_space = false;
            out.push(ch);
        } else if ch.is_whitespace() {
            if !in_space && !out.is_empty() {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(ch);
            in_space = false;
        }
    }
    if !in_literal {
        out.truncate(out.trim_end().len());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_runs_of_whitespace() {
        assert_eq!(
            collapse_whitespace("SELECT *\n  FROM t\n  WHERE a = ?  "),
            "SELECT * FROM t WHERE a = ?"
        );
    }

    #[test]
    fn literal_whitespace_is_displayed_as_written() {
        assert_eq!(
            collapse_whitespace("SELECT  *  FROM t WHERE name = 'two  spaces'   AND  b = ?"),
            "SELECT * FROM t WHERE name = 'two  spaces' AND b = ?"
        );
    }

    #[test]
    fn default_is_all_off() {
        let log = SqlLog::new();
        assert!(!log.show_sql && !log.format_sql && !log.show_params);
    }

    #[test]
    fn builder_sets_flags() {
        let log = SqlLog::new().show_sql().show_params();
        assert!(log.show_sql && log.show_params && !log.format_sql);
    }
}
