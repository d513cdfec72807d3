//! Parameter sets and bind-order resolution.

use std::collections::BTreeMap;

use crate::error::{DbError, DbResult};
use crate::sql::NamedSql;
use crate::value::SqlValue;

/// A set of statement parameters, positional or named.
///
/// Positional parameters are matched to `?` markers by index and must match
/// the placeholder count exactly. Named parameters are matched through the
/// compiled template's name list; a name the template uses but the set does
/// not contain is a binding error, never a silent NULL.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Params {
    /// No parameters
    #[default]
    None,
    /// Ordered values, one per `?` marker
    Positional(Vec<SqlValue>),
    /// Name → value mapping resolved through the template's name list
    Named(BTreeMap<String, SqlValue>),
}

impl Params {
    /// Build a positional parameter set.
    pub fn positional<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<SqlValue>,
    {
        Self::Positional(values.into_iter().map(Into::into).collect())
    }

    /// Start building a named parameter set.
    pub fn named() -> NamedParams {
        NamedParams::default()
    }

    /// Resolve this set against a compiled template, in placeholder order.
    ///
    /// The i-th returned value belongs to the i-th `?` marker. A repeated
    /// name resolves once per occurrence. A name bound to [`SqlValue::Null`]
    /// binds SQL NULL; a name absent from the map fails with
    /// [`DbError::UnresolvedParameter`].
    pub fn resolve(&self, compiled: &NamedSql) -> DbResult<Vec<SqlValue>> {
        match self {
            Self::None => {
                if compiled.placeholder_count() != 0 {
                    return Err(DbError::ParameterCountMismatch {
                        expected: compiled.placeholder_count(),
                        got: 0,
                    });
                }
                Ok(Vec::new())
            }
            Self::Positional(values) => {
                if values.len() != compiled.placeholder_count() {
                    return Err(DbError::ParameterCountMismatch {
                        expected: compiled.placeholder_count(),
                        got: values.len(),
                    });
                }
                Ok(values.clone())
            }
            Self::Named(map) => compiled
                .names()
                .iter()
                .map(|name| {
                    map.get(name)
                        .cloned()
                        .ok_or_else(|| DbError::UnresolvedParameter(name.clone()))
                })
                .collect(),
        }
    }

    /// Number of values in the set; named sets count distinct names.
    pub fn len(&self) -> usize {
        match self {
            Self::None => 0,
            Self::Positional(values) => values.len(),
            Self::Named(map) => map.len(),
        }
    }

    /// Check if the set holds no values.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Builder for a named [`Params`] set.
///
/// # Example
///
/// ```
/// use sqlkit::sql::Params;
///
/// let params = Params::named()
///     .bind("id", 5)
///     .bind("note", Option::<&str>::None) // binds SQL NULL
///     .build();
/// assert_eq!(params.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct NamedParams {
    map: BTreeMap<String, SqlValue>,
}

impl NamedParams {
    /// Bind a value to a placeholder name.
    pub fn bind(mut self, name: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.map.insert(name.into(), value.into());
        self
    }

    /// Finish the builder.
    pub fn build(self) -> Params {
        Params::Named(self.map)
    }

    /// Shorthand: resolve directly against a compiled template.
    pub fn resolve(self, compiled: &NamedSql) -> DbResult<Vec<SqlValue>> {
        self.build().resolve(compiled)
    }
}

impl From<NamedParams> for Params {
    fn from(builder: NamedParams) -> Self {
        builder.build()
    }
}
