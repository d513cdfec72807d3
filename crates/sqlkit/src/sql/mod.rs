//! SQL template compilation and parameter binding.
//!
//! SQL handed to sqlkit may use named placeholders (`:name`) instead of
//! positional markers. [`NamedSql::compile`] rewrites a template into
//! positional form once; [`Params`] resolves a value set against the
//! compiled template in placeholder order.
//!
//! # Example
//!
//! ```
//! use sqlkit::sql::{NamedSql, Params};
//!
//! let compiled = NamedSql::compile("SELECT * FROM t WHERE id = :id AND name = :name")?;
//! assert_eq!(compiled.sql(), "SELECT * FROM t WHERE id = ? AND name = ?");
//!
//! let values = Params::named()
//!     .bind("id", 5)
//!     .bind("name", "a")
//!     .resolve(&compiled)?;
//! assert_eq!(values.len(), 2);
//! # Ok::<(), sqlkit::DbError>(())
//! ```

mod named;
mod params;

#[cfg(test)]
mod tests;

pub use named::NamedSql;
pub use params::{NamedParams, Params};
