//! # sqlkit
//!
//! A synchronous transactional SQL execution toolkit.
//!
//! ## Features
//!
//! - **Named parameters**: `:name` placeholders compiled once into
//!   positional SQL, order- and repetition-preserving
//! - **Stateless execution**: update/query/batch/generated-key/call
//!   operations over any driver implementing the [`driver`] traits
//! - **Transactional sessions**: one connection per [`Session`], with
//!   begin/commit/rollback, savepoints and a single-callback
//!   [`Session::transaction`] helper
//! - **Pool configuration**: grouped TOML settings validated into a
//!   [`PoolConfig`], with driver detection from the connection URL
//! - **Injected diagnostics**: SQL display flags travel in a [`SqlLog`]
//!   value instead of process-global state
//!
//! ## Example
//!
//! ```ignore
//! use sqlkit::{Params, Session, Settings};
//!
//! let settings = Settings::from_path("config/db.toml")?;
//! let pool_config = settings.load("primary")?;
//! let provider = my_driver::pool(&pool_config)?;
//!
//! let mut session = Session::from_provider(&provider)?;
//! session.transaction(|s| {
//!     s.execute(
//!         "UPDATE accounts SET balance = balance - :amount WHERE id = :id",
//!         &Params::named().bind("amount", 100).bind("id", 1).build(),
//!     )?;
//!     s.execute(
//!         "UPDATE accounts SET balance = balance + :amount WHERE id = :id",
//!         &Params::named().bind("amount", 100).bind("id", 2).build(),
//!     )?;
//!     Ok(())
//! })?;
//! # Ok::<(), sqlkit::DbError>(())
//! ```
//!
//! A [`Session`] is not safe for concurrent use; give each unit of work its
//! own session. [`Executor`] operations are stateless and may run from many
//! threads as long as each call supplies its own connection.

pub mod config;
pub mod driver;
pub mod error;
pub mod executor;
pub mod session;
pub mod sql;
pub mod sqllog;
pub mod value;

pub use config::{identify_driver, PoolConfig, Settings};
pub use driver::{
    Connection, ConnectionProvider, IsolationLevel, Rows, SavepointHandle, Statement,
};
pub use error::{DbError, DbResult};
pub use executor::Executor;
pub use session::{Session, TxState};
pub use sql::{NamedSql, Params};
pub use sqllog::SqlLog;
pub use value::SqlValue;
