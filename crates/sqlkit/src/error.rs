//! Error types for sqlkit

use thiserror::Error;

/// Result type alias for sqlkit operations
pub type DbResult<T> = Result<T, DbError>;

/// Error types for SQL compilation, binding, execution and configuration
#[derive(Debug, Error)]
pub enum DbError {
    /// SQL template scanning ran off the end of a single-quoted literal
    #[error("unterminated string literal starting at byte {offset} of SQL template")]
    MalformedTemplate { offset: usize },

    /// Positional parameter list length does not match the placeholder count
    #[error("parameter count mismatch: statement has {expected} placeholders, got {got} values")]
    ParameterCountMismatch { expected: usize, got: usize },

    /// A named placeholder has no entry in the parameter map
    #[error("no value bound for parameter ':{0}'")]
    UnresolvedParameter(String),

    /// `begin_transaction` on a connection that does not support transactions
    #[error("transactions are not supported by the current connection")]
    TransactionsUnsupported,

    /// Savepoint requested while no transaction is open
    #[error("savepoints are only valid inside an open transaction")]
    NoActiveTransaction,

    /// Requested isolation level is not supported by the current connection
    #[error("transaction isolation level {0} is not supported by the current connection")]
    IsolationUnsupported(crate::driver::IsolationLevel),

    /// A unit of work failed inside `Session::transaction`
    #[error("transaction failed: {source}")]
    TransactionFailed {
        #[source]
        source: Box<DbError>,
    },

    /// Batch execution failed partway through
    ///
    /// `counts` holds whatever per-statement affected-row counts the driver
    /// reported before the failure; it may be empty.
    #[error("batch execution failed after {} completed statements: {message}", counts.len())]
    Batch { counts: Vec<u64>, message: String },

    /// Configuration group has a blank or missing URL
    #[error("no database URL configured for group '{0}'")]
    MissingUrl(String),

    /// Named configuration group does not exist
    #[error("no configuration group named '{0}'")]
    UnknownConfigGroup(String),

    /// URL scheme does not map to a known driver and none was configured
    #[error("cannot identify a driver for URL '{0}'")]
    UnknownDriver(String),

    /// A numeric pool setting is negative or not a number
    #[error("invalid value '{value}' for pool setting '{key}'")]
    InvalidPoolSetting { key: String, value: String },

    /// The configuration source itself could not be read or parsed
    #[error("configuration error: {0}")]
    Config(String),

    /// Failure reported by the underlying driver
    ///
    /// This is the pass-through category for connection loss, statement
    /// failures and other data-store errors. Callers should not retry these
    /// locally; the originating operation has already released any statement
    /// or cursor it acquired.
    #[error("driver error: {0}")]
    Driver(String),
}

impl DbError {
    /// Create a driver error
    pub fn driver(message: impl Into<String>) -> Self {
        Self::Driver(message.into())
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Wrap a unit-of-work failure
    pub fn transaction_failed(source: DbError) -> Self {
        Self::TransactionFailed {
            source: Box::new(source),
        }
    }

    /// Check if this is a driver-level failure
    pub fn is_driver(&self) -> bool {
        matches!(self, Self::Driver(_))
    }

    /// Check if this is a binding-time failure
    pub fn is_binding(&self) -> bool {
        matches!(
            self,
            Self::ParameterCountMismatch { .. } | Self::UnresolvedParameter(_)
        )
    }

    /// Check if this is a configuration-time failure
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Self::MissingUrl(_)
                | Self::UnknownConfigGroup(_)
                | Self::UnknownDriver(_)
                | Self::InvalidPoolSetting { .. }
                | Self::Config(_)
        )
    }
}
