//! Connection-scoped transactional sessions.
//!
//! A [`Session`] owns exactly one connection for its whole lifetime and
//! layers JDBC-style transaction control over it: begin/commit/rollback,
//! savepoints, and a single-callback [`Session::transaction`] helper that
//! external callers should prefer over manual sequencing.
//!
//! A session is **not** safe for concurrent use. It owns one connection and
//! one transaction-state flag; give each logical unit of work its own
//! session instead of sharing one across threads.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::driver::{Connection, ConnectionProvider, IsolationLevel, Rows, SavepointHandle};
use crate::error::{DbError, DbResult};
use crate::executor::Executor;
use crate::sql::Params;
use crate::sqllog::SqlLog;

/// Counter for anonymous savepoint naming.
static SAVEPOINT_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Transaction mode of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxState {
    /// Every statement commits on its own.
    AutoCommit,
    /// A transaction is open but no statement has been issued since begin.
    ManualPending,
    /// A transaction is open and at least one statement has been issued.
    ManualInProgress,
}

/// A SQL execution session owning a single connection.
///
/// Statement operations delegate to [`Executor`]; transaction operations
/// drive the connection's autocommit flag directly. Whatever happens during
/// commit or rollback, the session always tries to restore autocommit so it
/// never gets stuck believing a transaction is still open; a failure of the
/// restore step itself is logged through `tracing` and not propagated.
pub struct Session {
    conn: Box<dyn Connection>,
    executor: Executor,
    state: TxState,
    supports_tx: Option<bool>,
}

impl Session {
    /// Wrap an already-open connection.
    pub fn new(conn: Box<dyn Connection>) -> Self {
        Self::with_log(conn, SqlLog::default())
    }

    /// Wrap a connection with SQL display diagnostics enabled.
    pub fn with_log(conn: Box<dyn Connection>, log: SqlLog) -> Self {
        Self {
            conn,
            executor: Executor::with_log(log),
            state: TxState::AutoCommit,
            supports_tx: None,
        }
    }

    /// Acquire a connection from `provider` and open a session on it.
    pub fn from_provider(provider: &dyn ConnectionProvider) -> DbResult<Self> {
        Ok(Self::new(provider.connection()?))
    }

    /// Current transaction mode.
    pub fn tx_state(&self) -> TxState {
        self.state
    }

    // ------------------------------------------------------- statements

    /// Run a non-query statement through this session's connection.
    pub fn execute(&mut self, sql: &str, params: &Params) -> DbResult<u64> {
        self.note_statement();
        self.executor.execute(self.conn.as_mut(), sql, params)
    }

    /// Run a query, handing the live cursor to `handler`.
    pub fn query<T>(
        &mut self,
        sql: &str,
        params: &Params,
        handler: impl FnOnce(&mut dyn Rows) -> DbResult<T>,
    ) -> DbResult<T> {
        self.note_statement();
        self.executor.query(self.conn.as_mut(), sql, params, handler)
    }

    /// Run an insert and fetch the first generated key, if any.
    pub fn execute_for_generated_key(
        &mut self,
        sql: &str,
        params: &Params,
    ) -> DbResult<Option<i64>> {
        self.note_statement();
        self.executor
            .execute_for_generated_key(self.conn.as_mut(), sql, params)
    }

    /// Run one template over a sequence of parameter sets as a batch.
    pub fn execute_batch(&mut self, sql: &str, batch: &[Params]) -> DbResult<Vec<u64>> {
        self.note_statement();
        self.executor.execute_batch(self.conn.as_mut(), sql, batch)
    }

    /// Invoke a stored procedure.
    pub fn call(&mut self, sql: &str, params: &Params) -> DbResult<bool> {
        self.note_statement();
        self.executor.call(self.conn.as_mut(), sql, params)
    }

    fn note_statement(&mut self) {
        if self.state == TxState::ManualPending {
            self.state = TxState::ManualInProgress;
        }
    }

    // ----------------------------------------------------- transactions

    /// Whether the underlying connection supports transactions.
    ///
    /// The capability is queried from the driver once and memoized for the
    /// session's lifetime.
    pub fn supports_transactions(&mut self) -> DbResult<bool> {
        if let Some(cached) = self.supports_tx {
            return Ok(cached);
        }
        let supported = self.conn.supports_transactions()?;
        self.supports_tx = Some(supported);
        Ok(supported)
    }

    /// Set the isolation level for transactions on this connection.
    ///
    /// The driver is asked whether it supports `level` first; a rejected
    /// level fails with [`DbError::IsolationUnsupported`] and the
    /// connection's current level stays in effect.
    pub fn set_transaction_isolation(&mut self, level: IsolationLevel) -> DbResult<()> {
        if !self.conn.supports_isolation_level(level)? {
            return Err(DbError::IsolationUnsupported(level));
        }
        self.conn.set_transaction_isolation(level)
    }

    /// Open a transaction by disabling autocommit.
    ///
    /// Fails with [`DbError::TransactionsUnsupported`] on a connection
    /// without transaction support, leaving the session state unchanged.
    pub fn begin_transaction(&mut self) -> DbResult<()> {
        if !self.supports_transactions()? {
            return Err(DbError::TransactionsUnsupported);
        }
        self.conn.set_auto_commit(false)?;
        self.state = TxState::ManualPending;
        Ok(())
    }

    /// Commit the open transaction.
    ///
    /// Autocommit is restored and the session returns to
    /// [`TxState::AutoCommit`] even when the commit itself fails.
    pub fn commit(&mut self) -> DbResult<()> {
        let result = self.conn.commit();
        self.restore_auto_commit();
        result
    }

    /// Roll back the open transaction.
    ///
    /// Symmetric to [`Session::commit`]: autocommit is always restored.
    pub fn rollback(&mut self) -> DbResult<()> {
        let result = self.conn.rollback();
        self.restore_auto_commit();
        result
    }

    /// Roll back to `savepoint`, then restore autocommit.
    pub fn rollback_to(&mut self, savepoint: &SavepointHandle) -> DbResult<()> {
        let result = self.conn.rollback_to(savepoint);
        self.restore_auto_commit();
        result
    }

    /// Best-effort rollback for cleanup paths.
    ///
    /// A failure of the rollback itself is logged and swallowed so the
    /// caller's primary error is not masked; autocommit is still restored.
    pub fn quiet_rollback(&mut self) {
        if let Err(err) = self.conn.rollback() {
            tracing::warn!(error = %err, "quiet rollback failed");
        }
        self.restore_auto_commit();
    }

    /// Best-effort rollback to `savepoint` for cleanup paths.
    pub fn quiet_rollback_to(&mut self, savepoint: &SavepointHandle) {
        if let Err(err) = self.conn.rollback_to(savepoint) {
            tracing::warn!(error = %err, savepoint = ?savepoint.name(), "quiet rollback failed");
        }
        self.restore_auto_commit();
    }

    /// Create a savepoint inside the open transaction.
    ///
    /// Without a name the savepoint gets a generated one. Fails with
    /// [`DbError::NoActiveTransaction`] while in autocommit mode.
    pub fn set_savepoint(&mut self, name: Option<&str>) -> DbResult<SavepointHandle> {
        if self.state == TxState::AutoCommit {
            return Err(DbError::NoActiveTransaction);
        }
        match name {
            Some(name) => self.conn.set_savepoint(Some(name)),
            None => {
                let generated = next_savepoint_name();
                self.conn.set_savepoint(Some(&generated))
            }
        }
    }

    /// Run `unit_of_work` inside a transaction.
    ///
    /// Begins a transaction, invokes the callback, commits on success. On
    /// any failure (including a failed commit) the session performs a quiet
    /// rollback and returns the failure wrapped in
    /// [`DbError::TransactionFailed`]. The session ends in autocommit mode
    /// in every case.
    pub fn transaction<T>(
        &mut self,
        unit_of_work: impl FnOnce(&mut Session) -> DbResult<T>,
    ) -> DbResult<T> {
        self.begin_transaction()?;
        match unit_of_work(self) {
            Ok(value) => match self.commit() {
                Ok(()) => Ok(value),
                Err(err) => {
                    self.quiet_rollback();
                    Err(DbError::transaction_failed(err))
                }
            },
            Err(err) => {
                self.quiet_rollback();
                Err(DbError::transaction_failed(err))
            }
        }
    }

    /// Release the owned connection.
    ///
    /// Closing never commits or rolls back a pending transaction; a session
    /// closed mid-transaction leaves the connection's fate to the release
    /// mechanism, which is the caller's responsibility to arrange.
    pub fn close(self) {
        if self.state != TxState::AutoCommit {
            tracing::warn!("session closed with a transaction still open");
        }
        drop(self.conn);
    }

    fn restore_auto_commit(&mut self) {
        // The restore step must not mask the primary commit/rollback error,
        // and the session must not stay in a manual state after a failed
        // restore.
        if let Err(err) = self.conn.set_auto_commit(true) {
            tracing::warn!(error = %err, "failed to restore autocommit");
        }
        self.state = TxState::AutoCommit;
    }
}

fn next_savepoint_name() -> String {
    let n = SAVEPOINT_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("sqlkit_sp_{n}")
}
