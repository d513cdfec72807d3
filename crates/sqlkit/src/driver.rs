//! The driver seam: traits the underlying data store must implement.
//!
//! sqlkit never talks to a database directly. Everything below the executor
//! goes through these object-safe traits, so any synchronous driver (or a
//! scripted test double) can sit underneath a [`Session`](crate::Session).
//!
//! Statements and cursors borrow the connection that produced them; dropping
//! them releases the underlying resource. The executor keeps each borrow
//! inside a single operation, which is how the release-on-every-exit-path
//! discipline is enforced.

use crate::error::DbResult;
use crate::value::SqlValue;

/// An open database connection.
///
/// One connection maps to one remote session. Connections are not shared
/// between threads by sqlkit; a [`Session`](crate::Session) owns its
/// connection exclusively for its whole lifetime.
pub trait Connection {
    /// Prepare a parameterized statement.
    fn prepare<'c>(&'c mut self, sql: &str) -> DbResult<Box<dyn Statement + 'c>>;

    /// Prepare an insert-style statement with generated-key retrieval
    /// requested up front.
    ///
    /// Drivers that always expose generated keys can keep the default, which
    /// is a plain [`Connection::prepare`].
    fn prepare_with_generated_keys<'c>(
        &'c mut self,
        sql: &str,
    ) -> DbResult<Box<dyn Statement + 'c>> {
        self.prepare(sql)
    }

    /// Prepare a stored-procedure invocation.
    fn prepare_call<'c>(&'c mut self, sql: &str) -> DbResult<Box<dyn Statement + 'c>>;

    /// Whether this connection supports transactions at all.
    fn supports_transactions(&mut self) -> DbResult<bool>;

    /// Switch autocommit mode.
    fn set_auto_commit(&mut self, auto_commit: bool) -> DbResult<()>;

    /// Commit the open transaction.
    fn commit(&mut self) -> DbResult<()>;

    /// Roll back the open transaction.
    fn rollback(&mut self) -> DbResult<()>;

    /// Roll back to a savepoint previously created on this connection.
    fn rollback_to(&mut self, savepoint: &SavepointHandle) -> DbResult<()>;

    /// Create a savepoint, optionally named.
    fn set_savepoint(&mut self, name: Option<&str>) -> DbResult<SavepointHandle>;

    /// Whether this connection supports the given isolation level.
    fn supports_isolation_level(&mut self, level: IsolationLevel) -> DbResult<bool>;

    /// Set the isolation level for transactions on this connection.
    fn set_transaction_isolation(&mut self, level: IsolationLevel) -> DbResult<()>;
}

/// Transaction isolation level of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsolationLevel {
    /// Dirty reads, non-repeatable reads and phantom reads possible.
    ReadUncommitted,
    /// Dirty reads prevented; non-repeatable and phantom reads possible.
    ReadCommitted,
    /// Only phantom reads possible.
    RepeatableRead,
    /// Dirty, non-repeatable and phantom reads all prevented.
    Serializable,
}

impl std::fmt::Display for IsolationLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::ReadUncommitted => "READ UNCOMMITTED",
            Self::ReadCommitted => "READ COMMITTED",
            Self::RepeatableRead => "REPEATABLE READ",
            Self::Serializable => "SERIALIZABLE",
        })
    }
}

/// A prepared (or callable) statement scoped to its connection.
pub trait Statement {
    /// Bind one value to the zero-based bind marker `index`.
    fn bind(&mut self, index: usize, value: &SqlValue) -> DbResult<()>;

    /// Run as a non-query statement, returning the affected-row count.
    fn execute_update(&mut self) -> DbResult<u64>;

    /// Run as a query, returning a forward-only cursor over the result.
    fn execute_query<'s>(&'s mut self) -> DbResult<Box<dyn Rows + 's>>;

    /// Run the statement, reporting whether it produced a result set.
    ///
    /// Used for stored-procedure calls where the caller only needs a
    /// success indicator.
    fn execute(&mut self) -> DbResult<bool>;

    /// Snapshot the currently bound values into the pending batch.
    fn add_batch(&mut self) -> DbResult<()>;

    /// Execute the pending batch in one round trip.
    ///
    /// Returns one affected-row count per batched entry in input order. A
    /// mid-batch failure should surface as
    /// [`DbError::Batch`](crate::DbError::Batch) carrying whatever partial
    /// counts the driver knows about.
    fn execute_batch(&mut self) -> DbResult<Vec<u64>>;

    /// The first key generated by the last update, if the driver produced
    /// one. `Ok(None)` is the documented outcome for tables without an
    /// auto-generated key.
    fn generated_key(&mut self) -> DbResult<Option<i64>>;
}

/// A forward-only cursor over a query result.
pub trait Rows {
    /// Advance to the next row. Returns `false` once the result is
    /// exhausted.
    fn advance(&mut self) -> DbResult<bool>;

    /// Number of columns in the result.
    fn column_count(&self) -> usize;

    /// Name of the column at `index`, if the driver knows it.
    fn column_name(&self, index: usize) -> Option<&str>;

    /// Value of the column at `index` in the current row.
    fn get(&self, index: usize) -> DbResult<SqlValue>;
}

/// An opaque marker for a savepoint created on a specific connection.
///
/// Handles are only meaningful on the connection that created them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavepointHandle {
    id: u64,
    name: Option<String>,
}

impl SavepointHandle {
    /// Create a handle; called by driver implementations only.
    pub fn new(id: u64, name: Option<String>) -> Self {
        Self { id, name }
    }

    /// Driver-assigned savepoint id.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// The savepoint name, when one was requested.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

/// Source of connections, typically backed by a pool.
///
/// Acquisition honors the pool's own sizing and wait limits (see
/// [`PoolConfig`](crate::config::PoolConfig)); release happens when the
/// returned connection is dropped.
pub trait ConnectionProvider {
    /// Acquire a connection, blocking up to the provider's wait limit.
    fn connection(&self) -> DbResult<Box<dyn Connection>>;
}

#[cfg(test)]
pub(crate) mod mock {
    //! A scripted in-memory driver for executor and session tests.

    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::error::DbError;

    /// Shared observable state of a [`MockConnection`].
    #[derive(Debug, Default)]
    pub struct MockState {
        pub auto_commit: bool,
        pub commits: u32,
        pub rollbacks: u32,
        pub savepoint_rollbacks: u32,
        pub supports_tx_queries: u32,
        pub isolation: Option<IsolationLevel>,
        pub prepared: Vec<String>,
        pub bound: Vec<Vec<SqlValue>>,
    }

    /// Scripted connection. Each knob fails the matching operation once
    /// configured; everything else succeeds.
    pub struct MockConnection {
        pub state: Rc<RefCell<MockState>>,
        pub supports_tx: bool,
        pub supports_isolation: bool,
        pub fail_commit: bool,
        pub fail_rollback: bool,
        pub fail_restore: bool,
        pub rows: Vec<Vec<SqlValue>>,
        pub columns: Vec<String>,
        pub affected: u64,
        pub key: Option<i64>,
        pub batch_fail_after: Option<usize>,
        savepoint_seq: u64,
    }

    impl MockConnection {
        pub fn new() -> Self {
            let state = Rc::new(RefCell::new(MockState {
                auto_commit: true,
                ..MockState::default()
            }));
            Self {
                state,
                supports_tx: true,
                supports_isolation: true,
                fail_commit: false,
                fail_rollback: false,
                fail_restore: false,
                rows: Vec::new(),
                columns: Vec::new(),
                affected: 1,
                key: None,
                batch_fail_after: None,
                savepoint_seq: 0,
            }
        }

        pub fn with_rows(columns: &[&str], rows: Vec<Vec<SqlValue>>) -> Self {
            let mut conn = Self::new();
            conn.columns = columns.iter().map(|c| c.to_string()).collect();
            conn.rows = rows;
            conn
        }

        pub fn state(&self) -> Rc<RefCell<MockState>> {
            Rc::clone(&self.state)
        }
    }

    impl Connection for MockConnection {
        fn prepare<'c>(&'c mut self, sql: &str) -> DbResult<Box<dyn Statement + 'c>> {
            self.state.borrow_mut().prepared.push(sql.to_string());
            Ok(Box::new(MockStatement {
                conn: self,
                bound: Vec::new(),
                batch: Vec::new(),
            }))
        }

        fn prepare_call<'c>(&'c mut self, sql: &str) -> DbResult<Box<dyn Statement + 'c>> {
            self.prepare(sql)
        }

        fn supports_transactions(&mut self) -> DbResult<bool> {
            self.state.borrow_mut().supports_tx_queries += 1;
            Ok(self.supports_tx)
        }

        fn set_auto_commit(&mut self, auto_commit: bool) -> DbResult<()> {
            if auto_commit && self.fail_restore {
                return Err(DbError::driver("restore autocommit refused"));
            }
            self.state.borrow_mut().auto_commit = auto_commit;
            Ok(())
        }

        fn commit(&mut self) -> DbResult<()> {
            if self.fail_commit {
                return Err(DbError::driver("commit refused"));
            }
            self.state.borrow_mut().commits += 1;
            Ok(())
        }

        fn rollback(&mut self) -> DbResult<()> {
            if self.fail_rollback {
                return Err(DbError::driver("rollback refused"));
            }
            self.state.borrow_mut().rollbacks += 1;
            Ok(())
        }

        fn rollback_to(&mut self, _savepoint: &SavepointHandle) -> DbResult<()> {
            if self.fail_rollback {
                return Err(DbError::driver("rollback refused"));
            }
            self.state.borrow_mut().savepoint_rollbacks += 1;
            Ok(())
        }

        fn set_savepoint(&mut self, name: Option<&str>) -> DbResult<SavepointHandle> {
            self.savepoint_seq += 1;
            Ok(SavepointHandle::new(
                self.savepoint_seq,
                name.map(str::to_string),
            ))
        }

        fn supports_isolation_level(&mut self, _level: IsolationLevel) -> DbResult<bool> {
            Ok(self.supports_isolation)
        }

        fn set_transaction_isolation(&mut self, level: IsolationLevel) -> DbResult<()> {
            self.state.borrow_mut().isolation = Some(level);
            Ok(())
        }
    }

    struct MockStatement<'c> {
        conn: &'c mut MockConnection,
        bound: Vec<SqlValue>,
        batch: Vec<Vec<SqlValue>>,
    }

    impl MockStatement<'_> {
        fn record_bound(&mut self) {
            self.conn
                .state
                .borrow_mut()
                .bound
                .push(self.bound.clone());
        }
    }

    impl Statement for MockStatement<'_> {
        fn bind(&mut self, index: usize, value: &SqlValue) -> DbResult<()> {
            if index != self.bound.len() {
                return Err(DbError::driver(format!(
                    "out-of-order bind at index {index}"
                )));
            }
            self.bound.push(value.clone());
            Ok(())
        }

        fn execute_update(&mut self) -> DbResult<u64> {
            self.record_bound();
            Ok(self.conn.affected)
        }

        fn execute_query<'s>(&'s mut self) -> DbResult<Box<dyn Rows + 's>> {
            self.record_bound();
            Ok(Box::new(MockRows {
                columns: &self.conn.columns,
                rows: &self.conn.rows,
                cursor: None,
            }))
        }

        fn execute(&mut self) -> DbResult<bool> {
            self.record_bound();
            Ok(false)
        }

        fn add_batch(&mut self) -> DbResult<()> {
            self.batch.push(std::mem::take(&mut self.bound));
            Ok(())
        }

        fn execute_batch(&mut self) -> DbResult<Vec<u64>> {
            if let Some(limit) = self.conn.batch_fail_after {
                if self.batch.len() > limit {
                    return Err(DbError::Batch {
                        counts: vec![self.conn.affected; limit],
                        message: "batch entry rejected".to_string(),
                    });
                }
            }
            let entries = self.batch.len();
            for entry in self.batch.drain(..) {
                self.conn.state.borrow_mut().bound.push(entry);
            }
            Ok(vec![self.conn.affected; entries])
        }

        fn generated_key(&mut self) -> DbResult<Option<i64>> {
            Ok(self.conn.key)
        }
    }

    struct MockRows<'s> {
        columns: &'s [String],
        rows: &'s [Vec<SqlValue>],
        cursor: Option<usize>,
    }

    impl Rows for MockRows<'_> {
        fn advance(&mut self) -> DbResult<bool> {
            let next = self.cursor.map_or(0, |i| i + 1);
            if next < self.rows.len() {
                self.cursor = Some(next);
                Ok(true)
            } else {
                Ok(false)
            }
        }

        fn column_count(&self) -> usize {
            self.columns.len()
        }

        fn column_name(&self, index: usize) -> Option<&str> {
            self.columns.get(index).map(String::as_str)
        }

        fn get(&self, index: usize) -> DbResult<SqlValue> {
            let row = self
                .cursor
                .and_then(|i| self.rows.get(i))
                .ok_or_else(|| DbError::driver("cursor not positioned on a row"))?;
            row.get(index)
                .cloned()
                .ok_or_else(|| DbError::driver(format!("no column at index {index}")))
        }
    }
}
