//! Stateless statement execution against an open connection.
//!
//! Every operation here compiles the template, resolves bind values, runs
//! one statement to completion and releases it before returning. None of
//! them close the caller-supplied connection; transaction handling belongs
//! to [`Session`](crate::Session).

use crate::driver::{Connection, Rows, Statement};
use crate::error::{DbError, DbResult};
use crate::sql::{NamedSql, Params};
use crate::sqllog::SqlLog;
use crate::value::SqlValue;

/// Runs individual statements over a caller-supplied connection.
///
/// An `Executor` holds no connection and no mutable state, only the injected
/// SQL display configuration; calls are independent and safe to issue from
/// multiple threads as long as each call brings its own connection.
#[derive(Debug, Clone, Copy, Default)]
pub struct Executor {
    log: SqlLog,
}

impl Executor {
    /// Create an executor with statement logging disabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an executor with the given SQL display configuration.
    pub fn with_log(log: SqlLog) -> Self {
        Self { log }
    }

    /// Run a non-query statement (INSERT, UPDATE, DELETE, DDL).
    ///
    /// Returns the affected-row count. The connection stays open.
    pub fn execute(
        &self,
        conn: &mut dyn Connection,
        sql: &str,
        params: &Params,
    ) -> DbResult<u64> {
        let (compiled, values) = self.prepare_values(sql, params)?;
        let mut stmt = conn.prepare(compiled.sql())?;
        bind_all(stmt.as_mut(), &values)?;
        stmt.execute_update()
    }

    /// Run a query and hand the live cursor to `handler`.
    ///
    /// The cursor is only valid inside the handler; it is released before
    /// this function returns, on success and on failure alike. The handler's
    /// return value becomes the query result.
    pub fn query<T>(
        &self,
        conn: &mut dyn Connection,
        sql: &str,
        params: &Params,
        handler: impl FnOnce(&mut dyn Rows) -> DbResult<T>,
    ) -> DbResult<T> {
        let (compiled, values) = self.prepare_values(sql, params)?;
        let mut stmt = conn.prepare(compiled.sql())?;
        bind_all(stmt.as_mut(), &values)?;
        let mut rows = stmt.execute_query()?;
        handler(rows.as_mut())
    }

    /// Run an insert-style statement and fetch the first generated key.
    ///
    /// `Ok(None)` means the statement ran but the driver produced no key,
    /// e.g. the target table has no auto-generated column. That is a valid
    /// outcome, not an error.
    pub fn execute_for_generated_key(
        &self,
        conn: &mut dyn Connection,
        sql: &str,
        params: &Params,
    ) -> DbResult<Option<i64>> {
        let (compiled, values) = self.prepare_values(sql, params)?;
        let mut stmt = conn.prepare_with_generated_keys(compiled.sql())?;
        bind_all(stmt.as_mut(), &values)?;
        stmt.execute_update()?;
        stmt.generated_key()
    }

    /// Run one template once per parameter set as a single batched round
    /// trip.
    ///
    /// Returns one affected-row count per input set, in input order. A
    /// failure partway through surfaces as [`DbError::Batch`] carrying any
    /// partial counts the driver reported; whether already-applied entries
    /// persist is decided by the surrounding transaction, not here.
    pub fn execute_batch(
        &self,
        conn: &mut dyn Connection,
        sql: &str,
        batch: &[Params],
    ) -> DbResult<Vec<u64>> {
        let compiled = NamedSql::compile(sql)?;
        let mut stmt = conn.prepare(compiled.sql())?;
        for params in batch {
            let values = params.resolve(&compiled)?;
            self.log.statement(compiled.sql(), &values);
            bind_all(stmt.as_mut(), &values)?;
            stmt.add_batch()?;
        }
        stmt.execute_batch().map_err(|err| match err {
            batch_err @ DbError::Batch { .. } => batch_err,
            other => DbError::Batch {
                counts: Vec::new(),
                message: other.to_string(),
            },
        })
    }

    /// Invoke a stored procedure.
    ///
    /// Returns the driver's success indicator. Output parameters are not
    /// modeled; a procedure that produces a result set reports `true`.
    pub fn call(&self, conn: &mut dyn Connection, sql: &str, params: &Params) -> DbResult<bool> {
        let (compiled, values) = self.prepare_values(sql, params)?;
        let mut stmt = conn.prepare_call(compiled.sql())?;
        bind_all(stmt.as_mut(), &values)?;
        stmt.execute()
    }

    fn prepare_values(&self, sql: &str, params: &Params) -> DbResult<(NamedSql, Vec<SqlValue>)> {
        let compiled = NamedSql::compile(sql)?;
        let values = params.resolve(&compiled)?;
        self.log.statement(compiled.sql(), &values);
        Ok((compiled, values))
    }
}

fn bind_all(stmt: &mut dyn Statement, values: &[SqlValue]) -> DbResult<()> {
    for (index, value) in values.iter().enumerate() {
        stmt.bind(index, value)?;
    }
    Ok(())
}
