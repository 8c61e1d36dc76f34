//! Bulk writes with plain-insert, upsert and replace conflict handling.

use super::Client;
use crate::core::db::{Connection, Cursor, Value};
use crate::core::{ReataError, Result};
use crate::sql;
use tracing::debug;

/// How a bulk insert resolves rows that collide with an existing key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpdateMethod {
    /// Plain insert: any collision fails the whole batch
    #[default]
    Insert,
    /// Insert-or-update: a colliding row gets the listed columns overwritten
    Upsert,
    /// Insert-or-replace: a colliding row is deleted and inserted afresh, so
    /// columns that are not listed fall back to their defaults
    Replace,
}

impl std::str::FromStr for UpdateMethod {
    type Err = ReataError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "none" | "insert" => Ok(UpdateMethod::Insert),
            "upsert" => Ok(UpdateMethod::Upsert),
            "replace" => Ok(UpdateMethod::Replace),
            other => Err(ReataError::Validation(format!("unknown update method '{other}'"))),
        }
    }
}

impl<C: Connection> Client<C> {
    /// Writes `rows` into `table` inside its own transaction.
    ///
    /// Each row lines up positionally with `columns`. Returns the number of
    /// rows the server reports as changed.
    pub fn bulk_insert<S, R>(
        &self,
        table: &str,
        columns: &[S],
        rows: &[R],
        method: UpdateMethod,
    ) -> Result<usize>
    where
        S: AsRef<str>,
        R: AsRef<[Value]>,
    {
        self.bulk_insert_with(table, columns, rows, method, true)
    }

    /// Like [`Client::bulk_insert`]; with `autocommit` unset the statements
    /// join the caller's open transaction instead.
    pub fn bulk_insert_with<S, R>(
        &self,
        table: &str,
        columns: &[S],
        rows: &[R],
        method: UpdateMethod,
        autocommit: bool,
    ) -> Result<usize>
    where
        S: AsRef<str>,
        R: AsRef<[Value]>,
    {
        let database = self.require_database()?;
        if columns.is_empty() {
            return Err(ReataError::Validation(
                "bulk insert needs at least one column".to_string(),
            ));
        }
        if let Some((i, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.as_ref().len() != columns.len())
        {
            return Err(ReataError::Validation(format!(
                "row {i} has {} values but {} columns were given",
                row.as_ref().len(),
                columns.len()
            )));
        }
        if columns.len() > self.config.max_bind_params {
            return Err(ReataError::Validation(format!(
                "{} columns exceed the limit of {} bound parameters",
                columns.len(),
                self.config.max_bind_params
            )));
        }
        if rows.is_empty() {
            return Ok(0);
        }

        // Chunks keep input order, so the last of several rows sharing a key wins.
        let rows_per_chunk = self.config.max_bind_params / columns.len();
        self.scoped(autocommit, || {
            let mut changed = 0;
            for chunk in rows.chunks(rows_per_chunk) {
                let statement = sql::insert(database, table, columns, chunk.len(), method);
                let params: Vec<Value> = chunk
                    .iter()
                    .flat_map(|row| row.as_ref().iter().cloned())
                    .collect();
                let mut cursor = self.connection.cursor(&statement)?;
                changed += cursor.execute(&params)?;
            }
            debug!(table, rows = rows.len(), changed, ?method, "bulk insert");
            Ok(changed)
        })
    }
}
