//! Column-projected reads streamed lazily from a cursor.

use super::Client;
use crate::core::db::{Connection, Row, RowCursor};
use crate::core::{DriverError, ErrorKind, ReataError, Result};
use crate::sql;

impl<C: Connection> Client<C> {
    /// Prepares a select of `columns` from `table`.
    ///
    /// Without `columns` every column is projected in storage order. Rows are
    /// only fetched once [`RowCursor::rows`] is called:
    ///
    /// ```
    /// # fn main() -> reata::Result<()> {
    /// use reata::{row, Client, TableSchema, UpdateMethod};
    ///
    /// let mut client = Client::open_in_memory()?;
    /// client.use_database("shop", true)?;
    /// client.create_table(&TableSchema::new(
    ///     "people",
    ///     [("name", "TEXT NOT NULL"), ("age", "INTEGER")],
    ///     ["name"],
    /// )?)?;
    /// client.bulk_insert("people", &["name", "age"], &[row!["Bob", 42]], UpdateMethod::Insert)?;
    ///
    /// let mut cursor = client.fetch_rows("people", Some(&["name", "age"]))?;
    /// for row in cursor.rows()? {
    ///     assert_eq!(row?, row!["Bob", 42]);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub fn fetch_rows(&self, table: &str, columns: Option<&[&str]>) -> Result<RowCursor<'_, C>> {
        let database = self.require_database()?;
        let columns: Vec<String> = match columns {
            Some(columns) => columns.iter().map(|c| c.to_string()).collect(),
            None => self.column_names(table, true, true)?,
        };
        if columns.is_empty() {
            return Err(ReataError::ObjectNotFound(DriverError::new(
                ErrorKind::NotFound,
                format!("no columns to select from table {database}.{table}"),
            )));
        }
        let cursor = self.connection.cursor(&sql::select(database, table, &columns))?;
        Ok(RowCursor::new(cursor, columns, Vec::new()))
    }

    /// Reads every row of the projection into memory.
    pub fn fetch_all(&self, table: &str, columns: Option<&[&str]>) -> Result<Vec<Row>> {
        self.fetch_rows(table, columns)?.collect_rows()
    }
}
