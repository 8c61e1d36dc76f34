/// Schema Introspection Module
///
/// This module answers existence and structure questions about databases,
/// tables, columns and indexes by querying SQLite's catalog. Every query is
/// read-only; "not found" is reported as `false`, `0` or an empty result
/// rather than an error.

use crate::core::db::connection::{Connection, Cursor};
use crate::core::db::value::Value;
use crate::core::error::{DriverError, ErrorKind};
use crate::core::Result;
use crate::sql::quote_ident;
use std::collections::HashSet;

/// Represents a table column as reported by `pragma_table_xinfo`
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnInfo {
    /// Column name
    pub name: String,
    /// Declared type (e.g., "INTEGER", "VARCHAR(32)")
    pub type_name: String,
    /// 1-based position in the primary key, 0 when not part of it
    pub pk: i64,
    /// Value is computed by the server (`GENERATED ALWAYS AS`)
    pub generated: bool,
    /// Value is assigned by the server when omitted (the rowid alias)
    pub auto: bool,
}

/// Represents a database index
#[derive(Debug, Clone, PartialEq)]
pub struct IndexInfo {
    /// Index name
    pub name: String,
    /// Table the index belongs to
    pub table: String,
    /// Indexed columns in key order
    pub columns: Vec<String>,
}

/// Read-only catalog queries against one database.
pub struct Inspector<'c, C: Connection> {
    conn: &'c C,
    database: &'c str,
}

impl<'c, C: Connection> Inspector<'c, C> {
    pub fn new(conn: &'c C, database: &'c str) -> Self {
        Inspector { conn, database }
    }

    pub fn database(&self) -> &str {
        self.database
    }

    pub fn table_exists(&self, table: &str) -> Result<bool> {
        let sql = format!(
            "SELECT COUNT(*) FROM {}.sqlite_master WHERE type = 'table' AND name = ?",
            quote_ident(self.database)
        );
        Ok(query_count(self.conn, &sql, &[Value::from(table)])? > 0)
    }

    /// All user tables of the database.
    pub fn table_names(&self) -> Result<HashSet<String>> {
        let sql = format!(
            "SELECT name FROM {}.sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%'",
            quote_ident(self.database)
        );
        Ok(query_strings(self.conn, &sql, &[])?.into_iter().collect())
    }

    /// Columns of `table` in storage order, empty when the table is missing.
    pub fn columns(&self, table: &str) -> Result<Vec<ColumnInfo>> {
        let mut columns = Vec::new();
        {
            let mut cursor = self.conn.cursor(
                "SELECT name, type, pk, hidden FROM pragma_table_xinfo(?1, ?2) \
                 WHERE hidden <> 1 ORDER BY cid",
            )?;
            let rows = cursor.query(&[Value::from(table), Value::from(self.database)])?;
            for row in rows {
                let row = row?;
                let hidden = int_at(&row, 3);
                columns.push(ColumnInfo {
                    name: text_at(&row, 0),
                    type_name: text_at(&row, 1),
                    pk: int_at(&row, 2),
                    generated: hidden == 2 || hidden == 3,
                    auto: false,
                });
            }
        }

        // A lone INTEGER primary key aliases the rowid and is filled in by SQLite.
        // Any other key (DESC, WITHOUT ROWID) is backed by its own pk index.
        let key_columns = columns.iter().filter(|c| c.pk > 0).count();
        let integer_key = columns
            .iter()
            .any(|c| c.pk == 1 && c.type_name.eq_ignore_ascii_case("INTEGER"));
        if key_columns == 1 && integer_key && !self.has_key_index(table)? {
            for column in columns.iter_mut() {
                column.auto = column.pk == 1;
            }
        }
        Ok(columns)
    }

    fn has_key_index(&self, table: &str) -> Result<bool> {
        Ok(query_count(
            self.conn,
            "SELECT COUNT(*) FROM pragma_index_list(?1, ?2) WHERE origin = 'pk'",
            &[Value::from(table), Value::from(self.database)],
        )? > 0)
    }

    pub fn column_count(&self, table: &str, include_virtual: bool) -> Result<usize> {
        Ok(self
            .columns(table)?
            .iter()
            .filter(|c| include_virtual || !c.generated)
            .count())
    }

    /// Column names in storage order, optionally leaving out generated and
    /// auto-assigned columns.
    pub fn column_names(
        &self,
        table: &str,
        include_virtual: bool,
        include_auto: bool,
    ) -> Result<Vec<String>> {
        Ok(self
            .columns(table)?
            .into_iter()
            .filter(|c| include_virtual || !c.generated)
            .filter(|c| include_auto || !c.auto)
            .map(|c| c.name)
            .collect())
    }

    /// The definition of the index named `index`, wherever it lives in the database.
    pub fn index_definition(&self, index: &str) -> Result<Option<IndexInfo>> {
        let sql = format!(
            "SELECT tbl_name FROM {}.sqlite_master WHERE type = 'index' AND name = ?",
            quote_ident(self.database)
        );
        let Some(table) = query_strings(self.conn, &sql, &[Value::from(index)])?
            .into_iter()
            .next()
        else {
            return Ok(None);
        };
        let columns = query_strings(
            self.conn,
            "SELECT name FROM pragma_index_info(?1, ?2) ORDER BY seqno",
            &[Value::from(index), Value::from(self.database)],
        )?;
        Ok(Some(IndexInfo {
            name: index.to_string(),
            table,
            columns,
        }))
    }

    /// True only when `index` exists on `table` and covers `column`.
    pub fn index_exists(&self, table: &str, index: &str, column: &str) -> Result<bool> {
        Ok(self
            .index_definition(index)?
            .is_some_and(|info| info.table == table && info.columns.iter().any(|c| c == column)))
    }
}

/// Whether `name` is attached to the connection.
pub fn database_exists<C: Connection>(conn: &C, name: &str) -> Result<bool> {
    Ok(query_count(
        conn,
        "SELECT COUNT(*) FROM pragma_database_list WHERE name = ?",
        &[Value::from(name)],
    )? > 0)
}

fn query_count<C: Connection>(conn: &C, sql: &str, params: &[Value]) -> Result<i64> {
    let mut cursor = conn.cursor(sql)?;
    let mut rows = cursor.query(params)?;
    match rows.next() {
        Some(row) => Ok(int_at(&row?, 0)),
        None => Err(DriverError::new(ErrorKind::Other, "count query returned no rows").into()),
    }
}

fn query_strings<C: Connection>(conn: &C, sql: &str, params: &[Value]) -> Result<Vec<String>> {
    let mut cursor = conn.cursor(sql)?;
    let values = cursor
        .query(params)?
        .map(|row| row.map(|row| text_at(&row, 0)))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(values)
}

fn text_at(row: &[Value], i: usize) -> String {
    match row.get(i) {
        Some(Value::Null) | None => String::new(),
        Some(value) => value.to_string(),
    }
}

fn int_at(row: &[Value], i: usize) -> i64 {
    row.get(i).and_then(Value::as_i64).unwrap_or_default()
}
