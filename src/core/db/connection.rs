/// Connection Module
///
/// This module defines the capability interface the client needs from a
/// database connection (cursors, statement execution, transaction control)
/// and provides the SQLite backend built on `rusqlite`.

use crate::config::SqliteConfig;
use crate::core::db::value::{Row, Value};
use crate::core::error::{DriverError, DriverResult, ErrorKind};
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::config::DbConfig;
use rusqlite::{params_from_iter, ErrorCode};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// A live connection to a database server.
///
/// Cursors borrow the connection, so the borrow checker keeps a cursor from
/// outliving the handle it was opened on.
pub trait Connection {
    type Cursor<'c>: Cursor
    where
        Self: 'c;

    /// Opens a cursor over a single statement.
    fn cursor(&self, sql: &str) -> DriverResult<Self::Cursor<'_>>;

    /// Runs a statement that returns no rows, releasing its cursor on every path.
    fn execute(&self, sql: &str, params: &[Value]) -> DriverResult<usize> {
        let mut cursor = self.cursor(sql)?;
        cursor.execute(params)
    }

    fn begin(&self) -> DriverResult<()>;

    fn commit(&self) -> DriverResult<()>;

    fn rollback(&self) -> DriverResult<()>;

    /// Whether a transaction is currently open on this connection.
    fn in_transaction(&self) -> bool;
}

/// A prepared statement opened on a [`Connection`].
pub trait Cursor {
    type Rows<'r>: Iterator<Item = DriverResult<Row>>
    where
        Self: 'r;

    /// Executes the statement, returning the number of rows changed.
    fn execute(&mut self, params: &[Value]) -> DriverResult<usize>;

    /// Executes the statement and streams back its rows.
    fn query(&mut self, params: &[Value]) -> DriverResult<Self::Rows<'_>>;
}

/// SQLite connection handle.
#[derive(Debug)]
pub struct SqliteConnection {
    conn: rusqlite::Connection,
}

impl SqliteConnection {
    /// Opens (creating if needed) the database file at `path`.
    pub fn open<P: AsRef<Path>>(path: P, config: &SqliteConfig) -> DriverResult<Self> {
        let conn = rusqlite::Connection::open(path)?;
        Self::configure(conn, config)
    }

    pub fn open_in_memory(config: &SqliteConfig) -> DriverResult<Self> {
        let conn = rusqlite::Connection::open_in_memory()?;
        Self::configure(conn, config)
    }

    fn configure(conn: rusqlite::Connection, config: &SqliteConfig) -> DriverResult<Self> {
        conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))?;
        conn.pragma_update(None, "foreign_keys", config.foreign_keys)?;
        // Double-quoted identifiers must never fall back to string literals.
        conn.set_db_config(DbConfig::SQLITE_DBCONFIG_DQS_DML, false)?;
        conn.set_db_config(DbConfig::SQLITE_DBCONFIG_DQS_DDL, false)?;
        Ok(SqliteConnection { conn })
    }

    /// The underlying `rusqlite` connection.
    pub fn raw(&self) -> &rusqlite::Connection {
        &self.conn
    }
}

impl From<rusqlite::Connection> for SqliteConnection {
    fn from(conn: rusqlite::Connection) -> Self {
        SqliteConnection { conn }
    }
}

impl Connection for SqliteConnection {
    type Cursor<'c> = SqliteCursor<'c> where Self: 'c;

    fn cursor(&self, sql: &str) -> DriverResult<SqliteCursor<'_>> {
        debug!(%sql, "preparing statement");
        let stmt = self.conn.prepare(sql)?;
        Ok(SqliteCursor { stmt })
    }

    fn begin(&self) -> DriverResult<()> {
        Ok(self.conn.execute_batch("BEGIN")?)
    }

    fn commit(&self) -> DriverResult<()> {
        Ok(self.conn.execute_batch("COMMIT")?)
    }

    fn rollback(&self) -> DriverResult<()> {
        Ok(self.conn.execute_batch("ROLLBACK")?)
    }

    fn in_transaction(&self) -> bool {
        !self.conn.is_autocommit()
    }
}

/// A prepared SQLite statement. Finalized when dropped.
pub struct SqliteCursor<'c> {
    stmt: rusqlite::Statement<'c>,
}

impl Cursor for SqliteCursor<'_> {
    type Rows<'r> = SqliteRows<'r> where Self: 'r;

    fn execute(&mut self, params: &[Value]) -> DriverResult<usize> {
        Ok(self.stmt.execute(params_from_iter(params.iter()))?)
    }

    fn query(&mut self, params: &[Value]) -> DriverResult<SqliteRows<'_>> {
        let width = self.stmt.column_count();
        let rows = self.stmt.query(params_from_iter(params.iter()))?;
        Ok(SqliteRows {
            rows,
            width,
            done: false,
        })
    }
}

/// Rows produced by a [`SqliteCursor`], stepped one at a time.
pub struct SqliteRows<'r> {
    rows: rusqlite::Rows<'r>,
    width: usize,
    done: bool,
}

impl Iterator for SqliteRows<'_> {
    type Item = DriverResult<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let width = self.width;
        let item = match self.rows.next() {
            Ok(Some(row)) => (0..width)
                .map(|i| row.get_ref(i).map(Value::from))
                .collect::<rusqlite::Result<Row>>()
                .map_err(DriverError::from),
            Ok(None) => {
                self.done = true;
                return None;
            }
            Err(e) => Err(DriverError::from(e)),
        };
        if item.is_err() {
            self.done = true;
        }
        Some(item)
    }
}

/// Messages SQLite reports under the generic `SQLITE_ERROR` code when the
/// object being created is already there.
static ALREADY_EXISTS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^(?:(?:table|index|view|trigger) (?:"[^"]*"|\S+) already exists|database \S+ is already in use)$"#,
    )
    .expect("valid regex")
});

/// Messages SQLite reports under `SQLITE_ERROR` for missing objects.
static NOT_FOUND: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^(?:no such (?:table|column|index|database)|unknown database|table (?:"[^"]*"|\S+) has no column named)\b"#,
    )
    .expect("valid regex")
});

/// Classifies a generic SQLite error message.
fn classify_message(message: &str) -> ErrorKind {
    if ALREADY_EXISTS.is_match(message) {
        ErrorKind::AlreadyExists
    } else if NOT_FOUND.is_match(message) {
        ErrorKind::NotFound
    } else {
        ErrorKind::Other
    }
}

fn classify_code(code: ErrorCode, message: &str) -> ErrorKind {
    match code {
        ErrorCode::ConstraintViolation => ErrorKind::Integrity,
        ErrorCode::CannotOpen
        | ErrorCode::NotADatabase
        | ErrorCode::DatabaseBusy
        | ErrorCode::DatabaseLocked
        | ErrorCode::DatabaseCorrupt
        | ErrorCode::SystemIoFailure
        | ErrorCode::DiskFull
        | ErrorCode::PermissionDenied
        | ErrorCode::FileLockingProtocolFailed
        | ErrorCode::NoLargeFileSupport => ErrorKind::Transport,
        ErrorCode::Unknown => classify_message(message),
        _ => ErrorKind::Other,
    }
}

impl From<rusqlite::Error> for DriverError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(ffi, message) => {
                let message = message.clone().unwrap_or_else(|| ffi.to_string());
                DriverError::new(classify_code(ffi.code, &message), message)
                    .with_code(ffi.extended_code)
            }
            // Prepare-time failures that carry an offset into the statement.
            rusqlite::Error::SqlInputError { error, msg, .. } => {
                DriverError::new(classify_code(error.code, msg), msg.clone())
                    .with_code(error.extended_code)
            }
            rusqlite::Error::QueryReturnedNoRows => {
                DriverError::new(ErrorKind::NotFound, err.to_string())
            }
            _ => DriverError::new(ErrorKind::Other, err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open() -> SqliteConnection {
        SqliteConnection::open_in_memory(&SqliteConfig::default()).unwrap()
    }

    #[test]
    fn test_classify_messages() {
        assert_eq!(classify_message("table people already exists"), ErrorKind::AlreadyExists);
        assert_eq!(classify_message("index name_idx already exists"), ErrorKind::AlreadyExists);
        assert_eq!(classify_message("database DELETE_ME is already in use"), ErrorKind::AlreadyExists);
        assert_eq!(classify_message("no such table: main.people"), ErrorKind::NotFound);
        assert_eq!(classify_message("unknown database nowhere"), ErrorKind::NotFound);
        assert_eq!(
            classify_message("table test_table has no column named nmae"),
            ErrorKind::NotFound
        );
        assert_eq!(classify_message("near \"SELEC\": syntax error"), ErrorKind::Other);
    }

    #[test]
    fn test_sqlite_errors_are_classified() {
        let conn = open();
        conn.execute("CREATE TABLE t (id INTEGER PRIMARY KEY)", &[]).unwrap();

        let err = conn.execute("CREATE TABLE t (id INTEGER PRIMARY KEY)", &[]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::AlreadyExists);
        assert_eq!(err.code, Some(1));

        let err = conn.execute("INSERT INTO missing VALUES (1)", &[]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);

        let err = conn.execute("INSERT INTO t (nope) VALUES (1)", &[]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);

        conn.execute("INSERT INTO t VALUES (?)", &[Value::Integer(1)]).unwrap();
        let err = conn.execute("INSERT INTO t VALUES (?)", &[Value::Integer(1)]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Integrity);
        assert!(err.code.is_some());
    }

    #[test]
    fn test_cursor_streams_rows() {
        let conn = open();
        conn.execute("CREATE TABLE t (a INTEGER, b TEXT)", &[]).unwrap();
        conn.execute(
            "INSERT INTO t VALUES (?, ?), (?, ?)",
            &[Value::Integer(1), Value::from("x"), Value::Integer(2), Value::Null],
        )
        .unwrap();

        let mut cursor = conn.cursor("SELECT a, b FROM t").unwrap();
        let mut rows = cursor.query(&[]).unwrap();
        assert_eq!(rows.next().unwrap().unwrap(), vec![Value::Integer(1), Value::from("x")]);
        assert_eq!(rows.next().unwrap().unwrap(), vec![Value::Integer(2), Value::Null]);
        assert!(rows.next().is_none());
        assert!(rows.next().is_none());
    }

    #[test]
    fn test_double_quotes_are_identifiers_only() {
        let conn = open();
        conn.execute("CREATE TABLE t (a INTEGER)", &[]).unwrap();
        conn.execute("INSERT INTO t VALUES (1)", &[]).unwrap();

        let err = conn.cursor(r#"SELECT "nope" FROM t"#).err().unwrap();
        assert_eq!(err.kind, ErrorKind::NotFound);
        let err = conn.execute(r#"CREATE INDEX t_idx ON t ("nope")"#, &[]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[test]
    fn test_transaction_control() {
        let conn = open();
        assert!(!conn.in_transaction());
        conn.begin().unwrap();
        assert!(conn.in_transaction());
        conn.execute("CREATE TABLE t (a INTEGER)", &[]).unwrap();
        conn.rollback().unwrap();
        assert!(!conn.in_transaction());

        let err = conn.execute("SELECT * FROM t", &[]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }
}
