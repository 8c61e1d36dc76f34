/// # Test Utilities Module
///
/// Fixtures shared by the unit tests:
/// - a recording `Connection` double that logs transaction control and
///   cursor lifecycle calls
/// - an in-memory SQLite client fixture with the standard test table
use crate::client::Client;
use crate::core::db::{Connection, Cursor, Row, SqliteConnection, Value};
use crate::core::{DriverError, DriverResult, ErrorKind};
use crate::schema::TableSchema;
use std::cell::{Cell, RefCell};

/// Temporary database name used by client fixtures.
pub const TEMP_DB: &str = "DELETE_ME";

/// Connection double that records every call made on it.
#[derive(Debug, Default)]
pub struct RecordingConnection {
    calls: RefCell<Vec<&'static str>>,
    fail_commit: Cell<bool>,
    fail_rollback: Cell<bool>,
    fail_execute: Cell<bool>,
    in_transaction: Cell<bool>,
}

impl RecordingConnection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.borrow().clone()
    }

    pub fn fail_commit(&self) {
        self.fail_commit.set(true);
    }

    pub fn fail_rollback(&self) {
        self.fail_rollback.set(true);
    }

    pub fn fail_execute(&self) {
        self.fail_execute.set(true);
    }

    fn record(&self, call: &'static str) {
        self.calls.borrow_mut().push(call);
    }
}

impl Connection for RecordingConnection {
    type Cursor<'c> = RecordingCursor<'c> where Self: 'c;

    fn cursor(&self, _sql: &str) -> DriverResult<RecordingCursor<'_>> {
        self.record("cursor");
        Ok(RecordingCursor { conn: self })
    }

    fn begin(&self) -> DriverResult<()> {
        self.record("begin");
        self.in_transaction.set(true);
        Ok(())
    }

    fn commit(&self) -> DriverResult<()> {
        self.record("commit");
        if self.fail_commit.get() {
            return Err(DriverError::new(ErrorKind::Transport, "commit failed"));
        }
        self.in_transaction.set(false);
        Ok(())
    }

    fn rollback(&self) -> DriverResult<()> {
        self.record("rollback");
        self.in_transaction.set(false);
        if self.fail_rollback.get() {
            return Err(DriverError::new(ErrorKind::Transport, "rollback failed"));
        }
        Ok(())
    }

    fn in_transaction(&self) -> bool {
        self.in_transaction.get()
    }
}

/// Cursor double; records `close` when dropped.
pub struct RecordingCursor<'c> {
    conn: &'c RecordingConnection,
}

impl Cursor for RecordingCursor<'_> {
    type Rows<'r> = std::vec::IntoIter<DriverResult<Row>> where Self: 'r;

    fn execute(&mut self, params: &[Value]) -> DriverResult<usize> {
        self.conn.record("execute");
        if self.conn.fail_execute.get() {
            return Err(DriverError::new(ErrorKind::Integrity, "duplicate key"));
        }
        Ok(params.len())
    }

    fn query(&mut self, _params: &[Value]) -> DriverResult<Self::Rows<'_>> {
        self.conn.record("query");
        Ok(Vec::new().into_iter())
    }
}

impl Drop for RecordingCursor<'_> {
    fn drop(&mut self) {
        self.conn.record("close");
    }
}

/// Columns of the standard test table: auto id, two plain columns and a
/// stored generated column.
pub const TEST_COLUMNS: [(&str, &str); 4] = [
    ("id", "INTEGER NOT NULL"),
    ("name", "VARCHAR(32) NOT NULL"),
    ("age", "INTEGER DEFAULT NULL"),
    ("computed", "INTEGER GENERATED ALWAYS AS (age * 2) STORED"),
];

pub fn test_table() -> TableSchema {
    TableSchema::new("test_table", TEST_COLUMNS, ["id"]).expect("valid test schema")
}

pub fn test_data() -> Vec<Row> {
    vec![
        crate::row!["Bob", 42],
        crate::row!["Karen", 56],
        crate::row!["Earl", 40],
        crate::row!["Natalie", 26],
        crate::row!["John", 35],
    ]
}

/// An in-memory client with no database selected.
pub fn client() -> Client<SqliteConnection> {
    Client::open_in_memory().expect("in-memory client")
}

/// An in-memory client with [`TEMP_DB`] selected and the test table created.
pub fn client_with_table() -> Client<SqliteConnection> {
    let mut client = client();
    client.use_database(TEMP_DB, true).expect("select temp database");
    client.create_table(&test_table()).expect("create test table");
    client
}
