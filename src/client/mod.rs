//! The schema-aware client.
//!
//! A [`Client`] owns one connection and tracks the active database. DDL lives
//! in `ddl`, writes in `write` and reads in `read`; introspection is
//! delegated to [`Inspector`].

mod ddl;
mod read;
mod write;

pub use write::UpdateMethod;

use crate::config::{ClientConfig, Config};
use crate::core::db::schema::{self, ColumnInfo, IndexInfo, Inspector};
use crate::core::db::transaction::run_in_scope;
use crate::core::db::{Connection, SqliteConnection};
use crate::core::{ReataError, Result};
use std::collections::HashSet;
use std::path::Path;

/// Client over a single connection.
pub struct Client<C: Connection = SqliteConnection> {
    connection: C,
    database: Option<String>,
    config: ClientConfig,
}

impl Client<SqliteConnection> {
    /// A client over a private in-memory SQLite connection with default settings.
    pub fn open_in_memory() -> Result<Self> {
        let config = Config::default();
        let connection = SqliteConnection::open_in_memory(&config.sqlite)?;
        Ok(Client::with_config(connection, config.client))
    }

    /// A client over the SQLite file at `path`.
    pub fn open<P: AsRef<Path>>(path: P, config: &Config) -> Result<Self> {
        config.validate()?;
        let connection = SqliteConnection::open(path, &config.sqlite)?;
        Ok(Client::with_config(connection, config.client.clone()))
    }
}

impl<C: Connection> Client<C> {
    /// Wraps an already-open connection.
    pub fn new(connection: C) -> Self {
        Client::with_config(connection, ClientConfig::default())
    }

    pub fn with_config(connection: C, config: ClientConfig) -> Self {
        Client {
            connection,
            database: None,
            config,
        }
    }

    /// The active database, if one has been selected.
    pub fn database(&self) -> Option<&str> {
        self.database.as_deref()
    }

    pub fn connection(&self) -> &C {
        &self.connection
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn into_connection(self) -> C {
        self.connection
    }

    fn require_database(&self) -> Result<&str> {
        self.database.as_deref().ok_or(ReataError::NoDatabaseSelected)
    }

    fn inspector(&self) -> Result<Inspector<'_, C>> {
        Ok(Inspector::new(&self.connection, self.require_database()?))
    }

    /// Runs `op` inside a transaction unless `autocommit` is false.
    fn scoped<T>(&self, autocommit: bool, op: impl FnOnce() -> Result<T>) -> Result<T> {
        run_in_scope(&self.connection, autocommit, op)
    }

    // Introspection

    pub fn database_exists(&self, name: &str) -> Result<bool> {
        schema::database_exists(&self.connection, name)
    }

    pub fn table_exists(&self, table: &str) -> Result<bool> {
        self.inspector()?.table_exists(table)
    }

    pub fn index_exists(&self, table: &str, index: &str, column: &str) -> Result<bool> {
        self.inspector()?.index_exists(table, index, column)
    }

    pub fn index_definition(&self, index: &str) -> Result<Option<IndexInfo>> {
        self.inspector()?.index_definition(index)
    }

    /// Names of all tables in the active database.
    pub fn table_names(&self) -> Result<HashSet<String>> {
        self.inspector()?.table_names()
    }

    pub fn columns(&self, table: &str) -> Result<Vec<ColumnInfo>> {
        self.inspector()?.columns(table)
    }

    pub fn column_count(&self, table: &str, include_virtual: bool) -> Result<usize> {
        self.inspector()?.column_count(table, include_virtual)
    }

    pub fn column_names(
        &self,
        table: &str,
        include_virtual: bool,
        include_auto: bool,
    ) -> Result<Vec<String>> {
        self.inspector()?
            .column_names(table, include_virtual, include_auto)
    }

    // Caller-managed transactions

    pub fn begin(&self) -> Result<()> {
        Ok(self.connection.begin()?)
    }

    pub fn commit(&self) -> Result<()> {
        Ok(self.connection.commit()?)
    }

    pub fn rollback(&self) -> Result<()> {
        Ok(self.connection.rollback()?)
    }

    pub fn in_transaction(&self) -> bool {
        self.connection.in_transaction()
    }

    /// Runs `op` in one transaction, committing on `Ok` and rolling back on `Err`.
    ///
    /// Operations inside should use their `_with` variants with
    /// `autocommit = false` so they join this transaction.
    pub fn transaction<T>(&self, op: impl FnOnce(&Self) -> Result<T>) -> Result<T> {
        self.scoped(true, || op(self))
    }
}
