//! Idempotent DDL: databases, tables and indexes.

use super::Client;
use crate::core::db::{Connection, Value};
use crate::core::{DriverError, ErrorKind, ReataError, Result};
use crate::schema::TableSchema;
use crate::sql;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Schemas every SQLite connection carries; they can be selected but not dropped.
const BUILTIN_DATABASES: [&str; 2] = ["main", "temp"];

/// Treats "already exists" as success and passes every other error through.
fn ignore_existing(result: std::result::Result<usize, DriverError>) -> Result<()> {
    match result {
        Ok(_) => Ok(()),
        Err(e) if e.kind == ErrorKind::AlreadyExists => {
            debug!(error = %e, "object already exists");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// A database name doubles as a file name and must be one plain path component.
fn check_database_name(name: &str) -> Result<()> {
    if name.is_empty() || name.contains(['/', '\\', '\0']) || name.contains("..") {
        return Err(ReataError::Validation(format!("invalid database name '{name}'")));
    }
    Ok(())
}

fn database_file(dir: &Path, name: &str) -> Result<PathBuf> {
    check_database_name(name)?;
    Ok(dir.join(format!("{name}.db")))
}

impl<C: Connection> Client<C> {
    fn database_location(&self, name: &str) -> Result<String> {
        match &self.config.data_dir {
            Some(dir) => {
                let file = database_file(dir, name)?;
                std::fs::create_dir_all(dir)?;
                Ok(file.to_string_lossy().into_owned())
            }
            None => Ok(":memory:".to_string()),
        }
    }

    /// Creates `name` unless it already exists.
    ///
    /// The database is attached from `<data_dir>/<name>.db` when a data
    /// directory is configured and is an in-memory database otherwise.
    /// SQLite cannot attach inside a transaction, so this is never scoped.
    pub fn create_database(&self, name: &str) -> Result<()> {
        check_database_name(name)?;
        if self.database_exists(name)? {
            debug!(database = name, "database already exists");
            return Ok(());
        }
        let location = self.database_location(name)?;
        ignore_existing(
            self.connection
                .execute(&sql::attach_database(name), &[Value::from(location.as_str())]),
        )?;
        info!(database = name, %location, "created database");
        Ok(())
    }

    /// Selects `name` as the active database, creating it first when
    /// `auto_create` is set. The active database is unchanged on failure.
    pub fn use_database(&mut self, name: &str, auto_create: bool) -> Result<()> {
        if !self.database_exists(name)? {
            if !auto_create {
                return Err(ReataError::DatabaseNotFound(name.to_string()));
            }
            self.create_database(name)?;
        }
        self.database = Some(name.to_string());
        info!(database = name, "selected database");
        Ok(())
    }

    /// Detaches `name`, deleting its file under the data directory.
    ///
    /// Dropping a missing database is a no-op. Dropping the active database
    /// leaves no database selected.
    pub fn drop_database(&mut self, name: &str) -> Result<()> {
        if BUILTIN_DATABASES.contains(&name) {
            return Err(ReataError::Validation(format!(
                "database '{name}' cannot be dropped"
            )));
        }
        if !self.database_exists(name)? {
            return Ok(());
        }
        let file = match &self.config.data_dir {
            Some(dir) => Some(database_file(dir, name)?),
            None => None,
        };
        self.connection.execute(&sql::detach_database(name), &[])?;
        if let Some(file) = file {
            match std::fs::remove_file(file) {
                Err(e) if e.kind() != std::io::ErrorKind::NotFound => return Err(e.into()),
                _ => {}
            }
        }
        if self.database.as_deref() == Some(name) {
            self.database = None;
        }
        info!(database = name, "dropped database");
        Ok(())
    }

    /// Creates the table described by `schema` unless it already exists.
    pub fn create_table(&self, schema: &TableSchema) -> Result<()> {
        self.create_table_with(schema, true)
    }

    pub fn create_table_with(&self, schema: &TableSchema, autocommit: bool) -> Result<()> {
        let database = self.require_database()?;
        if self.table_exists(schema.name())? {
            debug!(table = schema.name(), "table already exists");
            return Ok(());
        }
        self.scoped(autocommit, || {
            ignore_existing(
                self.connection
                    .execute(&sql::create_table(database, schema), &[]),
            )
        })?;
        info!(database, table = schema.name(), "created table");
        Ok(())
    }

    pub fn drop_table(&self, table: &str) -> Result<()> {
        self.drop_table_with(table, true)
    }

    pub fn drop_table_with(&self, table: &str, autocommit: bool) -> Result<()> {
        let database = self.require_database()?;
        self.scoped(autocommit, || {
            self.connection.execute(&sql::drop_table(database, table), &[])?;
            Ok(())
        })
    }

    /// Adds a non-unique index named `index` on `table(column)`.
    ///
    /// Re-adding an identical index is a no-op. If the name is already used
    /// by an index with any other definition this fails with
    /// [`ReataError::IndexConflict`] and the existing index is left as is.
    pub fn add_index(&self, table: &str, index: &str, column: &str) -> Result<()> {
        self.add_index_with(table, index, column, true)
    }

    pub fn add_index_with(
        &self,
        table: &str,
        index: &str,
        column: &str,
        autocommit: bool,
    ) -> Result<()> {
        let database = self.require_database()?;
        if let Some(existing) = self.index_definition(index)? {
            if existing.table == table && existing.columns == [column] {
                debug!(index, "index already exists");
                return Ok(());
            }
            return Err(ReataError::IndexConflict {
                index: existing.name,
                table: existing.table,
                columns: existing.columns,
            });
        }
        self.scoped(autocommit, || {
            self.connection
                .execute(&sql::create_index(database, index, table, column), &[])?;
            Ok(())
        })?;
        info!(database, table, index, column, "created index");
        Ok(())
    }
}
