//! Table blueprints consumed by the DDL manager.

use crate::core::{ReataError, Result};
use std::collections::HashSet;

/// The ordered, non-empty list of columns forming a table's primary key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimaryKey {
    key_columns: Vec<String>,
}

impl PrimaryKey {
    pub fn key_columns(&self) -> &[String] {
        &self.key_columns
    }
}

/// Describes a table: its name, ordered column definitions and primary key.
///
/// Column definitions are dialect strings holding the type and constraints,
/// e.g. `"VARCHAR(32) NOT NULL"` or `"INTEGER GENERATED ALWAYS AS (age * 2) STORED"`.
/// The order columns are given in is the order used for DDL and for default
/// read projections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    name: String,
    columns: Vec<(String, String)>,
    primary_key: PrimaryKey,
}

impl TableSchema {
    /// Builds a schema, rejecting primary keys that reference unknown columns.
    ///
    /// ```
    /// use reata::TableSchema;
    ///
    /// let schema = TableSchema::new(
    ///     "people",
    ///     [("id", "INTEGER NOT NULL"), ("name", "TEXT")],
    ///     ["id"],
    /// )
    /// .unwrap();
    /// assert_eq!(schema.primary_key().key_columns(), ["id"]);
    ///
    /// assert!(TableSchema::new("people", [("name", "TEXT")], ["id"]).is_err());
    /// ```
    pub fn new<C, K, V, P, S>(name: impl Into<String>, columns: C, primary_key: P) -> Result<Self>
    where
        C: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
        P: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        if name.is_empty() {
            return Err(ReataError::Validation("table name must not be empty".to_string()));
        }

        let columns: Vec<(String, String)> = columns
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        let mut seen = HashSet::new();
        for (column, _) in &columns {
            if column.is_empty() {
                return Err(ReataError::Validation(format!(
                    "table '{name}' has a column with an empty name"
                )));
            }
            if !seen.insert(column.as_str()) {
                return Err(ReataError::Validation(format!(
                    "column '{column}' is defined twice in table '{name}'"
                )));
            }
        }

        let key_columns: Vec<String> = primary_key.into_iter().map(Into::into).collect();
        if key_columns.is_empty() {
            return Err(ReataError::Validation(format!(
                "table '{name}' needs at least one primary key column"
            )));
        }
        if let Some(missing) = key_columns.iter().find(|k| !seen.contains(k.as_str())) {
            return Err(ReataError::Validation(format!(
                "primary key column '{missing}' is not a column of table '{name}'"
            )));
        }

        Ok(TableSchema {
            name,
            columns,
            primary_key: PrimaryKey { key_columns },
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Column `(name, definition)` pairs in declaration order.
    pub fn columns(&self) -> &[(String, String)] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn primary_key(&self) -> &PrimaryKey {
        &self.primary_key
    }
}
