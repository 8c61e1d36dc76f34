// Core infrastructure modules
pub mod core;

// Client and its building blocks
pub mod client;
pub mod config;
pub mod logging;
pub mod schema;
pub mod sql;

#[cfg(test)]
mod test_utils;

pub use client::{Client, UpdateMethod};
pub use config::{ClientConfig, Config};
pub use crate::core::db::{Connection, Cursor, Row, RowCursor, RowStream, SqliteConnection, Value};
pub use crate::core::{DriverError, ErrorKind, ReataError, Result};
pub use schema::{PrimaryKey, TableSchema};
