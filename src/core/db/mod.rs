/// Database Module
///
/// This module provides the database layer underneath the client,
/// organized into focused submodules.
///
/// ## Architecture
///
/// - **Connection** (`connection.rs`): the `Connection`/`Cursor` capability traits and the SQLite backend
/// - **Schema Introspection** (`schema.rs`): read-only metadata queries (the inspector)
/// - **Query** (`query.rs`): lazy row streams bound to a cursor
/// - **Transaction** (`transaction.rs`): begin/commit/rollback scoping
/// - **Value** (`value.rs`): scalar values and rows
///
/// ## Error Handling
///
/// Backends report `DriverError`s carrying a closed `ErrorKind`; everything
/// above the backend converts them into `ReataError`.
pub mod connection;
pub mod query;
pub mod schema;
pub mod transaction;
pub mod value;

pub use connection::*;
pub use query::*;
pub use schema::*;
pub use transaction::*;
pub use value::*;
