/// Reata Error Module
///
/// This module defines the error types surfaced by the client. Driver level
/// failures are first classified into a closed [`ErrorKind`] by the
/// connection backend, then mapped onto the public [`ReataError`] taxonomy.
use thiserror::Error;

/// Coarse classification every connection backend must assign to its errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The referenced database, table, column or index does not exist
    NotFound,
    /// The object being created already exists
    AlreadyExists,
    /// A uniqueness, primary key or other constraint was violated
    Integrity,
    /// The transport failed (I/O, locking, unreadable or unavailable database)
    Transport,
    /// Anything the backend could not place in the categories above
    Other,
}

/// An error raised by a [`Connection`](crate::core::db::Connection) backend.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct DriverError {
    pub kind: ErrorKind,
    /// Native error code, when the backend reports one
    pub code: Option<i32>,
    pub message: String,
}

impl DriverError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        DriverError {
            kind,
            code: None,
            message: message.into(),
        }
    }

    pub fn with_code(mut self, code: i32) -> Self {
        self.code = Some(code);
        self
    }
}

/// Result type used by connection backends.
pub type DriverResult<T> = std::result::Result<T, DriverError>;

/// Error type for every client operation.
#[derive(Error, Debug)]
pub enum ReataError {
    /// Malformed input rejected before anything reaches the database
    #[error("Validation error: {0}")]
    Validation(String),

    /// The database to select does not exist and was not auto-created
    #[error("Database '{0}' does not exist")]
    DatabaseNotFound(String),

    /// A table, column or index referenced by a statement does not exist
    #[error("Object not found: {0}")]
    ObjectNotFound(#[source] DriverError),

    /// A write collided with a primary key or unique constraint
    #[error("Integrity error: {0}")]
    Integrity(#[source] DriverError),

    /// Transport-level failure
    #[error("Connection error: {0}")]
    Connection(#[source] DriverError),

    /// The operation needs an active database and none has been selected
    #[error("No database selected")]
    NoDatabaseSelected,

    /// An index name is already taken by a different definition
    #[error("Index '{index}' already exists on {table}({})", columns.join(", "))]
    IndexConflict {
        index: String,
        table: String,
        columns: Vec<String>,
    },

    /// Any other driver error, propagated untouched
    #[error("Database error: {0}")]
    Database(#[source] DriverError),

    /// Configuration loading and validation errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File system and I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<DriverError> for ReataError {
    fn from(err: DriverError) -> Self {
        match err.kind {
            ErrorKind::NotFound => ReataError::ObjectNotFound(err),
            ErrorKind::Integrity => ReataError::Integrity(err),
            ErrorKind::Transport => ReataError::Connection(err),
            ErrorKind::AlreadyExists | ErrorKind::Other => ReataError::Database(err),
        }
    }
}

impl ReataError {
    /// The driver error underneath this error, if there is one.
    pub fn driver_error(&self) -> Option<&DriverError> {
        match self {
            ReataError::ObjectNotFound(e)
            | ReataError::Integrity(e)
            | ReataError::Connection(e)
            | ReataError::Database(e) => Some(e),
            _ => None,
        }
    }
}

/// Type alias for Result to use ReataError as the error type.
pub type Result<T> = std::result::Result<T, ReataError>;
