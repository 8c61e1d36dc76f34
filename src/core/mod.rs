/// Core Module for Reata
///
/// This module contains the building blocks the client is assembled from:
/// the connection capability interface and its SQLite backend, metadata
/// introspection, row streaming, transaction scoping and error handling.

pub mod db;
pub mod error;

// Re-export commonly used types for convenience
pub use error::{DriverError, DriverResult, ErrorKind, ReataError, Result};
