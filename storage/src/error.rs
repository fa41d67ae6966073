//! Storage error types.
//!
//! Repository methods return `sqlx::Error` directly; [`StorageError`] is the
//! boundary type for callers that need to distinguish startup failures.

use thiserror::Error;

/// Errors that can occur when using storage operations.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),
    #[error("Connection failed after {attempts} attempts: {last_error}")]
    ConnectExhausted { attempts: u32, last_error: String },
}

impl From<sqlx::Error> for StorageError {
    fn from(e: sqlx::Error) -> Self {
        StorageError::Database(e.to_string())
    }
}
