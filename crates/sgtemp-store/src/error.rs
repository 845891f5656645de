//! Error types for sgtemp-store.

use std::path::PathBuf;

/// Result type for sgtemp-store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in sgtemp-store.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Database error from SQLite.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Failed to create database directory.
    #[error("Failed to create database directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A stored row could not be turned back into a reading.
    #[error("Invalid stored row: {0}")]
    InvalidRow(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
