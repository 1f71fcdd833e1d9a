//! Error types for the storage layer.

use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A staged update or delete targeted a row that does not exist.
    #[error("record not found: {0}")]
    NotFound(String),

    /// A staged operation violated a store constraint.
    #[error("constraint violation: {0}")]
    Constraint(String),

    /// Malformed filter path, kind key, or payload.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// IO error (file system).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A background task carrying a store call failed to complete.
    #[error("background task failed: {0}")]
    Task(String),
}
