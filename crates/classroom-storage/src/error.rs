//! Storage error types.

/// Errors from storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The requested row was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// A query against the embedded store failed.
    #[error("storage error: {0}")]
    Internal(String),

    /// Connection to the embedded store failed.
    #[error("connection error: {0}")]
    Connection(String),

    /// Serialization or deserialization of a stored record failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A write task could not be enqueued within the configured deadline.
    #[error("write timeout after {millis}ms")]
    WriteTimeout {
        /// How long the caller waited before giving up.
        millis: u64,
    },

    /// A write failed on both the initial attempt and the single retry.
    #[error("write failed after retry: {0}")]
    RetryExhausted(String),

    /// A write was submitted after the writer had started shutting down.
    #[error("persistence writer is shutting down")]
    ShuttingDown,
}

impl From<surrealdb::Error> for StorageError {
    fn from(e: surrealdb::Error) -> Self {
        StorageError::Internal(e.to_string())
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
