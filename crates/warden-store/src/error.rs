//! Store error types.

/// Errors from local store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested record was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// A store operation failed.
    #[error("store error: {0}")]
    Internal(String),

    /// The record being written is malformed.
    #[error("invalid record: {0}")]
    InvalidRecord(String),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
