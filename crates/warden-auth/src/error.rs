//! Authentication error types.

use warden_store::StoreError;

/// Errors from the authentication pipeline.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Spawning the helper or talking to it over its pipes failed.
    #[error("helper i/o failed: {0}")]
    Io(#[from] std::io::Error),

    /// The helper's reply did not frame correctly.
    #[error("malformed helper reply: {0}")]
    MalformedReply(String),

    /// No user principal name could be resolved or synthesized.
    #[error("no user principal for {0}")]
    MissingPrincipal(String),

    /// A local store read failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type for authentication operations.
pub type AuthResult<T> = Result<T, AuthError>;
