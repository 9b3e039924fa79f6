//! Directory error types.

/// Errors from directory operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DirectoryError {
    /// The transport could not be established.
    #[error("connect failed: {0}")]
    ConnectFailed(String),

    /// The server rejected the bind credentials.
    #[error("bind failed: {0}")]
    BindFailed(String),

    /// The session is not connected.
    #[error("not connected")]
    NotConnected,

    /// The server returned an error for a specific search.
    #[error("search failed: {0}")]
    Search(String),

    /// The transport failed mid-session.
    #[error("directory i/o error: {0}")]
    Io(String),
}

impl DirectoryError {
    /// Whether this error invalidates the session and flips the backend
    /// offline. A failed search after a good bind does neither.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::ConnectFailed(_) | Self::BindFailed(_) | Self::NotConnected | Self::Io(_)
        )
    }
}

/// Result type for directory operations.
pub type DirectoryResult<T> = Result<T, DirectoryError>;
