//! Identity provider error types.

use warden_core::ReqStatus;
use warden_directory::DirectoryError;
use warden_store::StoreError;

/// Errors from identity operations.
#[derive(Debug, thiserror::Error)]
pub enum IdError {
    /// The request payload was malformed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A directory operation failed.
    #[error(transparent)]
    Directory(#[from] DirectoryError),

    /// A local store write failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IdError {
    /// Whether this failure should flip the backend offline.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Directory(err) if err.is_transport())
    }

    /// The completion status reported to the front-end.
    #[must_use]
    pub fn status(&self) -> ReqStatus {
        match self {
            Self::InvalidRequest(_) => ReqStatus::InvalidRequest,
            Self::Directory(DirectoryError::BindFailed(_)) => ReqStatus::AuthFailed,
            Self::Directory(
                DirectoryError::ConnectFailed(_)
                | DirectoryError::NotConnected
                | DirectoryError::Io(_),
            ) => ReqStatus::RetryLater,
            Self::Directory(DirectoryError::Search(_)) | Self::Store(_) => ReqStatus::IoError,
        }
    }
}

/// Result type for identity operations.
pub type IdResult<T> = Result<T, IdError>;
