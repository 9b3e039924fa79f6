//! Exactly-once completion handles for front-end requests.
//!
//! Every request delivered by the front-end completes through exactly one
//! callback, whether it succeeds, fails, or is dropped mid-flight. The
//! handles here enforce that: completing consumes the handle, and dropping
//! an unfired handle emits an internal-error completion instead of leaving
//! the front-end waiting.

use tokio::sync::oneshot;
use tracing::warn;

use crate::request::{PamResponse, PamStatus};
use crate::status::ReqStatus;

/// A fired completion: status code plus a short human-readable message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    /// The errno-style status.
    pub status: ReqStatus,
    /// A short diagnostic for logs and error reporting.
    pub message: String,
}

/// Completion handle for account and online-check requests.
#[derive(Debug)]
pub struct AccountReplyHandle {
    tx: Option<oneshot::Sender<Completion>>,
}

impl AccountReplyHandle {
    /// Create a handle and the receiver the front-end waits on.
    #[must_use]
    pub fn pair() -> (Self, oneshot::Receiver<Completion>) {
        let (tx, rx) = oneshot::channel();
        (Self { tx: Some(tx) }, rx)
    }

    /// Fire the completion. Consumes the handle.
    pub fn complete(mut self, status: ReqStatus, message: impl Into<String>) {
        if let Some(tx) = self.tx.take() {
            // The front-end may have stopped waiting; that is its business.
            let _ = tx.send(Completion {
                status,
                message: message.into(),
            });
        }
    }
}

impl Drop for AccountReplyHandle {
    fn drop(&mut self) {
        if let Some(tx) = self.tx.take() {
            warn!("account request dropped before completion");
            let _ = tx.send(Completion {
                status: ReqStatus::Internal,
                message: "request dropped before completion".to_owned(),
            });
        }
    }
}

/// Completion handle for PAM requests.
#[derive(Debug)]
pub struct PamReplyHandle {
    tx: Option<oneshot::Sender<PamResponse>>,
}

impl PamReplyHandle {
    /// Create a handle and the receiver the front-end waits on.
    #[must_use]
    pub fn pair() -> (Self, oneshot::Receiver<PamResponse>) {
        let (tx, rx) = oneshot::channel();
        (Self { tx: Some(tx) }, rx)
    }

    /// Fire the completion. Consumes the handle.
    pub fn complete(mut self, response: PamResponse) {
        if let Some(tx) = self.tx.take() {
            let _ = tx.send(response);
        }
    }
}

impl Drop for PamReplyHandle {
    fn drop(&mut self) {
        if let Some(tx) = self.tx.take() {
            warn!("PAM request dropped before completion");
            let _ = tx.send(PamResponse::status_only(PamStatus::SystemError));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_complete_fires_once() {
        let (handle, rx) = AccountReplyHandle::pair();
        handle.complete(ReqStatus::Ok, "Success");
        let completion = rx.await.unwrap();
        assert_eq!(completion.status, ReqStatus::Ok);
        assert_eq!(completion.message, "Success");
    }

    #[tokio::test]
    async fn test_drop_fires_internal_error() {
        let (handle, rx) = AccountReplyHandle::pair();
        drop(handle);
        let completion = rx.await.unwrap();
        assert_eq!(completion.status, ReqStatus::Internal);
    }

    #[tokio::test]
    async fn test_pam_drop_fires_system_error() {
        let (handle, rx) = PamReplyHandle::pair();
        drop(handle);
        let response = rx.await.unwrap();
        assert_eq!(response.status, PamStatus::SystemError);
        assert!(response.items.is_empty());
    }
}
