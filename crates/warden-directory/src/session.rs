//! The shared directory session.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

use warden_config::TlsPolicy;
use warden_core::{GroupEntry, UserEntry};

use crate::client::{DirectoryLink, InitgroupsResult, SearchOutcome};
#[cfg(test)]
use crate::error::DirectoryError;
use crate::error::DirectoryResult;

/// One established, bound directory session.
///
/// At most one exists per backend; it is shared by all concurrent ID
/// operations and replaced only by the connection manager. A session is
/// always bound before it is exposed; the constructor takes a link that
/// already passed its bind.
pub struct DirectorySession {
    link: Box<dyn DirectoryLink>,
    connected: AtomicBool,
    bound_as: Option<String>,
    tls: TlsPolicy,
}

impl std::fmt::Debug for DirectorySession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectorySession")
            .field("connected", &self.is_connected())
            .field("bound_as", &self.bound_as)
            .field("tls", &self.tls)
            .finish_non_exhaustive()
    }
}

impl DirectorySession {
    /// Wrap a connected, bound link.
    #[must_use]
    pub fn new(link: Box<dyn DirectoryLink>, bound_as: Option<String>, tls: TlsPolicy) -> Self {
        Self {
            link,
            connected: AtomicBool::new(true),
            bound_as,
            tls,
        }
    }

    /// Whether the session is still usable.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Mark the session unusable; the next request will reconnect.
    pub fn invalidate(&self) {
        if self.connected.swap(false, Ordering::SeqCst) {
            debug!(bound_as = ?self.bound_as, "directory session invalidated");
        }
    }

    /// The identity the session was bound with.
    #[must_use]
    pub fn bound_as(&self) -> Option<&str> {
        self.bound_as.as_deref()
    }

    /// The TLS policy the session was established under.
    #[must_use]
    pub fn tls(&self) -> TlsPolicy {
        self.tls
    }

    /// Search user entries, invalidating the session on transport failure.
    pub async fn search_users(
        &self,
        filter: &str,
        attrs: &[String],
    ) -> DirectoryResult<SearchOutcome<UserEntry>> {
        self.guard(self.link.search_users(filter, attrs).await)
    }

    /// Search group entries, invalidating the session on transport failure.
    pub async fn search_groups(
        &self,
        filter: &str,
        attrs: &[String],
    ) -> DirectoryResult<SearchOutcome<GroupEntry>> {
        self.guard(self.link.search_groups(filter, attrs).await)
    }

    /// Resolve a user's full group membership, invalidating the session
    /// on transport failure.
    pub async fn init_groups(
        &self,
        name: &str,
        user_attrs: &[String],
        group_attrs: &[String],
    ) -> DirectoryResult<InitgroupsResult> {
        self.guard(self.link.init_groups(name, user_attrs, group_attrs).await)
    }

    fn guard<T>(&self, result: DirectoryResult<T>) -> DirectoryResult<T> {
        if let Err(err) = &result {
            if err.is_transport() {
                self.invalidate();
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockDirectory;

    fn session_from(mock: &MockDirectory) -> DirectorySession {
        let link = mock.make_link();
        DirectorySession::new(link, Some("cn=admin".to_owned()), TlsPolicy::Never)
    }

    #[tokio::test]
    async fn test_new_session_is_connected_and_bound() {
        let mock = MockDirectory::new();
        let session = session_from(&mock);
        assert!(session.is_connected());
        assert_eq!(session.bound_as(), Some("cn=admin"));
    }

    #[tokio::test]
    async fn test_transport_error_invalidates() {
        let mock = MockDirectory::new();
        mock.queue_user_search(Err(DirectoryError::Io("broken pipe".to_owned())));
        let session = session_from(&mock);

        let result = session.search_users("(uid=alice)", &[]).await;
        assert!(result.is_err());
        assert!(!session.is_connected());
    }

    #[tokio::test]
    async fn test_search_error_keeps_session() {
        let mock = MockDirectory::new();
        mock.queue_user_search(Err(DirectoryError::Search("size limit".to_owned())));
        let session = session_from(&mock);

        let result = session.search_users("(uid=*)", &[]).await;
        assert!(result.is_err());
        assert!(session.is_connected());
    }
}
