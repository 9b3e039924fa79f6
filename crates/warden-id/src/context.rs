//! Per-domain provider state.

use std::sync::{Arc, Mutex};

use tracing::debug;

use warden_config::BackendConfig;
use warden_core::OnlineState;
use warden_directory::{DirectoryConnector, DirectorySession};
use warden_store::LocalStore;

/// Delta-enumeration cursors, one per entry kind.
///
/// A cursor is replaced only after a successful enumeration phase whose
/// server-reported maximum modification timestamp is strictly newer.
#[derive(Debug, Default, Clone)]
pub struct Watermarks {
    /// Largest user modification timestamp applied so far.
    pub user: Option<String>,
    /// Largest group modification timestamp applied so far.
    pub group: Option<String>,
}

/// Process-wide state for one configured backend domain.
///
/// Owns the configuration snapshot, the shared session slot, the
/// online/offline tracker, and the enumeration watermarks. Created at
/// module init and shared by the dispatcher, the connection manager, and
/// the enumeration scheduler.
pub struct ProviderContext {
    config: Arc<BackendConfig>,
    store: Arc<dyn LocalStore>,
    connector: Arc<dyn DirectoryConnector>,
    online: Arc<OnlineState>,
    pub(crate) session: tokio::sync::Mutex<Option<Arc<DirectorySession>>>,
    watermarks: Mutex<Watermarks>,
}

impl ProviderContext {
    /// Assemble the context for one domain.
    #[must_use]
    pub fn new(
        config: Arc<BackendConfig>,
        store: Arc<dyn LocalStore>,
        connector: Arc<dyn DirectoryConnector>,
        online: Arc<OnlineState>,
    ) -> Self {
        Self {
            config,
            store,
            connector,
            online,
            session: tokio::sync::Mutex::new(None),
            watermarks: Mutex::new(Watermarks::default()),
        }
    }

    /// The configuration snapshot.
    #[must_use]
    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    /// The local store handle.
    #[must_use]
    pub fn store(&self) -> &dyn LocalStore {
        self.store.as_ref()
    }

    /// The directory connector.
    #[must_use]
    pub(crate) fn connector(&self) -> &dyn DirectoryConnector {
        self.connector.as_ref()
    }

    /// The shared online/offline tracker.
    #[must_use]
    pub fn online(&self) -> &OnlineState {
        &self.online
    }

    /// Snapshot of both watermark cursors.
    #[must_use]
    pub fn watermarks(&self) -> Watermarks {
        self.watermarks
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    /// Advance the user watermark, keeping it monotonic.
    pub fn advance_user_watermark(&self, modstamp: &str) {
        let mut guard = self
            .watermarks
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if guard.user.as_deref().is_none_or(|cur| modstamp > cur) {
            debug!(modstamp = %modstamp, "user watermark advanced");
            guard.user = Some(modstamp.to_owned());
        }
    }

    /// Advance the group watermark, keeping it monotonic.
    pub fn advance_group_watermark(&self, modstamp: &str) {
        let mut guard = self
            .watermarks
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if guard.group.as_deref().is_none_or(|cur| modstamp > cur) {
            debug!(modstamp = %modstamp, "group watermark advanced");
            guard.group = Some(modstamp.to_owned());
        }
    }

    /// Drop the session at shutdown.
    pub async fn close_session(&self) {
        let mut slot = self.session.lock().await;
        if let Some(session) = slot.take() {
            session.invalidate();
        }
    }
}

impl std::fmt::Debug for ProviderContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderContext")
            .field("domain", &self.config.domain.name)
            .field("watermarks", &self.watermarks())
            .finish_non_exhaustive()
    }
}
