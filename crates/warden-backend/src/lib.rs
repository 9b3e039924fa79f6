//! Warden Backend - the front-end contract and module init.
//!
//! Wires the identity and authentication providers over one shared
//! online tracker, exposes the three handler targets the front-end
//! router knows (`check_online`, account info, PAM), and owns init and
//! shutdown: configuration load, enumeration scheduling, session
//! teardown.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use warden_auth::AuthProvider;
use warden_config::{BackendConfig, ConfigResult};
use warden_core::{
    AccountReplyHandle, AccountRequest, OnlineState, PamReplyHandle, PamRequest, PamResponse,
    ReqStatus,
};
use warden_directory::DirectoryConnector;
use warden_id::{EnumerationScheduler, ProviderContext, dispatch};
use warden_store::LocalStore;

/// A request as delivered by the front-end router, paired with its
/// completion handle.
#[derive(Debug)]
pub enum BackendRequest {
    /// Report the current online/offline state.
    CheckOnline {
        /// Fired with `Ok` and `"Online"` or `"Offline"`.
        reply: AccountReplyHandle,
    },
    /// Resolve an account lookup.
    AccountInfo {
        /// The lookup payload.
        payload: AccountRequest,
        /// Fired exactly once with the completion status.
        reply: AccountReplyHandle,
    },
    /// Authenticate or change a password.
    Pam {
        /// The PAM payload.
        payload: PamRequest,
        /// Fired exactly once with the PAM response.
        reply: PamReplyHandle,
    },
}

/// One configured backend domain: both providers over a shared online
/// tracker, plus the enumeration scheduler when the domain enables it.
pub struct Backend {
    ctx: Arc<ProviderContext>,
    auth: AuthProvider,
    online: Arc<OnlineState>,
    scheduler: Option<EnumerationScheduler>,
}

impl Backend {
    /// Assemble a backend without starting background work.
    #[must_use]
    pub fn new(
        config: Arc<BackendConfig>,
        store: Arc<dyn LocalStore>,
        connector: Arc<dyn DirectoryConnector>,
    ) -> Self {
        let online = Arc::new(OnlineState::new(config.domain.offline_timeout()));
        let ctx = Arc::new(ProviderContext::new(
            Arc::clone(&config),
            Arc::clone(&store),
            connector,
            Arc::clone(&online),
        ));
        let auth = AuthProvider::new(config, store, Arc::clone(&online));
        Self {
            ctx,
            auth,
            online,
            scheduler: None,
        }
    }

    /// Load the domain configuration and return a started backend.
    ///
    /// # Errors
    ///
    /// Fails when the configuration cannot be loaded or validated (an
    /// unknown TLS policy, among other things).
    pub fn init(
        config_path: &Path,
        store: Arc<dyn LocalStore>,
        connector: Arc<dyn DirectoryConnector>,
    ) -> ConfigResult<Self> {
        let config = Arc::new(warden_config::load_file(config_path)?);
        let mut backend = Self::new(config, store, connector);
        backend.start();
        Ok(backend)
    }

    /// Start background work: the first enumeration fires immediately
    /// when the domain enables enumeration.
    pub fn start(&mut self) {
        if self.ctx.config().domain.enumerate && self.scheduler.is_none() {
            self.scheduler = Some(EnumerationScheduler::spawn(Arc::clone(&self.ctx)));
        }
        info!(
            domain = %self.ctx.config().domain.name,
            enumerate = self.ctx.config().domain.enumerate,
            "backend initialized"
        );
    }

    /// The current online/offline state.
    #[must_use]
    pub fn is_online(&self) -> bool {
        !self.online.is_offline()
    }

    /// Serve an account lookup to completion.
    pub async fn handle_account(&self, req: &AccountRequest) -> (ReqStatus, String) {
        dispatch::handle_account_info(&self.ctx, req).await
    }

    /// Serve a PAM request to completion.
    pub async fn handle_pam(&self, req: PamRequest) -> PamResponse {
        self.auth.handle_pam(req).await
    }

    /// Route a front-end request to its handler on a fresh task.
    ///
    /// The completion handle fires exactly once even if the task is
    /// cancelled mid-flight.
    pub fn dispatch(self: &Arc<Self>, request: BackendRequest) {
        let backend = Arc::clone(self);
        tokio::spawn(async move {
            match request {
                BackendRequest::CheckOnline { reply } => {
                    let message = if backend.is_online() { "Online" } else { "Offline" };
                    reply.complete(ReqStatus::Ok, message);
                },
                BackendRequest::AccountInfo { payload, reply } => {
                    let (status, message) = backend.handle_account(&payload).await;
                    reply.complete(status, message);
                },
                BackendRequest::Pam { payload, reply } => {
                    let response = backend.handle_pam(payload).await;
                    reply.complete(response);
                },
            }
        });
    }

    /// Stop background work and drop the directory session.
    pub async fn shutdown(mut self) {
        if let Some(scheduler) = self.scheduler.take() {
            scheduler.shutdown();
        }
        self.ctx.close_session().await;
        info!(domain = %self.ctx.config().domain.name, "backend shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use warden_core::{AttrScope, EntryType, FilterType};
    use warden_directory::mock::MockDirectory;
    use warden_store::MemoryStore;

    fn backend_with(config: BackendConfig, mock: &MockDirectory) -> Backend {
        Backend::new(
            Arc::new(config),
            Arc::new(MemoryStore::new()),
            Arc::new(mock.clone()),
        )
    }

    fn lookup(value: &str) -> AccountRequest {
        AccountRequest {
            entry_type: EntryType::User,
            filter_type: FilterType::Name,
            attr_scope: AttrScope::Core,
            filter_value: value.to_owned(),
        }
    }

    #[tokio::test]
    async fn test_check_online_dispatch() {
        let mock = MockDirectory::new();
        let backend = Arc::new(backend_with(BackendConfig::default(), &mock));

        let (reply, rx) = AccountReplyHandle::pair();
        backend.dispatch(BackendRequest::CheckOnline { reply });
        let completion = rx.await.unwrap();
        assert_eq!(completion.status, ReqStatus::Ok);
        assert_eq!(completion.message, "Online");
    }

    #[tokio::test]
    async fn test_account_dispatch_completes_exactly_once() {
        let mock = MockDirectory::new();
        let backend = Arc::new(backend_with(BackendConfig::default(), &mock));

        let (reply, rx) = AccountReplyHandle::pair();
        backend.dispatch(BackendRequest::AccountInfo {
            payload: lookup("alice"),
            reply,
        });
        let completion = rx.await.unwrap();
        assert_eq!(completion.status, ReqStatus::Ok);
        assert_eq!(completion.message, "Success");
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_schedules_enumeration() {
        let mock = MockDirectory::new();
        let mut config = BackendConfig::default();
        config.domain.enumerate = true;
        let mut backend = backend_with(config, &mock);
        backend.start();

        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        assert_eq!(mock.user_filters().len(), 1);

        backend.shutdown().await;
    }

    #[tokio::test]
    async fn test_start_without_enumeration_stays_idle() {
        let mock = MockDirectory::new();
        let mut backend = backend_with(BackendConfig::default(), &mock);
        backend.start();

        tokio::task::yield_now().await;
        assert!(mock.user_filters().is_empty());
    }

    #[tokio::test]
    async fn test_init_rejects_bad_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("warden.toml");
        std::fs::write(&path, "[directory]\ntls_reqcert = \"maybe\"\n").unwrap();

        let result = Backend::init(
            &path,
            Arc::new(MemoryStore::new()),
            Arc::new(MockDirectory::new()),
        );
        assert!(result.is_err());
    }
}
