//! The offline-password cache hook.

use tracing::{debug, warn};

use warden_core::SecretBytes;
use warden_store::LocalStore;

/// Submit a credential for offline caching after a successful online
/// authentication.
///
/// Completion is non-fatal: a failed write is logged and the caller's
/// auth result stands.
pub async fn cache_password(store: &dyn LocalStore, user: &str, password: &SecretBytes) {
    match store.cache_password(user, password).await {
        Ok(()) => debug!(user = %user, "offline credential cached"),
        Err(err) => warn!(user = %user, error = %err, "offline credential write failed"),
    }
}
