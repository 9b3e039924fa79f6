//! The connection manager.

use std::sync::Arc;

use tracing::{debug, info};

use warden_core::SecretBytes;
use warden_directory::{ConnectOptions, DirectorySession};

use crate::context::ProviderContext;
use crate::error::IdResult;

/// Return the shared session, establishing it if necessary.
///
/// The session slot's mutex is held across the whole connect+bind, which
/// is what guarantees at most one concurrent attempt per context: a
/// second caller arriving mid-connect queues on the lock and then
/// observes the freshly installed session. Callers are expected to mark
/// the backend offline when this fails.
///
/// # Errors
///
/// Returns `ConnectFailed` when the transport cannot be established and
/// `BindFailed` when the server rejects the configured credentials.
pub async fn ensure_connected(ctx: &ProviderContext) -> IdResult<Arc<DirectorySession>> {
    let mut slot = ctx.session.lock().await;

    if let Some(session) = slot.as_ref() {
        if session.is_connected() {
            return Ok(Arc::clone(session));
        }
        // Stale session object: release it before reconnecting.
        debug!("dropping stale directory session");
        *slot = None;
    }

    let dir = &ctx.config().directory;
    let opts = ConnectOptions {
        uri: dir.directory_uri.clone(),
        tls: dir.tls_reqcert,
    };

    let link = ctx.connector().connect(&opts).await?;
    let authtok = dir
        .default_authtok
        .as_deref()
        .map(SecretBytes::from);
    link.simple_bind(dir.default_bind_dn.as_deref(), authtok.as_ref())
        .await?;

    let session = Arc::new(DirectorySession::new(
        link,
        dir.default_bind_dn.clone(),
        dir.tls_reqcert,
    ));
    info!(uri = %dir.directory_uri, bound_as = ?dir.default_bind_dn, "directory session established");
    *slot = Some(Arc::clone(&session));
    Ok(session)
}
