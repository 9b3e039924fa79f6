//! The authentication pipeline.

use std::sync::Arc;

use tracing::{debug, warn};

use warden_config::BackendConfig;
use warden_core::{
    OnlineState, PamCmd, PamItem, PamItemKind, PamRequest, PamResponse, PamStatus, SecretBytes,
};
use warden_store::{ATTR_UPN, LocalStore, StoreResult};

use crate::cache;
use crate::child;
use crate::context::AuthContext;
use crate::wire;

/// The authentication provider for one backend domain.
///
/// Shares the online tracker with the identity provider: requests during
/// an offline window are answered without touching the helper, and a
/// helper that reports the KDC unreachable flips the tracker offline.
pub struct AuthProvider {
    config: Arc<BackendConfig>,
    store: Arc<dyn LocalStore>,
    online: Arc<OnlineState>,
    krb: AuthContext,
}

impl AuthProvider {
    /// Assemble the provider from the domain configuration.
    #[must_use]
    pub fn new(
        config: Arc<BackendConfig>,
        store: Arc<dyn LocalStore>,
        online: Arc<OnlineState>,
    ) -> Self {
        let krb = AuthContext::from_config(&config.krb5);
        Self {
            config,
            store,
            online,
            krb,
        }
    }

    /// The resolved Kerberos context.
    #[must_use]
    pub fn krb(&self) -> &AuthContext {
        &self.krb
    }

    /// Serve one PAM request.
    pub async fn handle_pam(&self, mut req: PamRequest) -> PamResponse {
        if self.online.is_offline() {
            debug!(user = %req.user, "authentication refused while offline");
            return PamResponse::status_only(PamStatus::AuthInfoUnavailable);
        }

        // Tasks other than authentication and password change are not
        // this backend's business; report success so the stack proceeds.
        if !matches!(req.cmd, PamCmd::Authenticate | PamCmd::ChangeAuthTok) {
            return PamResponse::status_only(PamStatus::Success);
        }

        let upn = match self.resolve_upn(&req.user).await {
            Ok(upn) => upn,
            Err(err) => {
                warn!(user = %req.user, error = %err, "principal lookup failed");
                return PamResponse::status_only(PamStatus::SystemError);
            },
        };
        let upn = upn.or_else(|| self.simple_upn(&req.user));
        let Some(upn) = upn else {
            warn!(user = %req.user, "no principal resolved and simple fallback unavailable");
            return PamResponse::status_only(PamStatus::SystemError);
        };
        debug!(user = %req.user, upn = %upn, "principal resolved");
        req.upn = Some(upn);

        let reply = match self.run_child(&req).await {
            Ok(reply) => reply,
            Err(err) => {
                warn!(user = %req.user, error = %err, "helper invocation failed");
                return PamResponse::status_only(PamStatus::SystemError);
            },
        };

        let status = PamStatus::from_wire(reply.pam_status);
        let mut response = PamResponse::status_only(status);
        if !reply.message.is_empty() {
            response.items.push(PamItem {
                kind: PamItemKind::from_wire(reply.msg_type),
                data: reply.message,
            });
        }

        if status == PamStatus::AuthInfoUnavailable {
            self.online.mark_offline();
        }

        if status == PamStatus::Success {
            if req.cmd == PamCmd::Authenticate {
                if let Some(realm) = &self.krb.realm {
                    response.items.push(PamItem::env("REALM", realm));
                }
                if let Some(kdc) = &self.krb.kdc_ip {
                    response.items.push(PamItem::env("KDC", kdc));
                }
            }
            if self.config.domain.cache_credentials {
                cache::cache_password(self.store.as_ref(), &req.user, cacheable_token(&req)).await;
            }
        }

        response
    }

    /// Look up the user principal in the local store.
    ///
    /// Ambiguous matches are treated as no match, so a synthesized
    /// principal can still be tried.
    async fn resolve_upn(&self, user: &str) -> StoreResult<Option<String>> {
        let rows = self.store.get_user_attr(user, &[ATTR_UPN]).await?;
        match rows.as_slice() {
            [] => Ok(None),
            [row] => Ok(row.get(ATTR_UPN).and_then(|values| values.first()).cloned()),
            _ => {
                warn!(user = %user, matches = rows.len(), "ambiguous principal lookup");
                Ok(None)
            },
        }
    }

    fn simple_upn(&self, user: &str) -> Option<String> {
        if !self.krb.try_simple_upn {
            return None;
        }
        let realm = self.krb.realm.as_ref()?;
        let upn = format!("{user}@{realm}");
        debug!(user = %user, upn = %upn, "synthesized simple principal");
        Some(upn)
    }

    async fn run_child(&self, req: &PamRequest) -> crate::error::AuthResult<wire::ChildReply> {
        let request = wire::encode_request(req)?;
        let raw = child::run_helper(
            &self.krb.helper_path,
            req.uid,
            req.gid,
            &self.krb.child_env(),
            &request,
        )
        .await?;
        wire::decode_reply(&raw)
    }
}

/// The token worth caching: the new one for a password change, the one
/// that just authenticated otherwise.
fn cacheable_token(req: &PamRequest) -> &SecretBytes {
    match req.cmd {
        PamCmd::ChangeAuthTok => req.newauthtok.as_ref().unwrap_or(&req.authtok),
        _ => &req.authtok,
    }
}
