//! Kerberos settings for the authentication provider.

use std::path::PathBuf;

use warden_config::KerberosSection;

/// Environment variable carrying the realm to the helper.
pub const ENV_REALM: &str = "SSSD_REALM";
/// Environment variable carrying the KDC address to the helper.
pub const ENV_KDC: &str = "SSSD_KDC";
/// Environment variable carrying the change-password principal.
pub const ENV_CHANGEPW_PRINCIPLE: &str = "SSSD_KRB5_CHANGEPW_PRINCIPLE";

/// Resolved Kerberos settings, read-only after init.
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// KDC address handed to the helper.
    pub kdc_ip: Option<String>,
    /// Kerberos realm.
    pub realm: Option<String>,
    /// Whether to synthesize `user@REALM` when the store has no principal.
    pub try_simple_upn: bool,
    /// Principal used for password changes, realm-qualified.
    pub changepw_principal: String,
    /// Path of the helper binary.
    pub helper_path: PathBuf,
}

impl AuthContext {
    /// Resolve the context from the Kerberos config section.
    ///
    /// A change-password principal that carries no realm of its own is
    /// suffixed with `@<REALM>` when a realm is configured.
    #[must_use]
    pub fn from_config(krb: &KerberosSection) -> Self {
        let changepw_principal = if krb.changepw_principal.contains('@') {
            krb.changepw_principal.clone()
        } else if let Some(realm) = &krb.realm {
            format!("{}@{realm}", krb.changepw_principal)
        } else {
            krb.changepw_principal.clone()
        };

        Self {
            kdc_ip: krb.kdc_ip.clone(),
            realm: krb.realm.clone(),
            try_simple_upn: krb.try_simple_upn,
            changepw_principal,
            helper_path: krb.helper_path.clone(),
        }
    }

    /// The environment the helper child inherits.
    ///
    /// The variable names are fixed by the helper's environment contract.
    #[must_use]
    pub fn child_env(&self) -> Vec<(String, String)> {
        let mut env = vec![(
            ENV_CHANGEPW_PRINCIPLE.to_owned(),
            self.changepw_principal.clone(),
        )];
        if let Some(realm) = &self.realm {
            env.push((ENV_REALM.to_owned(), realm.clone()));
        }
        if let Some(kdc) = &self.kdc_ip {
            env.push((ENV_KDC.to_owned(), kdc.clone()));
        }
        env
    }
}
