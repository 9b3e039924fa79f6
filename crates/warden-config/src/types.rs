//! Configuration types for the Warden backend.
//!
//! Every struct implements [`Default`] with production POSIX-style values
//! so that a bare `[section]` header in TOML produces a working
//! configuration. Directory-side key names mandated by the helper and
//! provisioning tooling (`krb5REALM`, `tls_reqcert`, …) are preserved
//! verbatim through serde renames.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Root configuration for one backend domain.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Domain identity and cache behaviour.
    pub domain: DomainSection,
    /// Directory server connection and attribute maps.
    pub directory: DirectorySection,
    /// Kerberos settings consumed by the authentication provider.
    pub krb5: KerberosSection,
}

/// Domain identity and cache behaviour.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DomainSection {
    /// Domain name this backend serves.
    pub name: String,
    /// Whether the enumeration scheduler runs for this domain.
    pub enumerate: bool,
    /// Whether successful online authentications cache a password hash
    /// for offline auth.
    pub cache_credentials: bool,
    /// Seconds the backend stays sticky-offline after a transport failure.
    pub offline_timeout: u64,
    /// Seconds between enumeration cycles, measured from cycle start.
    pub enum_refresh_timeout: u64,
}

impl Default for DomainSection {
    fn default() -> Self {
        Self {
            name: "localdomain".to_owned(),
            enumerate: false,
            cache_credentials: false,
            offline_timeout: 60,
            enum_refresh_timeout: 300,
        }
    }
}

impl DomainSection {
    /// The sticky-offline window as a [`Duration`].
    #[must_use]
    pub fn offline_timeout(&self) -> Duration {
        Duration::from_secs(self.offline_timeout)
    }

    /// The enumeration period as a [`Duration`].
    #[must_use]
    pub fn enum_refresh_timeout(&self) -> Duration {
        Duration::from_secs(self.enum_refresh_timeout)
    }
}

/// TLS certificate policy for the directory transport.
///
/// The five values map onto the transport's five certificate-checking
/// modes. Any other string fails deserialization, and with it module init.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TlsPolicy {
    /// Never request a certificate.
    Never,
    /// Request a certificate; proceed if none or a bad one is supplied.
    Allow,
    /// Request a certificate; proceed if none is supplied, fail on a bad one.
    Try,
    /// Require a valid certificate.
    Demand,
    /// Alias of `demand`.
    Hard,
}

impl std::fmt::Display for TlsPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Never => "never",
            Self::Allow => "allow",
            Self::Try => "try",
            Self::Demand => "demand",
            Self::Hard => "hard",
        };
        write!(f, "{name}")
    }
}

/// Directory server connection settings and attribute maps.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct DirectorySection {
    /// URI of the directory server.
    pub directory_uri: String,
    /// TLS certificate policy.
    pub tls_reqcert: TlsPolicy,
    /// Identity used for the directory bind; anonymous when unset.
    pub default_bind_dn: Option<String>,
    /// Kind of bind token; only `"password"` is understood.
    pub default_authtok_type: Option<String>,
    /// The bind token itself. Never logged.
    pub default_authtok: Option<String>,
    /// Attribute map for user entries.
    pub user_map: UserAttrMap,
    /// Attribute map for group entries.
    pub group_map: GroupAttrMap,
}

impl Default for DirectorySection {
    fn default() -> Self {
        Self {
            directory_uri: "ldap://localhost".to_owned(),
            tls_reqcert: TlsPolicy::Hard,
            default_bind_dn: None,
            default_authtok_type: None,
            default_authtok: None,
            user_map: UserAttrMap::default(),
            group_map: GroupAttrMap::default(),
        }
    }
}

impl std::fmt::Debug for DirectorySection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectorySection")
            .field("directory_uri", &self.directory_uri)
            .field("tls_reqcert", &self.tls_reqcert)
            .field("default_bind_dn", &self.default_bind_dn)
            .field("default_authtok_type", &self.default_authtok_type)
            .field("has_default_authtok", &self.default_authtok.is_some())
            .field("user_map", &self.user_map)
            .field("group_map", &self.group_map)
            .finish()
    }
}

/// Server-side attribute names for user entries.
///
/// Optional slots left unmapped are skipped when building the requested
/// attribute list and never persisted.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAttrMap {
    /// Object class naming user entries.
    pub object_class: String,
    /// Login name attribute.
    pub name: String,
    /// Numeric uid attribute.
    pub uid_number: String,
    /// Primary gid attribute.
    pub gid_number: String,
    /// GECOS attribute.
    pub gecos: Option<String>,
    /// Home directory attribute.
    pub home_directory: Option<String>,
    /// Login shell attribute.
    pub shell: Option<String>,
    /// User principal name attribute.
    pub upn: Option<String>,
    /// Last-modified timestamp attribute.
    pub modstamp: String,
}

impl Default for UserAttrMap {
    fn default() -> Self {
        Self {
            object_class: "posixAccount".to_owned(),
            name: "uid".to_owned(),
            uid_number: "uidNumber".to_owned(),
            gid_number: "gidNumber".to_owned(),
            gecos: Some("gecos".to_owned()),
            home_directory: Some("homeDirectory".to_owned()),
            shell: Some("loginShell".to_owned()),
            upn: None,
            modstamp: "modifyTimestamp".to_owned(),
        }
    }
}

impl UserAttrMap {
    /// The attribute list to request from the server.
    ///
    /// Always begins with the object-class attribute; unmapped slots are
    /// skipped.
    #[must_use]
    pub fn requested_attrs(&self) -> Vec<String> {
        let mut attrs = vec![
            "objectClass".to_owned(),
            self.name.clone(),
            self.uid_number.clone(),
            self.gid_number.clone(),
        ];
        for slot in [&self.gecos, &self.home_directory, &self.shell, &self.upn] {
            if let Some(attr) = slot {
                attrs.push(attr.clone());
            }
        }
        attrs.push(self.modstamp.clone());
        attrs
    }
}

/// Server-side attribute names for group entries.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GroupAttrMap {
    /// Object class naming group entries.
    pub object_class: String,
    /// Group name attribute.
    pub name: String,
    /// Numeric gid attribute.
    pub gid_number: String,
    /// Membership attribute.
    pub member: Option<String>,
    /// Last-modified timestamp attribute.
    pub modstamp: String,
}

impl Default for GroupAttrMap {
    fn default() -> Self {
        Self {
            object_class: "posixGroup".to_owned(),
            name: "cn".to_owned(),
            gid_number: "gidNumber".to_owned(),
            member: Some("memberUid".to_owned()),
            modstamp: "modifyTimestamp".to_owned(),
        }
    }
}

impl GroupAttrMap {
    /// The attribute list to request from the server.
    #[must_use]
    pub fn requested_attrs(&self) -> Vec<String> {
        let mut attrs = vec![
            "objectClass".to_owned(),
            self.name.clone(),
            self.gid_number.clone(),
        ];
        if let Some(member) = &self.member {
            attrs.push(member.clone());
        }
        attrs.push(self.modstamp.clone());
        attrs
    }
}

/// Kerberos settings consumed by the authentication provider.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KerberosSection {
    /// Address of the KDC, exported to the helper child.
    #[serde(rename = "krb5KDCIP")]
    pub kdc_ip: Option<String>,
    /// Kerberos realm.
    #[serde(rename = "krb5REALM")]
    pub realm: Option<String>,
    /// Whether to synthesize `user@REALM` when the store has no principal.
    #[serde(rename = "krb5try_simple_upn")]
    pub try_simple_upn: bool,
    /// Principal used for password changes. Suffixed with `@<REALM>` at
    /// init when it carries no realm of its own.
    #[serde(rename = "krb5changepw_principle")]
    pub changepw_principal: String,
    /// Path of the privilege-separated helper binary.
    #[serde(rename = "krb5_helper")]
    pub helper_path: PathBuf,
}

impl Default for KerberosSection {
    fn default() -> Self {
        Self {
            kdc_ip: None,
            realm: None,
            try_simple_upn: false,
            changepw_principal: "kadmin/changepw".to_owned(),
            helper_path: PathBuf::from("/usr/libexec/warden/krb5_child"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_form_posix_maps() {
        let config = BackendConfig::default();
        assert_eq!(config.directory.user_map.object_class, "posixAccount");
        assert_eq!(config.directory.user_map.name, "uid");
        assert_eq!(config.directory.group_map.object_class, "posixGroup");
        assert_eq!(config.domain.offline_timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_user_attrs_start_with_object_class() {
        let map = UserAttrMap::default();
        let attrs = map.requested_attrs();
        assert_eq!(attrs[0], "objectClass");
        assert_eq!(attrs[1], "uid");
        assert_eq!(attrs.last().unwrap(), "modifyTimestamp");
    }

    #[test]
    fn test_unmapped_slots_are_skipped() {
        let map = UserAttrMap {
            gecos: None,
            home_directory: None,
            shell: None,
            upn: None,
            ..UserAttrMap::default()
        };
        let attrs = map.requested_attrs();
        assert_eq!(
            attrs,
            vec!["objectClass", "uid", "uidNumber", "gidNumber", "modifyTimestamp"]
        );
    }

    #[test]
    fn test_upn_slot_is_requested_when_mapped() {
        let map = UserAttrMap {
            upn: Some("userPrincipalName".to_owned()),
            ..UserAttrMap::default()
        };
        assert!(map.requested_attrs().contains(&"userPrincipalName".to_owned()));
    }

    #[test]
    fn test_debug_redacts_authtok() {
        let section = DirectorySection {
            default_authtok: Some("s3cret".to_owned()),
            ..DirectorySection::default()
        };
        let debug = format!("{section:?}");
        assert!(!debug.contains("s3cret"));
        assert!(debug.contains("has_default_authtok: true"));
    }

    #[test]
    fn test_tls_policy_display() {
        assert_eq!(TlsPolicy::Demand.to_string(), "demand");
    }
}
