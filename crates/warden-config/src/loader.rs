//! Config file loading and validation.

use std::path::Path;

use tracing::info;

use crate::error::{ConfigError, ConfigResult};
use crate::types::BackendConfig;

/// Load a backend configuration from a TOML file.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file cannot be read, is not valid
/// TOML, names an unknown TLS policy, or fails semantic validation.
pub fn load_file(path: &Path) -> ConfigResult<BackendConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    let config = parse(&content, &path.display().to_string())?;
    info!(path = %path.display(), domain = %config.domain.name, "loaded backend config");
    Ok(config)
}

/// Load a backend configuration from an in-memory TOML string.
///
/// # Errors
///
/// Returns a [`ConfigError`] on parse or validation failure.
pub fn load_str(content: &str) -> ConfigResult<BackendConfig> {
    parse(content, "<inline>")
}

fn parse(content: &str, origin: &str) -> ConfigResult<BackendConfig> {
    let config: BackendConfig = toml::from_str(content).map_err(|e| ConfigError::ParseError {
        path: origin.to_owned(),
        source: e,
    })?;
    validate(&config)?;
    Ok(config)
}

/// Semantic checks serde cannot express.
fn validate(config: &BackendConfig) -> ConfigResult<()> {
    if let Some(kind) = &config.directory.default_authtok_type {
        if kind != "password" {
            return Err(ConfigError::ValidationError {
                field: "directory.default_authtok_type".to_owned(),
                message: format!("unsupported authtok type {kind:?}"),
            });
        }
    }
    if config.domain.enum_refresh_timeout == 0 {
        return Err(ConfigError::ValidationError {
            field: "domain.enum_refresh_timeout".to_owned(),
            message: "must be non-zero".to_owned(),
        });
    }
    if config.domain.offline_timeout == 0 {
        return Err(ConfigError::ValidationError {
            field: "domain.offline_timeout".to_owned(),
            message: "must be non-zero".to_owned(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TlsPolicy;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = load_str("").unwrap();
        assert_eq!(config.directory.tls_reqcert, TlsPolicy::Hard);
        assert!(!config.domain.enumerate);
    }

    #[test]
    fn test_kerberos_key_names_roundtrip() {
        let config = load_str(
            r#"
            [domain]
            enumerate = true
            cache_credentials = true

            [krb5]
            krb5KDCIP = "10.0.0.5"
            krb5REALM = "EXAMPLE.COM"
            krb5try_simple_upn = true
            krb5changepw_principle = "kadmin/changepw"
        "#,
        )
        .unwrap();
        assert_eq!(config.krb5.kdc_ip.as_deref(), Some("10.0.0.5"));
        assert_eq!(config.krb5.realm.as_deref(), Some("EXAMPLE.COM"));
        assert!(config.krb5.try_simple_upn);
        assert!(config.domain.enumerate);
    }

    #[test]
    fn test_unknown_tls_policy_fails_load() {
        let result = load_str(
            r#"
            [directory]
            tls_reqcert = "maybe"
        "#,
        );
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn test_unsupported_authtok_type_fails_load() {
        let result = load_str(
            r#"
            [directory]
            default_authtok_type = "obfuscated_password"
        "#,
        );
        assert!(matches!(result, Err(ConfigError::ValidationError { .. })));
    }

    #[test]
    fn test_zero_refresh_timeout_rejected() {
        let result = load_str(
            r#"
            [domain]
            enum_refresh_timeout = 0
        "#,
        );
        assert!(matches!(result, Err(ConfigError::ValidationError { .. })));
    }

    #[test]
    fn test_load_file_missing() {
        let result = load_file(Path::new("/nonexistent/warden.toml"));
        assert!(matches!(result, Err(ConfigError::ReadError { .. })));
    }

    #[test]
    fn test_load_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("warden.toml");
        std::fs::write(
            &path,
            r#"
            [directory]
            directory_uri = "ldap://dc1.example.com"
            tls_reqcert = "try"
        "#,
        )
        .unwrap();

        let config = load_file(&path).unwrap();
        assert_eq!(config.directory.directory_uri, "ldap://dc1.example.com");
        assert_eq!(config.directory.tls_reqcert, TlsPolicy::Try);
    }
}
