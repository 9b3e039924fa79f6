//! The boundary to the directory wire codec.

use async_trait::async_trait;

use warden_config::TlsPolicy;
use warden_core::{GroupEntry, SecretBytes, UserEntry};

use crate::error::DirectoryResult;

/// Transport parameters for establishing a directory connection.
#[derive(Debug, Clone)]
pub struct ConnectOptions {
    /// Server URI.
    pub uri: String,
    /// TLS certificate policy applied during transport setup.
    pub tls: TlsPolicy,
}

/// The parsed outcome of one search.
#[derive(Debug, Clone)]
pub struct SearchOutcome<T> {
    /// Entries the server returned, already mapped to canonical fields.
    pub entries: Vec<T>,
    /// The largest modification timestamp seen across the entries.
    pub max_modstamp: Option<String>,
}

impl<T> Default for SearchOutcome<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            max_modstamp: None,
        }
    }
}

/// The parsed outcome of an initgroups resolution.
#[derive(Debug, Clone, Default)]
pub struct InitgroupsResult {
    /// The user record, when the directory still knows the user.
    pub user: Option<UserEntry>,
    /// Every group the user is a member of.
    pub groups: Vec<GroupEntry>,
}

/// Establishes directory transports.
///
/// TLS negotiation per [`ConnectOptions::tls`] is the connector's
/// concern; a link handed back is connected but not yet bound.
#[async_trait]
pub trait DirectoryConnector: Send + Sync {
    /// Open a transport to the server.
    async fn connect(&self, opts: &ConnectOptions) -> DirectoryResult<Box<dyn DirectoryLink>>;
}

/// One established directory connection.
///
/// Concurrent operations on a link are permitted; request serialization
/// on the wire is the codec's problem, not the caller's.
#[async_trait]
pub trait DirectoryLink: Send + Sync {
    /// Authenticate the connection with a simple bind.
    async fn simple_bind(
        &self,
        bind_dn: Option<&str>,
        authtok: Option<&SecretBytes>,
    ) -> DirectoryResult<()>;

    /// Search user entries and parse them through the attribute map.
    async fn search_users(
        &self,
        filter: &str,
        attrs: &[String],
    ) -> DirectoryResult<SearchOutcome<UserEntry>>;

    /// Search group entries and parse them through the attribute map.
    async fn search_groups(
        &self,
        filter: &str,
        attrs: &[String],
    ) -> DirectoryResult<SearchOutcome<GroupEntry>>;

    /// Resolve the full group membership of one user via the
    /// directory-side membership primitive.
    async fn init_groups(
        &self,
        name: &str,
        user_attrs: &[String],
        group_attrs: &[String],
    ) -> DirectoryResult<InitgroupsResult>;
}
