//! The local store contract.

use std::collections::HashMap;

use async_trait::async_trait;

use warden_core::{GroupEntry, SecretBytes, UserEntry};

use crate::error::StoreResult;

/// Canonical attribute name of the Kerberos user principal.
pub const ATTR_UPN: &str = "userPrincipalName";

/// One matched record, as a map from canonical attribute name to values.
pub type AttrRow = HashMap<String, Vec<String>>;

/// The slice of the daemon's cache interface the backend consumes.
///
/// Implementations are free to back this with whatever schema they like;
/// the backend treats the write path as opaque.
#[async_trait]
pub trait LocalStore: Send + Sync {
    /// Read selected attributes of the user records matching `name`.
    ///
    /// Returns one [`AttrRow`] per matched record; attributes the record
    /// does not carry are simply absent from the row.
    async fn get_user_attr(&self, name: &str, attrs: &[&str]) -> StoreResult<Vec<AttrRow>>;

    /// Persist user entries returned by a directory search.
    async fn upsert_users(&self, entries: Vec<UserEntry>) -> StoreResult<()>;

    /// Persist group entries returned by a directory search.
    async fn upsert_groups(&self, entries: Vec<GroupEntry>) -> StoreResult<()>;

    /// Persist the outcome of an initgroups resolution: the user record
    /// (when the directory still knows the user) and every group the user
    /// is a member of.
    async fn upsert_initgroups(
        &self,
        user: Option<UserEntry>,
        groups: Vec<GroupEntry>,
    ) -> StoreResult<()>;

    /// Record a salted hash of `password` for offline authentication.
    async fn cache_password(&self, user: &str, password: &SecretBytes) -> StoreResult<()>;
}
