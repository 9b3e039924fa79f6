//! In-memory store implementation.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::RngCore;
use subtle::ConstantTimeEq;
use tokio::sync::RwLock;
use tracing::debug;

use warden_core::{GroupEntry, SecretBytes, UserEntry};

use crate::error::{StoreError, StoreResult};
use crate::store::{ATTR_UPN, AttrRow, LocalStore};

/// A cached offline credential: salted hash, never the password itself.
#[derive(Debug, Clone)]
struct CachedCredential {
    salt: [u8; 16],
    hash: [u8; 32],
    cached_at: DateTime<Utc>,
}

/// An in-process [`LocalStore`].
///
/// Backs the daemon when no persistent cache is configured and serves as
/// the store double throughout the workspace tests. Password writes can
/// be made to fail on demand so callers' non-fatal error paths can be
/// exercised.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<String, UserEntry>>,
    groups: RwLock<HashMap<String, GroupEntry>>,
    memberships: RwLock<HashMap<String, Vec<String>>>,
    credentials: RwLock<HashMap<String, CachedCredential>>,
    fail_password_writes: AtomicBool,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `cache_password` call fail.
    pub fn set_fail_password_writes(&self, fail: bool) {
        self.fail_password_writes.store(fail, Ordering::SeqCst);
    }

    /// Fetch a user record by name.
    pub async fn user(&self, name: &str) -> Option<UserEntry> {
        self.users.read().await.get(name).cloned()
    }

    /// Fetch a group record by name.
    pub async fn group(&self, name: &str) -> Option<GroupEntry> {
        self.groups.read().await.get(name).cloned()
    }

    /// The groups recorded for a user by the last initgroups persist.
    pub async fn member_of(&self, user: &str) -> Vec<String> {
        self.memberships
            .read()
            .await
            .get(user)
            .cloned()
            .unwrap_or_default()
    }

    /// Whether an offline credential is cached for `user`.
    pub async fn has_cached_password(&self, user: &str) -> bool {
        self.credentials.read().await.contains_key(user)
    }

    /// When the offline credential for `user` was written.
    pub async fn password_cached_at(&self, user: &str) -> Option<DateTime<Utc>> {
        self.credentials.read().await.get(user).map(|c| c.cached_at)
    }

    /// Check a password against the cached credential, in constant time.
    pub async fn verify_password(&self, user: &str, password: &SecretBytes) -> bool {
        let creds = self.credentials.read().await;
        let Some(cred) = creds.get(user) else {
            return false;
        };
        let hash = hash_password(&cred.salt, password);
        hash.ct_eq(&cred.hash).into()
    }
}

fn hash_password(salt: &[u8; 16], password: &SecretBytes) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    *hasher.finalize().as_bytes()
}

/// Map a canonical attribute name onto a user record field.
fn user_attr_values(entry: &UserEntry, attr: &str) -> Option<Vec<String>> {
    match attr {
        "name" => Some(vec![entry.name.clone()]),
        "uidNumber" => Some(vec![entry.uid.to_string()]),
        "gidNumber" => Some(vec![entry.gid.to_string()]),
        "gecos" => entry.gecos.clone().map(|v| vec![v]),
        "homeDirectory" => entry.home_dir.clone().map(|v| vec![v]),
        "loginShell" => entry.shell.clone().map(|v| vec![v]),
        ATTR_UPN => entry.upn.clone().map(|v| vec![v]),
        _ => None,
    }
}

#[async_trait]
impl LocalStore for MemoryStore {
    async fn get_user_attr(&self, name: &str, attrs: &[&str]) -> StoreResult<Vec<AttrRow>> {
        let users = self.users.read().await;
        let Some(entry) = users.get(name) else {
            return Ok(Vec::new());
        };
        let mut row = AttrRow::new();
        for attr in attrs {
            if let Some(values) = user_attr_values(entry, attr) {
                row.insert((*attr).to_owned(), values);
            }
        }
        Ok(vec![row])
    }

    async fn upsert_users(&self, entries: Vec<UserEntry>) -> StoreResult<()> {
        let mut users = self.users.write().await;
        for entry in entries {
            users.insert(entry.name.clone(), entry);
        }
        Ok(())
    }

    async fn upsert_groups(&self, entries: Vec<GroupEntry>) -> StoreResult<()> {
        let mut groups = self.groups.write().await;
        for entry in entries {
            groups.insert(entry.name.clone(), entry);
        }
        Ok(())
    }

    async fn upsert_initgroups(
        &self,
        user: Option<UserEntry>,
        groups: Vec<GroupEntry>,
    ) -> StoreResult<()> {
        let Some(user) = user else {
            return Ok(());
        };
        let names: Vec<String> = groups.iter().map(|g| g.name.clone()).collect();
        self.upsert_groups(groups).await?;
        let user_name = user.name.clone();
        self.upsert_users(vec![user]).await?;
        self.memberships.write().await.insert(user_name, names);
        Ok(())
    }

    async fn cache_password(&self, user: &str, password: &SecretBytes) -> StoreResult<()> {
        if self.fail_password_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Internal("credential write refused".to_owned()));
        }
        let mut salt = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut salt);
        let hash = hash_password(&salt, password);
        self.credentials.write().await.insert(
            user.to_owned(),
            CachedCredential {
                salt,
                hash,
                cached_at: Utc::now(),
            },
        );
        debug!(user = %user, "cached offline credential");
        Ok(())
    }
}
