//! Scripted in-process directory for tests.
//!
//! Responses are queued per operation; an empty queue means success with
//! no entries, so most tests only script the interesting calls. Filters,
//! attribute lists, and bind identities are recorded for assertion.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use warden_core::{GroupEntry, SecretBytes, UserEntry};

use crate::client::{
    ConnectOptions, DirectoryConnector, DirectoryLink, InitgroupsResult, SearchOutcome,
};
use crate::error::DirectoryResult;

#[derive(Default)]
struct Script {
    connect_delay: Mutex<Option<std::time::Duration>>,
    connect_results: Mutex<VecDeque<DirectoryResult<()>>>,
    bind_results: Mutex<VecDeque<DirectoryResult<()>>>,
    user_searches: Mutex<VecDeque<DirectoryResult<SearchOutcome<UserEntry>>>>,
    group_searches: Mutex<VecDeque<DirectoryResult<SearchOutcome<GroupEntry>>>>,
    initgroups_results: Mutex<VecDeque<DirectoryResult<InitgroupsResult>>>,
    connects: AtomicUsize,
    binds: AtomicUsize,
    user_filters: Mutex<Vec<String>>,
    user_attr_lists: Mutex<Vec<Vec<String>>>,
    group_filters: Mutex<Vec<String>>,
    bind_dns: Mutex<Vec<Option<String>>>,
}

fn push<T>(queue: &Mutex<VecDeque<T>>, value: T) {
    if let Ok(mut guard) = queue.lock() {
        guard.push_back(value);
    }
}

fn pop<T>(queue: &Mutex<VecDeque<T>>) -> Option<T> {
    queue.lock().ok()?.pop_front()
}

fn record<T>(log: &Mutex<Vec<T>>, value: T) {
    if let Ok(mut guard) = log.lock() {
        guard.push(value);
    }
}

fn snapshot<T: Clone>(log: &Mutex<Vec<T>>) -> Vec<T> {
    log.lock().map(|guard| guard.clone()).unwrap_or_default()
}

/// A scripted directory standing in for a real server.
///
/// Acts as the [`DirectoryConnector`]; the links it hands out share the
/// same script, so queueing and assertions go through the one handle.
#[derive(Clone, Default)]
pub struct MockDirectory {
    script: Arc<Script>,
}

impl MockDirectory {
    /// Create a mock that answers every operation with empty success.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the outcome of the next connect attempt.
    pub fn queue_connect(&self, result: DirectoryResult<()>) {
        push(&self.script.connect_results, result);
    }

    /// Delay every connect attempt, so tests can overlap callers.
    pub fn set_connect_delay(&self, delay: std::time::Duration) {
        if let Ok(mut guard) = self.script.connect_delay.lock() {
            *guard = Some(delay);
        }
    }

    /// Queue the outcome of the next bind attempt.
    pub fn queue_bind(&self, result: DirectoryResult<()>) {
        push(&self.script.bind_results, result);
    }

    /// Queue the outcome of the next user search.
    pub fn queue_user_search(&self, result: DirectoryResult<SearchOutcome<UserEntry>>) {
        push(&self.script.user_searches, result);
    }

    /// Queue the outcome of the next group search.
    pub fn queue_group_search(&self, result: DirectoryResult<SearchOutcome<GroupEntry>>) {
        push(&self.script.group_searches, result);
    }

    /// Queue the outcome of the next initgroups resolution.
    pub fn queue_initgroups(&self, result: DirectoryResult<InitgroupsResult>) {
        push(&self.script.initgroups_results, result);
    }

    /// How many connect attempts were made.
    #[must_use]
    pub fn connect_count(&self) -> usize {
        self.script.connects.load(Ordering::SeqCst)
    }

    /// How many bind attempts were made.
    #[must_use]
    pub fn bind_count(&self) -> usize {
        self.script.binds.load(Ordering::SeqCst)
    }

    /// Every user-search filter issued, in order.
    #[must_use]
    pub fn user_filters(&self) -> Vec<String> {
        snapshot(&self.script.user_filters)
    }

    /// Every user-search attribute list issued, in order.
    #[must_use]
    pub fn user_attr_lists(&self) -> Vec<Vec<String>> {
        snapshot(&self.script.user_attr_lists)
    }

    /// Every group-search filter issued, in order.
    #[must_use]
    pub fn group_filters(&self) -> Vec<String> {
        snapshot(&self.script.group_filters)
    }

    /// Every bind identity presented, in order.
    #[must_use]
    pub fn bind_dns(&self) -> Vec<Option<String>> {
        snapshot(&self.script.bind_dns)
    }

    /// A link sharing this mock's script, bypassing the connector.
    #[must_use]
    pub fn make_link(&self) -> Box<dyn DirectoryLink> {
        Box::new(MockLink {
            script: Arc::clone(&self.script),
        })
    }
}

#[async_trait]
impl DirectoryConnector for MockDirectory {
    async fn connect(&self, _opts: &ConnectOptions) -> DirectoryResult<Box<dyn DirectoryLink>> {
        self.script.connects.fetch_add(1, Ordering::SeqCst);
        let delay = self.script.connect_delay.lock().ok().and_then(|g| *g);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match pop(&self.script.connect_results) {
            Some(Err(err)) => Err(err),
            _ => Ok(self.make_link()),
        }
    }
}

struct MockLink {
    script: Arc<Script>,
}

#[async_trait]
impl DirectoryLink for MockLink {
    async fn simple_bind(
        &self,
        bind_dn: Option<&str>,
        _authtok: Option<&SecretBytes>,
    ) -> DirectoryResult<()> {
        self.script.binds.fetch_add(1, Ordering::SeqCst);
        record(&self.script.bind_dns, bind_dn.map(str::to_owned));
        pop(&self.script.bind_results).unwrap_or(Ok(()))
    }

    async fn search_users(
        &self,
        filter: &str,
        attrs: &[String],
    ) -> DirectoryResult<SearchOutcome<UserEntry>> {
        record(&self.script.user_filters, filter.to_owned());
        record(&self.script.user_attr_lists, attrs.to_vec());
        pop(&self.script.user_searches).unwrap_or_else(|| Ok(SearchOutcome::default()))
    }

    async fn search_groups(
        &self,
        filter: &str,
        _attrs: &[String],
    ) -> DirectoryResult<SearchOutcome<GroupEntry>> {
        record(&self.script.group_filters, filter.to_owned());
        pop(&self.script.group_searches).unwrap_or_else(|| Ok(SearchOutcome::default()))
    }

    async fn init_groups(
        &self,
        _name: &str,
        _user_attrs: &[String],
        _group_attrs: &[String],
    ) -> DirectoryResult<InitgroupsResult> {
        pop(&self.script.initgroups_results).unwrap_or_else(|| Ok(InitgroupsResult::default()))
    }
}
