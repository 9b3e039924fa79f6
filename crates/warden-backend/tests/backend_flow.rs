//! End-to-end flows through a fully assembled backend: scripted
//! directory, in-memory store, shell script standing in for the
//! Kerberos helper.

use std::sync::Arc;
use std::time::Duration;

use warden_backend::Backend;
use warden_config::BackendConfig;
use warden_core::{
    AccountRequest, AttrScope, EntryType, FilterType, PamCmd, PamRequest, PamStatus, ReqStatus,
    SecretBytes, UserEntry,
};
use warden_directory::mock::MockDirectory;
use warden_directory::{DirectoryError, SearchOutcome};
use warden_store::{LocalStore, MemoryStore};

struct World {
    backend: Backend,
    mock: MockDirectory,
    store: Arc<MemoryStore>,
}

fn world_with(config: BackendConfig) -> World {
    let mock = MockDirectory::new();
    let store = Arc::new(MemoryStore::new());
    let backend = Backend::new(
        Arc::new(config),
        Arc::clone(&store) as Arc<dyn LocalStore>,
        Arc::new(mock.clone()),
    );
    World {
        backend,
        mock,
        store,
    }
}

fn user_lookup(value: &str) -> AccountRequest {
    AccountRequest {
        entry_type: EntryType::User,
        filter_type: FilterType::Name,
        attr_scope: AttrScope::Core,
        filter_value: value.to_owned(),
    }
}

#[tokio::test]
async fn lookup_persists_into_the_store() {
    let w = world_with(BackendConfig::default());
    w.mock.queue_user_search(Ok(SearchOutcome {
        entries: vec![UserEntry::new("alice", 1000, 1000)],
        max_modstamp: None,
    }));

    let (status, message) = w.backend.handle_account(&user_lookup("alice")).await;
    assert_eq!(status, ReqStatus::Ok);
    assert_eq!(message, "Success");

    let cached = w.store.user("alice").await.expect("persisted user");
    assert_eq!(cached.uid, 1000);
}

#[tokio::test(start_paused = true)]
async fn outage_flips_offline_and_recovers() {
    let w = world_with(BackendConfig::default());
    w.mock.queue_connect(Err(DirectoryError::ConnectFailed(
        "connection refused".to_owned(),
    )));

    let (status, _) = w.backend.handle_account(&user_lookup("alice")).await;
    assert_eq!(status, ReqStatus::RetryLater);
    assert!(!w.backend.is_online());

    // Inside the window every request is refused without directory traffic.
    let connects = w.mock.connect_count();
    let (status, message) = w.backend.handle_account(&user_lookup("bob")).await;
    assert_eq!(status, ReqStatus::RetryLater);
    assert_eq!(message, "Offline");
    assert_eq!(w.mock.connect_count(), connects);

    // Past the window the backend tries the server again.
    tokio::time::advance(Duration::from_secs(61)).await;
    assert!(w.backend.is_online());
    let (status, _) = w.backend.handle_account(&user_lookup("bob")).await;
    assert_eq!(status, ReqStatus::Ok);
    assert_eq!(w.mock.connect_count(), connects + 1);
}

#[tokio::test(start_paused = true)]
async fn enumeration_runs_from_loaded_config() {
    let config = warden_config::load_str(
        r#"
        [domain]
        name = "example.com"
        enumerate = true
    "#,
    )
    .unwrap();
    let mock = MockDirectory::new();
    let store = Arc::new(MemoryStore::new());
    mock.queue_user_search(Ok(SearchOutcome {
        entries: vec![UserEntry::new("alice", 1000, 1000)],
        max_modstamp: Some("20240101000000Z".to_owned()),
    }));

    let mut backend = Backend::new(
        Arc::new(config),
        Arc::clone(&store) as Arc<dyn LocalStore>,
        Arc::new(mock.clone()),
    );
    backend.start();

    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(store.user("alice").await.is_some());
    assert_eq!(
        mock.user_filters(),
        vec!["(&(uid=*)(objectclass=posixAccount))"]
    );

    backend.shutdown().await;
}

#[cfg(unix)]
mod pam {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use std::path::PathBuf;

    use tempfile::TempDir;

    /// A helper script that drains stdin and prints a framed success reply.
    fn success_helper() -> (TempDir, PathBuf) {
        let mut raw = Vec::new();
        raw.extend_from_slice(&PamStatus::Success.wire().to_le_bytes());
        raw.extend_from_slice(&4i32.to_le_bytes());
        raw.extend_from_slice(&0i32.to_le_bytes());
        let escaped: String = raw.iter().map(|b| format!("\\{b:03o}")).collect();

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("helper.sh");
        std::fs::write(
            &path,
            format!("#!/bin/sh\ncat > /dev/null\nprintf '{escaped}'\n"),
        )
        .unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        (dir, path)
    }

    #[tokio::test]
    async fn authentication_with_cached_credentials() {
        let (_dir, helper) = success_helper();
        let mut config = BackendConfig::default();
        config.domain.cache_credentials = true;
        config.krb5.realm = Some("EXAMPLE.COM".to_owned());
        config.krb5.try_simple_upn = true;
        config.krb5.helper_path = helper;
        let w = world_with(config);

        let req = PamRequest {
            cmd: PamCmd::Authenticate,
            user: "alice".to_owned(),
            uid: nix::unistd::getuid().as_raw(),
            gid: nix::unistd::getgid().as_raw(),
            authtok: SecretBytes::from("hunter2"),
            newauthtok: None,
            upn: None,
        };
        let response = w.backend.handle_pam(req).await;

        assert_eq!(response.status, PamStatus::Success);
        assert!(
            w.store
                .verify_password("alice", &SecretBytes::from("hunter2"))
                .await
        );
    }
}
