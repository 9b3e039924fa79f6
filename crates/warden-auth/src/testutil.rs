//! Shared fixtures for the crate tests: scripted stand-ins for the
//! helper binary.

use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;

use tempfile::TempDir;

/// Render bytes as octal escapes for a `printf` reply script.
pub(crate) fn octal(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("\\{b:03o}")).collect()
}

/// A helper script that drains stdin and prints the given raw reply.
pub(crate) fn script_with_reply(reply: &[u8]) -> (TempDir, PathBuf) {
    script_with_body(&format!("#!/bin/sh\ncat > /dev/null\nprintf '{}'\n", octal(reply)))
}

/// A helper script that drains stdin and prints a framed reply with the
/// given status, message type, and message.
pub(crate) fn script_with_framed_reply(
    pam_status: i32,
    msg_type: i32,
    message: &[u8],
) -> (TempDir, PathBuf) {
    let mut raw = Vec::new();
    raw.extend_from_slice(&pam_status.to_le_bytes());
    raw.extend_from_slice(&msg_type.to_le_bytes());
    raw.extend_from_slice(&(message.len() as i32).to_le_bytes());
    raw.extend_from_slice(message);
    script_with_reply(&raw)
}

/// A helper script with an arbitrary shell body.
pub(crate) fn script_with_body(body: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("create script dir");
    let path = dir.path().join("helper.sh");
    std::fs::write(&path, body).expect("write script");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
        .expect("mark script executable");
    (dir, path)
}

/// The current process identity, for privilege drops that must succeed
/// without root.
pub(crate) fn own_ids() -> (u32, u32) {
    (
        nix::unistd::getuid().as_raw(),
        nix::unistd::getgid().as_raw(),
    )
}
