//! The helper-child supervisor.
//!
//! One invocation per authentication attempt: spawn the helper with the
//! requesting user's identity, deliver the framed request on its stdin in
//! one shot, read the bounded reply from its stdout, reap. The presence
//! of a well-formed reply governs success; the child's exit status is
//! only logged.

use std::path::Path;
use std::process::Stdio;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::{AuthError, AuthResult};
use crate::wire::MAX_CHILD_MSG_SIZE;

/// Working directory the helper runs under.
const HELPER_WORKDIR: &str = "/tmp";

/// Run one helper invocation and return its raw reply bytes.
///
/// The child starts with stdin/stdout piped, stderr discarded, its
/// working directory moved to `/tmp`, and its group then user identity
/// dropped to the requesting `(uid, gid)` before exec. Both pipe ends are
/// closed on every exit path; the child is reaped before this returns.
///
/// # Errors
///
/// Returns [`AuthError::Io`] when the spawn or pipe I/O fails, and
/// [`AuthError::MalformedReply`] when the reply exceeds
/// [`MAX_CHILD_MSG_SIZE`].
pub async fn run_helper(
    helper: &Path,
    uid: u32,
    gid: u32,
    env: &[(String, String)],
    request: &[u8],
) -> AuthResult<Vec<u8>> {
    let mut cmd = Command::new(helper);
    cmd.current_dir(HELPER_WORKDIR)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .kill_on_drop(true);
    #[cfg(unix)]
    {
        // gid is applied before uid in the child, so the uid change does
        // not strip the right to change groups.
        cmd.gid(gid).uid(uid);
    }
    for (name, value) in env {
        cmd.env(name, value);
    }

    let mut child = cmd.spawn()?;
    let pid = child.id();
    debug!(helper = %helper.display(), pid, uid, gid, "helper child spawned");

    // One-shot delivery: the full frame, then EOF so the child proceeds
    // to respond.
    let mut stdin = child
        .stdin
        .take()
        .ok_or_else(|| std::io::Error::other("helper stdin unavailable"))?;
    stdin.write_all(request).await?;
    stdin.shutdown().await?;
    drop(stdin);

    let mut stdout = child
        .stdout
        .take()
        .ok_or_else(|| std::io::Error::other("helper stdout unavailable"))?;
    let mut reply = Vec::new();
    let limit = (MAX_CHILD_MSG_SIZE as u64).saturating_add(1);
    (&mut stdout).take(limit).read_to_end(&mut reply).await?;
    drop(stdout);

    // Reap before judging the reply. A non-zero exit is logged, not
    // fatal: the framed reply decides the outcome.
    match child.wait().await {
        Ok(status) if !status.success() => {
            warn!(pid, code = ?status.code(), "helper child exited non-zero");
        },
        Ok(_) => {},
        Err(err) => warn!(pid, error = %err, "failed to reap helper child"),
    }

    if reply.len() > MAX_CHILD_MSG_SIZE {
        return Err(AuthError::MalformedReply(format!(
            "reply exceeds {MAX_CHILD_MSG_SIZE} bytes"
        )));
    }
    Ok(reply)
}
