//! The helper-child wire format.
//!
//! One framed request down the child's stdin, one framed reply back on
//! its stdout; all integers little-endian.
//!
//! Request:
//!
//! ```text
//! u32 cmd
//! u32 upn_len,       bytes upn[upn_len]           (no NUL)
//! u32 authtok_len,   bytes authtok[authtok_len]
//! cmd == change-authtok only:
//! u32 newauthtok_len, bytes newauthtok[newauthtok_len]
//! ```
//!
//! Reply (single message):
//!
//! ```text
//! i32 pam_status
//! i32 msg_type
//! i32 msg_len, bytes msg[msg_len]
//! ```

use bytes::{Buf, BufMut, BytesMut};
use zeroize::Zeroizing;

use warden_core::{PamCmd, PamRequest};

use crate::error::{AuthError, AuthResult};

/// Upper bound on the helper's reply, and on our read of it.
pub const MAX_CHILD_MSG_SIZE: usize = 4096;

/// Byte length of the reply header (status, type, length).
const REPLY_HEADER_LEN: usize = 12;

/// A decoded helper reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildReply {
    /// Raw PAM status reported by the helper.
    pub pam_status: i32,
    /// Kind of the accompanying message.
    pub msg_type: i32,
    /// The message payload; may be empty.
    pub message: Vec<u8>,
}

/// Frame a request for the helper child.
///
/// The buffer carries the authentication token, so it is wiped when
/// released.
///
/// # Errors
///
/// Returns [`AuthError::MissingPrincipal`] when the request has not been
/// through principal resolution yet.
pub fn encode_request(req: &PamRequest) -> AuthResult<Zeroizing<Vec<u8>>> {
    let upn = req
        .upn
        .as_deref()
        .ok_or_else(|| AuthError::MissingPrincipal(req.user.clone()))?;

    let mut out = BytesMut::with_capacity(
        16 + upn.len() + req.authtok.len() + req.newauthtok.as_ref().map_or(0, |t| 4 + t.len()),
    );
    out.put_u32_le(req.cmd.wire());
    out.put_u32_le(upn.len() as u32);
    out.put_slice(upn.as_bytes());
    out.put_u32_le(req.authtok.len() as u32);
    out.put_slice(req.authtok.as_bytes());

    if req.cmd == PamCmd::ChangeAuthTok {
        match &req.newauthtok {
            Some(tok) => {
                out.put_u32_le(tok.len() as u32);
                out.put_slice(tok.as_bytes());
            },
            None => out.put_u32_le(0),
        }
    }

    Ok(Zeroizing::new(out.to_vec()))
}

/// Parse the helper's reply.
///
/// # Errors
///
/// Returns [`AuthError::MalformedReply`] when the buffer is shorter than
/// the header or the declared message length does not match the frame.
pub fn decode_reply(raw: &[u8]) -> AuthResult<ChildReply> {
    if raw.len() < REPLY_HEADER_LEN {
        return Err(AuthError::MalformedReply(format!(
            "reply of {} bytes is shorter than the {REPLY_HEADER_LEN}-byte header",
            raw.len()
        )));
    }

    let mut buf = raw;
    let pam_status = buf.get_i32_le();
    let msg_type = buf.get_i32_le();
    let msg_len = buf.get_i32_le();

    let declared = usize::try_from(msg_len)
        .map_err(|_| AuthError::MalformedReply(format!("negative message length {msg_len}")))?;
    if REPLY_HEADER_LEN + declared != raw.len() {
        return Err(AuthError::MalformedReply(format!(
            "declared message length {declared} does not match frame of {} bytes",
            raw.len()
        )));
    }

    Ok(ChildReply {
        pam_status,
        msg_type,
        message: buf[..declared].to_vec(),
    })
}
