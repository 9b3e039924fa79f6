//! Warden Core - Foundation types for the Warden directory backend.
//!
//! This crate provides:
//! - Request payloads delivered by the front-end router (account lookups,
//!   PAM operations) and their completion handles
//! - Errno-style request statuses and PAM status codes
//! - The sticky online/offline tracker shared by the identity and
//!   authentication providers
//! - Zeroed-on-drop secret buffers for authentication tokens
//! - User and group entry records exchanged with the directory and the
//!   local store

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod online;
pub mod reply;
pub mod request;
pub mod secret;
pub mod status;
pub mod types;

pub use online::OnlineState;
pub use reply::{AccountReplyHandle, Completion, PamReplyHandle};
pub use request::{
    AccountRequest, AttrScope, EntryType, FilterType, PamCmd, PamItem, PamItemKind, PamRequest,
    PamResponse, PamStatus,
};
pub use secret::SecretBytes;
pub use status::ReqStatus;
pub use types::{GroupEntry, UserEntry};
