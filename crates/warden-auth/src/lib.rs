//! Warden Auth - the authentication provider.
//!
//! Authenticates users by driving a privilege-separated helper child that
//! talks to the KDC:
//!
//! - [`pipeline::AuthProvider`] resolves the user principal, runs the
//!   child protocol, maps the reply onto a PAM response, and triggers
//!   offline credential caching
//! - [`child`] owns the subprocess plumbing: spawn with privilege drop,
//!   one-shot framed request on stdin, bounded reply on stdout
//! - [`wire`] is the little-endian framing shared with the helper
//! - [`context::AuthContext`] carries the Kerberos settings and the
//!   environment the helper inherits

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod cache;
pub mod child;
pub mod context;
pub mod error;
pub mod pipeline;
pub mod wire;

#[cfg(all(test, unix))]
mod testutil;

pub use context::AuthContext;
pub use error::{AuthError, AuthResult};
pub use pipeline::AuthProvider;
pub use wire::MAX_CHILD_MSG_SIZE;
