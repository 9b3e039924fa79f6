//! Warden ID - the identity provider.
//!
//! Resolves users and groups from the directory on behalf of the
//! front-end name service:
//!
//! - [`dispatch::handle_account_info`] routes lookup-by-name,
//!   lookup-by-id, and initgroups requests over the one shared session,
//!   lazily (re)establishing it
//! - [`conn::ensure_connected`] owns the connect+bind path; concurrent
//!   callers observe a single attempt
//! - [`enumerate::EnumerationScheduler`] periodically re-enumerates the
//!   directory into the local store, tracking a modification-timestamp
//!   watermark per entry kind

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod conn;
pub mod context;
pub mod dispatch;
pub mod enumerate;
pub mod error;

pub use context::ProviderContext;
pub use enumerate::EnumerationScheduler;
pub use error::{IdError, IdResult};
