//! Warden Store - the local cache the backend persists into.
//!
//! The daemon keeps an on-disk cache of user, group, and credential
//! records; this crate defines the slice of its interface the backend
//! consumes (attribute reads, search-result persistence, and the offline
//! password cache) plus [`MemoryStore`], an in-process implementation
//! used by the daemon in cacheless setups and by every test in the
//! workspace.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod error;
pub mod memory;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use store::{ATTR_UPN, AttrRow, LocalStore};
