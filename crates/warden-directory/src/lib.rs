//! Warden Directory - session and search plumbing over the directory codec.
//!
//! The low-level wire codec (bind, search, paging) lives behind the
//! [`DirectoryConnector`] and [`DirectoryLink`] traits; this crate owns
//! what sits on top of it:
//!
//! - [`DirectorySession`] — the at-most-one shared session per backend,
//!   with its connected flag and bound identity
//! - Filter construction, including the watermark-based delta filters the
//!   enumeration scheduler relies on
//! - [`mock`] — a scripted in-process directory used by the provider
//!   tests across the workspace

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod client;
pub mod error;
pub mod filter;
pub mod mock;
pub mod session;

pub use client::{ConnectOptions, DirectoryConnector, DirectoryLink, InitgroupsResult, SearchOutcome};
pub use error::{DirectoryError, DirectoryResult};
pub use session::DirectorySession;
