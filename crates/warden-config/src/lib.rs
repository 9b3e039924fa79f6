//! Warden Config - configuration for the directory backend.
//!
//! One TOML file per configured domain, deserialized into [`BackendConfig`]
//! with production defaults for every section: a bare `[section]` header
//! produces a working POSIX-style configuration. Validation happens at
//! load time: an unknown TLS policy or authtok type fails the load, and
//! with it module init.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::{ConfigError, ConfigResult};
pub use loader::{load_file, load_str};
pub use types::{
    BackendConfig, DirectorySection, DomainSection, GroupAttrMap, KerberosSection, TlsPolicy,
    UserAttrMap,
};
