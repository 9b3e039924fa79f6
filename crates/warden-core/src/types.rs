//! User and group entry records.
//!
//! These are the parsed shapes the directory adapter produces and the
//! local store persists. The directory-side attribute names are mapped to
//! these canonical fields by the configured attribute maps.

/// A user record resolved from the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserEntry {
    /// Login name.
    pub name: String,
    /// Numeric user id.
    pub uid: u32,
    /// Primary group id.
    pub gid: u32,
    /// GECOS field.
    pub gecos: Option<String>,
    /// Home directory.
    pub home_dir: Option<String>,
    /// Login shell.
    pub shell: Option<String>,
    /// Kerberos user principal name (`user@REALM`).
    pub upn: Option<String>,
    /// Server-side last-modified timestamp.
    pub modstamp: Option<String>,
}

impl UserEntry {
    /// A minimal entry with only the required identity fields set.
    #[must_use]
    pub fn new(name: impl Into<String>, uid: u32, gid: u32) -> Self {
        Self {
            name: name.into(),
            uid,
            gid,
            gecos: None,
            home_dir: None,
            shell: None,
            upn: None,
            modstamp: None,
        }
    }
}

/// A group record resolved from the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupEntry {
    /// Group name.
    pub name: String,
    /// Numeric group id.
    pub gid: u32,
    /// Member login names.
    pub members: Vec<String>,
    /// Server-side last-modified timestamp.
    pub modstamp: Option<String>,
}

impl GroupEntry {
    /// A minimal entry with no members.
    #[must_use]
    pub fn new(name: impl Into<String>, gid: u32) -> Self {
        Self {
            name: name.into(),
            gid,
            members: Vec::new(),
            modstamp: None,
        }
    }
}
