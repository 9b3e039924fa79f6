//! Request payloads delivered by the front-end router.

use crate::secret::SecretBytes;

/// Which kind of entry an account lookup targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryType {
    /// A user record.
    User,
    /// A group record.
    Group,
    /// The full group membership of one user.
    InitGroups,
}

/// How the lookup value should be matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterType {
    /// Match by entry name.
    Name,
    /// Match by numeric id (uid or gid).
    IdNum,
}

/// Which attribute set the caller wants resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrScope {
    /// The core identity attributes.
    Core,
    /// Membership attributes only.
    Membership,
    /// Everything the attribute map covers.
    All,
}

/// An account lookup request (user, group, or initgroups).
#[derive(Debug, Clone)]
pub struct AccountRequest {
    /// The kind of entry to resolve.
    pub entry_type: EntryType,
    /// How `filter_value` should be matched.
    pub filter_type: FilterType,
    /// The requested attribute set.
    pub attr_scope: AttrScope,
    /// The name or numeric id to look up.
    pub filter_value: String,
}

/// PAM operation codes, as carried on the helper-child wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum PamCmd {
    /// Verify the supplied authentication token.
    Authenticate = 1,
    /// Establish credentials.
    Setcred = 2,
    /// Account management checks.
    AccountMgmt = 3,
    /// Open a session.
    OpenSession = 4,
    /// Close a session.
    CloseSession = 5,
    /// Change the authentication token.
    ChangeAuthTok = 6,
}

impl PamCmd {
    /// The wire representation of this command.
    #[must_use]
    pub fn wire(self) -> u32 {
        self as u32
    }
}

/// PAM result codes carried back to the front-end.
///
/// The numeric values follow the PAM convention so the front-end can hand
/// them straight to the PAM conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PamStatus {
    /// The operation succeeded.
    Success,
    /// An internal failure while servicing the operation.
    SystemError,
    /// The token did not authenticate the user.
    AuthError,
    /// The authentication source is unreachable; retry later.
    AuthInfoUnavailable,
    /// The token could not be changed.
    AuthTokError,
    /// A status this backend does not interpret; forwarded verbatim.
    Other(i32),
}

impl PamStatus {
    /// The wire representation of this status.
    #[must_use]
    pub fn wire(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::SystemError => 4,
            Self::AuthError => 7,
            Self::AuthInfoUnavailable => 9,
            Self::AuthTokError => 20,
            Self::Other(code) => code,
        }
    }

    /// Decode a status from its wire representation.
    #[must_use]
    pub fn from_wire(code: i32) -> Self {
        match code {
            0 => Self::Success,
            4 => Self::SystemError,
            7 => Self::AuthError,
            9 => Self::AuthInfoUnavailable,
            20 => Self::AuthTokError,
            other => Self::Other(other),
        }
    }
}

/// The kind of a PAM response item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PamItemKind {
    /// An error message for the user.
    ErrorMsg,
    /// An informational message for the user.
    TextInfo,
    /// An environment assignment (`NAME=value`) for the session.
    EnvItem,
    /// A kind this backend does not interpret; forwarded verbatim.
    Other(i32),
}

impl PamItemKind {
    /// The wire representation of this kind.
    #[must_use]
    pub fn wire(self) -> i32 {
        match self {
            Self::ErrorMsg => 3,
            Self::TextInfo => 4,
            Self::EnvItem => 0x4001,
            Self::Other(code) => code,
        }
    }

    /// Decode an item kind from its wire representation.
    #[must_use]
    pub fn from_wire(code: i32) -> Self {
        match code {
            3 => Self::ErrorMsg,
            4 => Self::TextInfo,
            0x4001 => Self::EnvItem,
            other => Self::Other(other),
        }
    }
}

/// One item of a PAM response (message chunk or environment export).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PamItem {
    /// What the item carries.
    pub kind: PamItemKind,
    /// The item payload.
    pub data: Vec<u8>,
}

impl PamItem {
    /// Build an environment assignment item.
    #[must_use]
    pub fn env(name: &str, value: &str) -> Self {
        Self {
            kind: PamItemKind::EnvItem,
            data: format!("{name}={value}").into_bytes(),
        }
    }

    /// Build an informational message item.
    #[must_use]
    pub fn text(message: impl Into<Vec<u8>>) -> Self {
        Self {
            kind: PamItemKind::TextInfo,
            data: message.into(),
        }
    }
}

/// A PAM request routed to the authentication provider.
#[derive(Debug, Clone)]
pub struct PamRequest {
    /// The PAM operation.
    pub cmd: PamCmd,
    /// The login name being authenticated.
    pub user: String,
    /// The requesting user's uid; the helper child drops to it.
    pub uid: u32,
    /// The requesting user's gid; the helper child drops to it.
    pub gid: u32,
    /// The current authentication token.
    pub authtok: SecretBytes,
    /// The replacement token, present only for [`PamCmd::ChangeAuthTok`].
    pub newauthtok: Option<SecretBytes>,
    /// The user principal name, populated during resolution.
    pub upn: Option<String>,
}

/// The outcome of a PAM request.
#[derive(Debug, Clone)]
pub struct PamResponse {
    /// The PAM result code.
    pub status: PamStatus,
    /// Response items in the order they were produced.
    pub items: Vec<PamItem>,
}

impl PamResponse {
    /// A response carrying only a status.
    #[must_use]
    pub fn status_only(status: PamStatus) -> Self {
        Self {
            status,
            items: Vec::new(),
        }
    }
}
