use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Permission identifier.
///
/// Permissions are modeled as opaque `action:resource` strings
/// (e.g. "read:submissions"). Matching is exact: `read:all` is just another
/// permission, not a wildcard.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(Cow<'static, str>);

impl Permission {
    pub const READ_ALL: Permission = Permission(Cow::Borrowed("read:all"));
    pub const WRITE_ALL: Permission = Permission(Cow::Borrowed("write:all"));
    pub const DELETE_ALL: Permission = Permission(Cow::Borrowed("delete:all"));
    pub const MANAGE_USERS: Permission = Permission(Cow::Borrowed("manage:users"));
    pub const READ_SUBMISSIONS: Permission = Permission(Cow::Borrowed("read:submissions"));
    pub const WRITE_FACILITIES: Permission = Permission(Cow::Borrowed("write:facilities"));
    pub const APPROVE_SUBMISSIONS: Permission = Permission(Cow::Borrowed("approve:submissions"));
    pub const EDIT_FACILITIES: Permission = Permission(Cow::Borrowed("edit:facilities"));
    pub const VIEW_ANALYTICS: Permission = Permission(Cow::Borrowed("view:analytics"));
    pub const COMMENT_SUBMISSIONS: Permission = Permission(Cow::Borrowed("comment:submissions"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
