use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Role identifier used for RBAC.
///
/// Roles are opaque strings issued by the identity provider under the
/// namespaced roles claim. The admin console knows three of them.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(Cow<'static, str>);

impl Role {
    pub const SUPER_ADMIN: Role = Role(Cow::Borrowed("super-admin"));
    pub const NURSE_ADMIN: Role = Role(Cow::Borrowed("nurse-admin"));
    pub const REVIEWER: Role = Role(Cow::Borrowed("reviewer"));

    /// Roles that grant entry to the admin area at all.
    pub const ADMIN_ROLES: [Role; 3] = [Self::SUPER_ADMIN, Self::NURSE_ADMIN, Self::REVIEWER];

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
