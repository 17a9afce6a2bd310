use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{Permission, Role};

/// Static access rule attached to a route.
///
/// Values are built once with the route table and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "any_of", rename_all = "snake_case")]
pub enum AccessRequirement {
    /// Public route.
    None,

    /// Any signed-in user. Signed-out users start the interactive login.
    AuthenticatedOnly,

    /// Any signed-in user. Signed-out users go to the admin login page.
    AdminSession,

    /// Signed-in user holding at least one admin role.
    AdminArea,

    /// Signed-in user holding at least one of the roles. An empty set is
    /// never satisfied.
    AnyRole(BTreeSet<Role>),

    /// Signed-in user holding at least one of the permissions. An empty set
    /// is never satisfied.
    AnyPermission(BTreeSet<Permission>),
}

impl AccessRequirement {
    pub fn any_role(roles: impl IntoIterator<Item = Role>) -> Self {
        Self::AnyRole(roles.into_iter().collect())
    }

    pub fn any_permission(permissions: impl IntoIterator<Item = Permission>) -> Self {
        Self::AnyPermission(permissions.into_iter().collect())
    }

    pub fn is_public(&self) -> bool {
        matches!(self, Self::None)
    }
}

impl core::fmt::Display for AccessRequirement {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        fn join<T: core::fmt::Display>(items: &BTreeSet<T>) -> String {
            items.iter().map(ToString::to_string).collect::<Vec<_>>().join(",")
        }

        match self {
            Self::None => f.write_str("none"),
            Self::AuthenticatedOnly => f.write_str("authenticated"),
            Self::AdminSession => f.write_str("admin-session"),
            Self::AdminArea => f.write_str("admin-area"),
            Self::AnyRole(roles) => write!(f, "any-role[{}]", join(roles)),
            Self::AnyPermission(permissions) => write!(f, "any-permission[{}]", join(permissions)),
        }
    }
}
