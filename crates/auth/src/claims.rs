//! User claims as issued by the identity provider, and the pure extractors the
//! guards use to read them.
//!
//! Every extractor is total: an absent user has no roles and no permissions,
//! and an empty required set is never satisfied.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Permission, Role};

static NO_ROLES: BTreeSet<Role> = BTreeSet::new();
static NO_PERMISSIONS: BTreeSet<Permission> = BTreeSet::new();

/// Claims of the signed-in user.
///
/// Roles and permissions live under the provider's namespaced claims
/// (`https://medicalfacilities.com/roles`, `.../permissions`); a missing claim
/// is an empty set.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UserClaims {
    #[serde(rename = "https://medicalfacilities.com/roles", default)]
    pub roles: BTreeSet<Role>,

    #[serde(rename = "https://medicalfacilities.com/permissions", default)]
    pub permissions: BTreeSet<Permission>,

    #[serde(flatten)]
    pub profile: UserProfile,
}

/// Opaque profile part of the claims. Guards never look at it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,

    /// Any other claim, kept verbatim.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl UserClaims {
    pub fn new(
        roles: impl IntoIterator<Item = Role>,
        permissions: impl IntoIterator<Item = Permission>,
    ) -> Self {
        Self {
            roles: roles.into_iter().collect(),
            permissions: permissions.into_iter().collect(),
            profile: UserProfile::default(),
        }
    }
}

pub fn roles(user: Option<&UserClaims>) -> &BTreeSet<Role> {
    user.map_or(&NO_ROLES, |u| &u.roles)
}

pub fn permissions(user: Option<&UserClaims>) -> &BTreeSet<Permission> {
    user.map_or(&NO_PERMISSIONS, |u| &u.permissions)
}

pub fn has_role(user: Option<&UserClaims>, role: &Role) -> bool {
    roles(user).contains(role)
}

pub fn has_permission(user: Option<&UserClaims>, permission: &Permission) -> bool {
    permissions(user).contains(permission)
}

/// True iff the user holds at least one of `required`.
pub fn has_any_role<'r>(user: Option<&UserClaims>, required: impl IntoIterator<Item = &'r Role>) -> bool {
    let held = roles(user);
    required.into_iter().any(|role| held.contains(role))
}

/// True iff the user holds at least one of `required`.
pub fn has_any_permission<'p>(
    user: Option<&UserClaims>,
    required: impl IntoIterator<Item = &'p Permission>,
) -> bool {
    let held = permissions(user);
    required.into_iter().any(|permission| held.contains(permission))
}

pub fn can_access_admin_area(user: Option<&UserClaims>) -> bool {
    has_any_role(user, &Role::ADMIN_ROLES)
}

/// Highest admin role a user holds, for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleLevel {
    NoAdminAccess,
    Reviewer,
    NurseAdmin,
    SuperAdmin,
}

pub fn role_level(user: Option<&UserClaims>) -> RoleLevel {
    if has_role(user, &Role::SUPER_ADMIN) {
        RoleLevel::SuperAdmin
    } else if has_role(user, &Role::NURSE_ADMIN) {
        RoleLevel::NurseAdmin
    } else if has_role(user, &Role::REVIEWER) {
        RoleLevel::Reviewer
    } else {
        RoleLevel::NoAdminAccess
    }
}

impl core::fmt::Display for RoleLevel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            RoleLevel::SuperAdmin => "Super Admin",
            RoleLevel::NurseAdmin => "Nurse Admin",
            RoleLevel::Reviewer => "Reviewer",
            RoleLevel::NoAdminAccess => "No Admin Access",
        })
    }
}
