//! Guard composer.
//!
//! A [`Guard`] is a value: either one static [`AccessRequirement`] or a chain
//! of two guards. Route tables hold guards, and the router runs them through
//! [`Guard::check`] with the live [`GuardContext`].

use serde::{Deserialize, Serialize};

use medfac_core::{Decision, NavigationIntent};

use crate::evaluate::{Evaluation, GuardContext, bypassed, judge, resolve, settled_snapshot};
use crate::identity::IdentitySnapshot;
use crate::{AccessRequirement, Permission, Role};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Guard {
    Require(AccessRequirement),

    /// Run the first guard; run the second only if the first proceeds.
    Chain(Box<Guard>, Box<Guard>),
}

impl Guard {
    pub fn require(requirement: AccessRequirement) -> Self {
        Self::Require(requirement)
    }

    pub fn then(self, next: Guard) -> Self {
        chain(self, next)
    }

    /// Requirements in the order they are checked.
    pub fn requirements(&self) -> Vec<&AccessRequirement> {
        let mut out = Vec::new();
        self.collect_requirements(&mut out);
        out
    }

    fn collect_requirements<'a>(&'a self, out: &mut Vec<&'a AccessRequirement>) {
        match self {
            Guard::Require(requirement) => out.push(requirement),
            Guard::Chain(first, second) => {
                first.collect_requirements(out);
                second.collect_requirements(out);
            }
        }
    }

    /// Run the guard against the live identity in `context`.
    ///
    /// Every requirement is judged against the same settled snapshot.
    pub async fn check(&self, context: &GuardContext, navigation: &NavigationIntent) -> Decision {
        if bypassed(context, navigation) {
            return Decision::Proceed;
        }

        let snapshot = settled_snapshot(context, navigation).await;
        resolve(context, self.check_snapshot(&snapshot, navigation), navigation).await
    }

    /// Run the guard over a fixed snapshot.
    ///
    /// Stops at the first requirement that does not proceed. Starts no login;
    /// a `Login` result is left to [`resolve`].
    pub fn check_snapshot(&self, snapshot: &IdentitySnapshot, navigation: &NavigationIntent) -> Evaluation {
        for requirement in self.requirements() {
            match judge(snapshot, requirement, navigation) {
                Evaluation::Decided(Decision::Proceed) => continue,
                other => return other,
            }
        }
        Evaluation::Decided(Decision::Proceed)
    }
}

/// `first`, then `second` if `first` proceeds.
pub fn chain(first: Guard, second: Guard) -> Guard {
    Guard::Chain(Box::new(first), Box::new(second))
}

pub fn for_role(roles: impl IntoIterator<Item = Role>) -> Guard {
    Guard::require(AccessRequirement::any_role(roles))
}

pub fn for_permission(permissions: impl IntoIterator<Item = Permission>) -> Guard {
    Guard::require(AccessRequirement::any_permission(permissions))
}

/// Signed-in users only; signed-out users start the interactive login.
pub fn authenticated_guard() -> Guard {
    Guard::require(AccessRequirement::AuthenticatedOnly)
}

/// Signed-in users only; signed-out users go to the admin login page.
pub fn admin_session_guard() -> Guard {
    Guard::require(AccessRequirement::AdminSession)
}

pub fn admin_area_guard() -> Guard {
    Guard::require(AccessRequirement::AdminArea)
}

/// Entry guard of the protected admin area: signed in, then an admin role.
pub fn authenticated_admin_guard() -> Guard {
    chain(admin_session_guard(), admin_area_guard())
}
