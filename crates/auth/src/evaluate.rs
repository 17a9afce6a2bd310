//! Guard evaluator: one access decision per navigation attempt.
//!
//! [`evaluate_snapshot`] is the pure decision step over a fixed snapshot.
//! [`evaluate`] drives it against a live provider in three steps:
//! [`settled_snapshot`] waits while the provider is initializing, the pure
//! step judges that one snapshot, and [`resolve`] performs the interactive
//! login when asked to. It always ends with exactly one [`Decision`].
//!
//! Denials are redirects, never errors:
//!
//! | situation                                   | decision               |
//! |---------------------------------------------|------------------------|
//! | signed out, `AuthenticatedOnly`             | provider login URL     |
//! | signed out, any other non-public rule       | `/admin/login`         |
//! | signed in, no admin role, `AdminArea`       | `/admin/unauthorized`  |
//! | signed in, missing role/permission          | `/admin/forbidden`     |

use std::sync::Arc;

use medfac_core::{Decision, NavigationIntent, paths};

use crate::claims::{can_access_admin_area, has_any_permission, has_any_role};
use crate::config::{Bypass, ProviderConfig};
use crate::identity::{IdentityProvider, IdentitySnapshot, LoginOptions};
use crate::AccessRequirement;

/// Everything a guard needs at invocation time.
///
/// Injected explicitly into every evaluation; guards never look identity state
/// up globally.
#[derive(Clone)]
pub struct GuardContext {
    provider: Option<Arc<dyn IdentityProvider>>,
    bypass: Option<Bypass>,
    redirect_uri: String,
}

impl GuardContext {
    pub fn new(provider: Arc<dyn IdentityProvider>, config: &ProviderConfig) -> Self {
        Self {
            provider: Some(provider),
            bypass: None,
            redirect_uri: config.redirect_uri(),
        }
    }

    /// Context without a provider client; every navigation is treated as
    /// signed out.
    pub fn without_provider(config: &ProviderConfig) -> Self {
        Self {
            provider: None,
            bypass: None,
            redirect_uri: config.redirect_uri(),
        }
    }

    pub fn with_bypass(mut self, bypass: Option<Bypass>) -> Self {
        self.bypass = bypass;
        self
    }

    pub fn is_bypassed(&self) -> bool {
        self.bypass.is_some()
    }

    pub fn provider(&self) -> Option<&Arc<dyn IdentityProvider>> {
        self.provider.as_ref()
    }

    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }
}

impl core::fmt::Debug for GuardContext {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GuardContext")
            .field("provider", &self.provider.is_some())
            .field("bypass", &self.bypass)
            .field("redirect_uri", &self.redirect_uri)
            .finish()
    }
}

/// Result of the pure decision step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Evaluation {
    /// Provider still loading; no decision yet.
    Suspend,

    Decided(Decision),

    /// Signed out on an `AuthenticatedOnly` route: start interactive login.
    Login { return_to: String },
}

/// Decide over a fixed snapshot.
pub fn evaluate_snapshot(
    snapshot: &IdentitySnapshot,
    requirement: &AccessRequirement,
    navigation: &NavigationIntent,
) -> Evaluation {
    if snapshot.is_loading {
        return Evaluation::Suspend;
    }
    if requirement.is_public() {
        return Evaluation::Decided(Decision::Proceed);
    }

    if !snapshot.is_authenticated {
        return match requirement {
            AccessRequirement::AuthenticatedOnly => Evaluation::Login {
                return_to: navigation.full_path.clone(),
            },
            _ => Evaluation::Decided(Decision::redirect_to(paths::LOGIN)),
        };
    }

    let user = snapshot.user();
    let decision = match requirement {
        AccessRequirement::None
        | AccessRequirement::AuthenticatedOnly
        | AccessRequirement::AdminSession => Decision::Proceed,
        AccessRequirement::AdminArea => allow_or(can_access_admin_area(user), paths::UNAUTHORIZED),
        AccessRequirement::AnyRole(roles) => allow_or(has_any_role(user, roles), paths::FORBIDDEN),
        AccessRequirement::AnyPermission(permissions) => {
            allow_or(has_any_permission(user, permissions), paths::FORBIDDEN)
        }
    };
    Evaluation::Decided(decision)
}

fn allow_or(allowed: bool, denied: &str) -> Decision {
    if allowed {
        Decision::Proceed
    } else {
        Decision::redirect_to(denied)
    }
}

/// Decide against the live provider in `context`.
///
/// Suspends (without blocking) until the provider has finished loading. If the
/// provider goes away while loading, or is absent altogether, the user is
/// treated as signed out.
pub async fn evaluate(
    context: &GuardContext,
    requirement: &AccessRequirement,
    navigation: &NavigationIntent,
) -> Decision {
    if bypassed(context, navigation) {
        return Decision::Proceed;
    }

    let snapshot = settled_snapshot(context, navigation).await;
    let evaluation = judge(&snapshot, requirement, navigation);
    resolve(context, evaluation, navigation).await
}

/// Latest snapshot once the provider has finished loading.
///
/// Without a provider, or if the provider closes while loading, the user is
/// signed out. Every guard of one navigation is judged against this one
/// snapshot.
pub async fn settled_snapshot(context: &GuardContext, navigation: &NavigationIntent) -> IdentitySnapshot {
    let Some(provider) = context.provider() else {
        tracing::warn!(
            navigation_id = %navigation.id,
            target = %navigation.target_path,
            "identity provider unavailable; treating user as signed out"
        );
        return IdentitySnapshot::signed_out();
    };

    let mut updates = provider.subscribe();
    loop {
        let snapshot = updates.borrow_and_update().clone();
        if !snapshot.is_loading {
            return snapshot;
        }

        tracing::debug!(
            navigation_id = %navigation.id,
            target = %navigation.target_path,
            "identity provider loading; waiting"
        );
        if updates.changed().await.is_err() {
            tracing::warn!(
                navigation_id = %navigation.id,
                target = %navigation.target_path,
                "identity provider closed while loading; treating user as signed out"
            );
            return IdentitySnapshot::signed_out();
        }
    }
}

/// Apply an evaluation of a settled snapshot.
///
/// `Login` starts the provider's interactive login; this is the only side
/// effect of a guard, so callers that may be superseded check staleness
/// before calling this.
pub async fn resolve(context: &GuardContext, evaluation: Evaluation, navigation: &NavigationIntent) -> Decision {
    match evaluation {
        Evaluation::Decided(decision) => decision,
        Evaluation::Login { return_to } => match context.provider() {
            Some(provider) => login(context, provider.as_ref(), navigation, return_to).await,
            None => Decision::redirect_to(paths::LOGIN),
        },
        // A settled snapshot never suspends.
        Evaluation::Suspend => Decision::redirect_to(paths::LOGIN),
    }
}

/// `true` when the development bypass lets `navigation` through unchecked.
pub(crate) fn bypassed(context: &GuardContext, navigation: &NavigationIntent) -> bool {
    if context.is_bypassed() {
        tracing::debug!(
            navigation_id = %navigation.id,
            target = %navigation.target_path,
            "development bypass: proceeding"
        );
    }
    context.is_bypassed()
}

/// [`evaluate_snapshot`], logging the decision when there is one.
pub(crate) fn judge(
    snapshot: &IdentitySnapshot,
    requirement: &AccessRequirement,
    navigation: &NavigationIntent,
) -> Evaluation {
    let evaluation = evaluate_snapshot(snapshot, requirement, navigation);
    if let Evaluation::Decided(decision) = &evaluation {
        log_decision(requirement, navigation, decision);
    }
    evaluation
}

async fn login(
    context: &GuardContext,
    provider: &dyn IdentityProvider,
    navigation: &NavigationIntent,
    return_to: String,
) -> Decision {
    let options = LoginOptions {
        redirect_uri: context.redirect_uri().to_string(),
        return_to,
    };

    tracing::info!(
        navigation_id = %navigation.id,
        return_to = %options.return_to,
        "signed out; starting interactive login"
    );

    match provider.login_with_redirect(options).await {
        Ok(url) => Decision::RedirectTo(url),
        Err(e) => {
            tracing::warn!(
                navigation_id = %navigation.id,
                error = %e,
                "interactive login failed; falling back to login page"
            );
            Decision::redirect_to(paths::LOGIN)
        }
    }
}

fn log_decision(requirement: &AccessRequirement, navigation: &NavigationIntent, decision: &Decision) {
    match decision {
        Decision::Proceed => tracing::debug!(
            navigation_id = %navigation.id,
            target = %navigation.target_path,
            requirement = %requirement,
            "access granted"
        ),
        Decision::RedirectTo(to) => tracing::info!(
            navigation_id = %navigation.id,
            target = %navigation.target_path,
            requirement = %requirement,
            redirect = %to,
            "access denied"
        ),
    }
}
