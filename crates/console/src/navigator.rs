//! Navigator: resolves a path, runs its guards, and applies the outcome.
//!
//! Navigations may overlap (a guard can be waiting on the identity provider
//! when the user clicks elsewhere). The last navigation wins: each call takes
//! a generation number, and a call whose generation is no longer current when
//! its guards resolve reports [`NavigationOutcome::Superseded`] and changes
//! nothing: it neither moves `current_path` nor starts an interactive login.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use serde::Serialize;

use medfac_auth::{Evaluation, GuardContext, resolve, settled_snapshot};
use medfac_core::navigation::is_absolute_url;
use medfac_core::{Decision, NavigationIntent, paths};

use crate::routes::{Resolution, RouteMatch, RouteTable, ViewId};

/// Upper bound on redirects followed within one navigation.
pub const MAX_REDIRECTS: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum NavigationOutcome {
    /// The view at `path` is shown.
    Arrived {
        path: String,
        name: Option<&'static str>,
        view: Option<ViewId>,
        title: String,
    },

    /// A guard sent the browser to the identity provider.
    LeftApplication { url: String },

    /// A newer navigation started before this one resolved.
    Superseded,

    /// No route matches `path`.
    NotFound { path: String },

    /// Gave up after [`MAX_REDIRECTS`] redirects.
    RedirectLoop { path: String },
}

pub struct Navigator {
    table: Arc<RouteTable>,
    context: GuardContext,
    generation: AtomicU64,
    current: Mutex<String>,
}

impl Navigator {
    pub fn new(table: Arc<RouteTable>, context: GuardContext) -> Self {
        Self {
            table,
            context,
            generation: AtomicU64::new(0),
            current: Mutex::new(paths::HOME.to_string()),
        }
    }

    /// Path of the last applied navigation.
    pub fn current_path(&self) -> String {
        match self.current.lock() {
            Ok(current) => current.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn context(&self) -> &GuardContext {
        &self.context
    }

    pub async fn navigate(&self, full_path: &str) -> NavigationOutcome {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let origin = self.current_path();
        let mut target = full_path.to_string();

        for _ in 0..=MAX_REDIRECTS {
            let intent = NavigationIntent::new(origin.clone(), target.clone());
            tracing::debug!(
                navigation_id = %intent.id,
                from = %intent.origin_path,
                to = %intent.full_path,
                "navigating"
            );

            let matched = match self.table.resolve(&intent.target_path) {
                Resolution::Matched(matched) => matched,
                Resolution::Redirect(to) => {
                    target = to;
                    continue;
                }
                Resolution::NotFound => {
                    tracing::info!(navigation_id = %intent.id, path = %intent.target_path, "no route");
                    return NavigationOutcome::NotFound {
                        path: intent.target_path,
                    };
                }
            };

            let Some(decision) = self.run_guards(&matched, &intent, generation).await else {
                return self.superseded(&intent);
            };

            match decision {
                Decision::Proceed => {
                    return self
                        .arrive(&matched, generation)
                        .unwrap_or_else(|| self.superseded(&intent));
                }
                Decision::RedirectTo(to) if is_absolute_url(&to) => {
                    return NavigationOutcome::LeftApplication { url: to };
                }
                Decision::RedirectTo(to) => target = to,
            }
        }

        tracing::warn!(path = %target, max = MAX_REDIRECTS, "too many redirects");
        NavigationOutcome::RedirectLoop { path: target }
    }

    /// Judge every guard of `matched` against one settled snapshot.
    ///
    /// Returns `None` when a newer navigation started meanwhile; the
    /// interactive login is only started for the current navigation.
    async fn run_guards(
        &self,
        matched: &RouteMatch<'_>,
        intent: &NavigationIntent,
        generation: u64,
    ) -> Option<Decision> {
        let proceed = Evaluation::Decided(Decision::Proceed);
        if matched.guards().next().is_none() || self.context.is_bypassed() {
            return self.is_current(generation).then_some(Decision::Proceed);
        }

        let snapshot = settled_snapshot(&self.context, intent).await;
        let evaluation = matched
            .guards()
            .map(|guard| guard.check_snapshot(&snapshot, intent))
            .find(|evaluation| *evaluation != proceed)
            .unwrap_or(proceed);

        if !self.is_current(generation) {
            return None;
        }
        Some(resolve(&self.context, evaluation, intent).await)
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    fn superseded(&self, intent: &NavigationIntent) -> NavigationOutcome {
        tracing::debug!(
            navigation_id = %intent.id,
            to = %intent.full_path,
            "navigation superseded; discarding decision"
        );
        NavigationOutcome::Superseded
    }

    /// Apply the arrival unless a newer navigation started; the generation
    /// is compared under the same lock that guards `current`.
    fn arrive(&self, matched: &RouteMatch<'_>, generation: u64) -> Option<NavigationOutcome> {
        let path = matched.path().to_string();
        let mut current = match self.current.lock() {
            Ok(current) => current,
            Err(poisoned) => poisoned.into_inner(),
        };
        if !self.is_current(generation) {
            return None;
        }
        *current = path.clone();

        Some(NavigationOutcome::Arrived {
            path,
            name: matched.name(),
            view: matched.view(),
            title: matched.document_title(),
        })
    }
}

impl core::fmt::Debug for Navigator {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Navigator")
            .field("context", &self.context)
            .field("generation", &self.generation)
            .field("current", &self.current_path())
            .finish()
    }
}
