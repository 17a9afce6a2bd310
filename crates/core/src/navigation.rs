//! Navigation intents and guard decisions.
//!
//! A [`NavigationIntent`] is created by the router once per navigation attempt
//! and discarded after its guards resolve. A [`Decision`] is the single outcome
//! a guard produces for that attempt.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::NavigationId;

/// Fixed in-app redirect targets of the admin console.
pub mod paths {
    pub const HOME: &str = "/";
    pub const ADMIN_ROOT: &str = "/admin";
    pub const LOGIN: &str = "/admin/login";
    pub const CALLBACK: &str = "/admin/callback";
    pub const UNAUTHORIZED: &str = "/admin/unauthorized";
    pub const FORBIDDEN: &str = "/admin/forbidden";
}

/// One navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationIntent {
    pub id: NavigationId,

    /// Path being navigated to, without query string or fragment.
    pub target_path: String,

    /// Path the user is navigating away from.
    pub origin_path: String,

    /// Target including query string and fragment (used as login `returnTo`).
    pub full_path: String,

    pub started_at: DateTime<Utc>,
}

impl NavigationIntent {
    pub fn new(origin_path: impl Into<String>, full_path: impl Into<String>) -> Self {
        let full_path = full_path.into();
        let target_path = strip_query(&full_path).to_string();
        Self {
            id: NavigationId::new(),
            target_path,
            origin_path: origin_path.into(),
            full_path,
            started_at: Utc::now(),
        }
    }
}

fn strip_query(full_path: &str) -> &str {
    let end = full_path.find(['?', '#']).unwrap_or(full_path.len());
    &full_path[..end]
}

/// Outcome of a guard for one navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "to", rename_all = "snake_case")]
pub enum Decision {
    /// Navigation may continue.
    Proceed,

    /// Navigation is replaced by another target.
    ///
    /// Either an in-app path (`/admin/login`) or an absolute URL issued by the
    /// identity provider, in which case control leaves the application.
    RedirectTo(String),
}

impl Decision {
    pub fn redirect_to(path: impl Into<String>) -> Self {
        Self::RedirectTo(path.into())
    }

    pub fn is_proceed(&self) -> bool {
        matches!(self, Self::Proceed)
    }

    pub fn redirect_path(&self) -> Option<&str> {
        match self {
            Self::Proceed => None,
            Self::RedirectTo(path) => Some(path),
        }
    }

    /// Whether the redirect target leaves the application.
    pub fn is_external(&self) -> bool {
        self.redirect_path().is_some_and(is_absolute_url)
    }
}

pub fn is_absolute_url(target: &str) -> bool {
    target.starts_with("https://") || target.starts_with("http://")
}

impl core::fmt::Display for Decision {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Proceed => f.write_str("proceed"),
            Self::RedirectTo(path) => write!(f, "redirect to {}", path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_path_drops_query_and_fragment() {
        let nav = NavigationIntent::new("/", "/admin/submissions/all?page=2#top");
        assert_eq!(nav.target_path, "/admin/submissions/all");
        assert_eq!(nav.full_path, "/admin/submissions/all?page=2#top");
        assert_eq!(nav.origin_path, "/");
    }

    #[test]
    fn external_redirects_are_detected() {
        assert!(Decision::redirect_to("https://tenant.auth0.com/authorize").is_external());
        assert!(!Decision::redirect_to(paths::LOGIN).is_external());
        assert!(!Decision::Proceed.is_external());
    }

    #[test]
    fn decision_serializes_tagged() {
        let json = serde_json::to_value(Decision::redirect_to(paths::FORBIDDEN)).unwrap();
        assert_eq!(json, serde_json::json!({ "kind": "redirect_to", "to": "/admin/forbidden" }));
    }
}
