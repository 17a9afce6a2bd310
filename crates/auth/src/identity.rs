//! Identity provider capability consumed by the guards.
//!
//! The provider owns the [`IdentitySnapshot`] and is the only party that
//! changes it. Guards read the latest value and, while the provider is still
//! initializing, wait on its change notifications.
//!
//! ## In-memory provider
//!
//! [`InMemoryIdentityProvider::channel`] returns a provider plus an
//! [`IdentityPublisher`]. The publisher plays the role of the provider SDK
//! (finishing initialization, signing in and out); dropping it closes the
//! provider, which waiting guards observe as the provider going away.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::watch;

use crate::UserClaims;
use crate::config::ProviderConfig;

/// Read-only view of the current authentication status.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentitySnapshot {
    pub is_loading: bool,
    pub is_authenticated: bool,
    pub user: Option<UserClaims>,
}

impl IdentitySnapshot {
    /// Provider still initializing (state at application start).
    pub fn loading() -> Self {
        Self {
            is_loading: true,
            ..Self::default()
        }
    }

    pub fn signed_out() -> Self {
        Self::default()
    }

    pub fn signed_in(user: UserClaims) -> Self {
        Self {
            is_loading: false,
            is_authenticated: true,
            user: Some(user),
        }
    }

    pub fn user(&self) -> Option<&UserClaims> {
        self.user.as_ref()
    }
}

/// Options for the provider's interactive login flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginOptions {
    /// Where the provider sends the browser after login (`<origin>/admin/callback`).
    pub redirect_uri: String,

    /// Full path the user originally asked for.
    pub return_to: String,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("login redirect failed: {0}")]
    LoginFailed(String),

    #[error("identity provider is closed")]
    Closed,
}

/// Identity provider client as seen by the guards.
#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Current snapshot.
    fn snapshot(&self) -> IdentitySnapshot;

    /// Change notifications for the snapshot.
    fn subscribe(&self) -> watch::Receiver<IdentitySnapshot>;

    /// Start the interactive login flow.
    ///
    /// Returns the URL the browser is sent to; control leaves the application.
    async fn login_with_redirect(&self, options: LoginOptions) -> Result<String, ProviderError>;
}

/// Write side of an [`InMemoryIdentityProvider`].
#[derive(Debug)]
pub struct IdentityPublisher {
    sender: watch::Sender<IdentitySnapshot>,
}

impl IdentityPublisher {
    pub fn publish(&self, snapshot: IdentitySnapshot) {
        tracing::debug!(
            is_loading = snapshot.is_loading,
            is_authenticated = snapshot.is_authenticated,
            "identity snapshot updated"
        );
        self.sender.send_replace(snapshot);
    }

    /// Initialization finished with nobody signed in.
    pub fn finish_loading(&self) {
        self.publish(IdentitySnapshot::signed_out());
    }

    pub fn sign_in(&self, user: UserClaims) {
        self.publish(IdentitySnapshot::signed_in(user));
    }

    pub fn sign_out(&self) {
        self.publish(IdentitySnapshot::signed_out());
    }
}

/// In-memory provider for tests, benches and the console binary.
#[derive(Debug)]
pub struct InMemoryIdentityProvider {
    receiver: watch::Receiver<IdentitySnapshot>,
    authorize_endpoint: String,
    login_requests: Mutex<Vec<LoginOptions>>,
    reject_logins: AtomicBool,
}

impl InMemoryIdentityProvider {
    pub fn channel(config: &ProviderConfig, initial: IdentitySnapshot) -> (IdentityPublisher, Self) {
        let (sender, receiver) = watch::channel(initial);
        let provider = Self {
            receiver,
            authorize_endpoint: config.authorize_endpoint(),
            login_requests: Mutex::new(Vec::new()),
            reject_logins: AtomicBool::new(false),
        };
        (IdentityPublisher { sender }, provider)
    }

    /// Login requests received so far, oldest first.
    pub fn login_requests(&self) -> Vec<LoginOptions> {
        self.login_requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    /// Make subsequent `login_with_redirect` calls fail.
    pub fn reject_logins(&self) {
        self.reject_logins.store(true, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    fn snapshot(&self) -> IdentitySnapshot {
        self.receiver.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<IdentitySnapshot> {
        self.receiver.clone()
    }

    async fn login_with_redirect(&self, options: LoginOptions) -> Result<String, ProviderError> {
        if self.reject_logins.load(Ordering::SeqCst) {
            return Err(ProviderError::LoginFailed("login rejected by provider".to_string()));
        }
        if self.receiver.has_changed().is_err() {
            return Err(ProviderError::Closed);
        }

        let mut requests = self
            .login_requests
            .lock()
            .map_err(|_| ProviderError::LoginFailed("login request log poisoned".to_string()))?;
        requests.push(options);

        Ok(self.authorize_endpoint.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Role;

    fn in_memory(initial: IdentitySnapshot) -> (IdentityPublisher, InMemoryIdentityProvider) {
        InMemoryIdentityProvider::channel(&ProviderConfig::default(), initial)
    }

    #[test]
    fn published_snapshots_are_visible() {
        let (publisher, provider) = in_memory(IdentitySnapshot::loading());
        assert!(provider.snapshot().is_loading);

        publisher.sign_in(UserClaims::new([Role::REVIEWER], Vec::new()));
        let snapshot = provider.snapshot();
        assert!(!snapshot.is_loading);
        assert!(snapshot.is_authenticated);
        assert!(snapshot.user().is_some());

        publisher.sign_out();
        assert_eq!(provider.snapshot(), IdentitySnapshot::signed_out());
    }

    #[tokio::test]
    async fn login_records_request_and_returns_authorize_endpoint() {
        let (_publisher, provider) = in_memory(IdentitySnapshot::signed_out());
        let options = LoginOptions {
            redirect_uri: "http://localhost:8080/admin/callback".to_string(),
            return_to: "/admin/profile".to_string(),
        };

        let url = provider.login_with_redirect(options.clone()).await.unwrap();
        assert_eq!(url, "https://your-tenant.auth0.com/authorize");
        assert_eq!(provider.login_requests(), vec![options]);
    }

    #[tokio::test]
    async fn login_fails_once_publisher_is_gone() {
        let (publisher, provider) = in_memory(IdentitySnapshot::signed_out());
        drop(publisher);

        let err = provider
            .login_with_redirect(LoginOptions {
                redirect_uri: "http://localhost:8080/admin/callback".to_string(),
                return_to: "/admin".to_string(),
            })
            .await
            .unwrap_err();
        assert_eq!(err, ProviderError::Closed);
    }

    #[tokio::test]
    async fn rejected_logins_surface_as_errors() {
        let (_publisher, provider) = in_memory(IdentitySnapshot::signed_out());
        provider.reject_logins();

        let result = provider
            .login_with_redirect(LoginOptions {
                redirect_uri: "http://localhost:8080/admin/callback".to_string(),
                return_to: "/admin".to_string(),
            })
            .await;
        assert!(matches!(result, Err(ProviderError::LoginFailed(_))));
        assert!(provider.login_requests().is_empty());
    }
}
