//! Identity provider configuration and the development bypass.
//!
//! Configuration is read once at startup. Malformed values are fatal
//! ([`ConfigError`]); a missing or placeholder domain is not an error but the
//! "provider not configured" sentinel that, in development builds only,
//! enables [`Bypass`].

use medfac_core::{ConfigError, ConfigResult, paths};

pub const DOMAIN_VAR: &str = "MEDFAC_AUTH_DOMAIN";
pub const CLIENT_ID_VAR: &str = "MEDFAC_AUTH_CLIENT_ID";
pub const AUDIENCE_VAR: &str = "MEDFAC_AUTH_AUDIENCE";
pub const SCOPE_VAR: &str = "MEDFAC_AUTH_SCOPE";
pub const ORIGIN_VAR: &str = "MEDFAC_APP_ORIGIN";
pub const BUILD_MODE_VAR: &str = "MEDFAC_BUILD_MODE";

/// Domain value shipped in templates; treated as "not configured".
pub const PLACEHOLDER_DOMAIN: &str = "your-tenant.auth0.com";

const DEFAULT_CLIENT_ID: &str = "your-client-id";
const DEFAULT_AUDIENCE: &str = "medical-facilities-api";
const DEFAULT_SCOPE: &str = "openid profile email read:admin write:admin";
const DEFAULT_ORIGIN: &str = "http://localhost:8080";

/// Identity provider settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub domain: String,
    pub client_id: String,
    pub audience: String,
    pub scope: String,

    /// Origin the console is served from (no trailing slash).
    pub origin: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            domain: PLACEHOLDER_DOMAIN.to_string(),
            client_id: DEFAULT_CLIENT_ID.to_string(),
            audience: DEFAULT_AUDIENCE.to_string(),
            scope: DEFAULT_SCOPE.to_string(),
            origin: DEFAULT_ORIGIN.to_string(),
        }
    }
}

impl ProviderConfig {
    /// Load from the process environment.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup. Unset or empty keys take defaults.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let value = |key: &str, default: String| match lookup(key) {
            Some(v) if !v.is_empty() => v,
            _ => default,
        };

        let config = Self {
            domain: value(DOMAIN_VAR, defaults.domain),
            client_id: value(CLIENT_ID_VAR, defaults.client_id),
            audience: value(AUDIENCE_VAR, defaults.audience),
            scope: value(SCOPE_VAR, defaults.scope),
            origin: value(ORIGIN_VAR, defaults.origin),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        require_non_blank(CLIENT_ID_VAR, &self.client_id)?;
        require_non_blank(AUDIENCE_VAR, &self.audience)?;
        require_non_blank(SCOPE_VAR, &self.scope)?;
        require_non_blank(DOMAIN_VAR, &self.domain)?;

        if self.domain.contains("://") {
            return Err(ConfigError::malformed(DOMAIN_VAR, "must be a bare host, without scheme"));
        }
        if self.domain.contains('/') || self.domain.chars().any(char::is_whitespace) {
            return Err(ConfigError::malformed(DOMAIN_VAR, "must be a bare host"));
        }

        require_non_blank(ORIGIN_VAR, &self.origin)?;
        if !(self.origin.starts_with("http://") || self.origin.starts_with("https://")) {
            return Err(ConfigError::malformed(ORIGIN_VAR, "must start with http:// or https://"));
        }
        if self.origin.ends_with('/') {
            return Err(ConfigError::malformed(ORIGIN_VAR, "must not end with '/'"));
        }

        Ok(())
    }

    /// The domain is missing or still the template placeholder.
    pub fn is_unconfigured(&self) -> bool {
        self.domain.is_empty() || self.domain == PLACEHOLDER_DOMAIN
    }

    /// Callback the provider returns to after login.
    pub fn redirect_uri(&self) -> String {
        format!("{}{}", self.origin, paths::CALLBACK)
    }

    pub fn authorize_endpoint(&self) -> String {
        format!("https://{}/authorize", self.domain)
    }
}

fn require_non_blank(key: &'static str, value: &str) -> ConfigResult<()> {
    if value.trim().is_empty() {
        return Err(ConfigError::empty(key));
    }
    Ok(())
}

/// Build mode flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildMode {
    Development,
    Production,
}

impl BuildMode {
    /// Mode of the running binary: release builds are always production.
    pub fn current() -> Self {
        if cfg!(debug_assertions) {
            BuildMode::Development
        } else {
            BuildMode::Production
        }
    }

    /// Build mode, optionally narrowed by `MEDFAC_BUILD_MODE=production`.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        match lookup(BUILD_MODE_VAR).as_deref() {
            None | Some("") => Ok(Self::current()),
            Some("production") => Ok(BuildMode::Production),
            Some("development") => Ok(Self::current()),
            Some(other) => Err(ConfigError::malformed(
                BUILD_MODE_VAR,
                format!("expected 'development' or 'production', got '{}'", other),
            )),
        }
    }
}

/// Proof that every guard check may be skipped.
///
/// Only [`Bypass::resolve`] creates one, and only when all of these hold:
/// the binary was compiled with debug assertions, the build mode is
/// [`BuildMode::Development`], and the provider domain is unconfigured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bypass {
    _private: (),
}

impl Bypass {
    pub fn resolve(mode: BuildMode, config: &ProviderConfig) -> Option<Self> {
        if !cfg!(debug_assertions) || mode != BuildMode::Development || !config.is_unconfigured() {
            return None;
        }

        tracing::warn!(
            domain = %config.domain,
            "identity provider not configured; development bypass enabled, all guards will proceed"
        );
        Some(Self { _private: () })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn configured() -> ProviderConfig {
        ProviderConfig::from_lookup(lookup(&[
            (DOMAIN_VAR, "medfac.eu.auth0.com"),
            (CLIENT_ID_VAR, "abc123"),
            (ORIGIN_VAR, "https://admin.medicalfacilities.com"),
        ]))
        .unwrap()
    }

    #[test]
    fn missing_values_take_defaults() {
        let config = ProviderConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ProviderConfig::default());
        assert!(config.is_unconfigured());
    }

    #[test]
    fn empty_domain_counts_as_unconfigured() {
        let config = ProviderConfig::from_lookup(lookup(&[(DOMAIN_VAR, "")])).unwrap();
        assert_eq!(config.domain, PLACEHOLDER_DOMAIN);
        assert!(config.is_unconfigured());
    }

    #[test]
    fn configured_values_are_used() {
        let config = configured();
        assert!(!config.is_unconfigured());
        assert_eq!(config.redirect_uri(), "https://admin.medicalfacilities.com/admin/callback");
        assert_eq!(config.authorize_endpoint(), "https://medfac.eu.auth0.com/authorize");
        assert_eq!(config.audience, DEFAULT_AUDIENCE);
    }

    #[test]
    fn domain_with_scheme_is_rejected() {
        let err = ProviderConfig::from_lookup(lookup(&[(DOMAIN_VAR, "https://medfac.auth0.com")])).unwrap_err();
        assert!(matches!(err, ConfigError::Malformed { key: DOMAIN_VAR, .. }));
    }

    #[test]
    fn blank_client_id_is_rejected() {
        let err = ProviderConfig::from_lookup(lookup(&[(CLIENT_ID_VAR, "   ")])).unwrap_err();
        assert_eq!(err, ConfigError::Empty { key: CLIENT_ID_VAR });
    }

    #[test]
    fn origin_must_be_http_without_trailing_slash() {
        let err = ProviderConfig::from_lookup(lookup(&[(ORIGIN_VAR, "ftp://host")])).unwrap_err();
        assert!(matches!(err, ConfigError::Malformed { key: ORIGIN_VAR, .. }));

        let err = ProviderConfig::from_lookup(lookup(&[(ORIGIN_VAR, "https://host/")])).unwrap_err();
        assert!(matches!(err, ConfigError::Malformed { key: ORIGIN_VAR, .. }));
    }

    #[test]
    fn unknown_build_mode_is_rejected() {
        let err = BuildMode::from_lookup(lookup(&[(BUILD_MODE_VAR, "staging")])).unwrap_err();
        assert!(matches!(err, ConfigError::Malformed { key: BUILD_MODE_VAR, .. }));
        assert_eq!(
            BuildMode::from_lookup(lookup(&[(BUILD_MODE_VAR, "production")])).unwrap(),
            BuildMode::Production
        );
    }

    #[test]
    fn bypass_requires_development_and_unconfigured_domain() {
        let unconfigured = ProviderConfig::default();

        assert!(Bypass::resolve(BuildMode::Production, &unconfigured).is_none());
        assert!(Bypass::resolve(BuildMode::Development, &configured()).is_none());
        assert!(Bypass::resolve(BuildMode::Production, &configured()).is_none());
        assert_eq!(
            Bypass::resolve(BuildMode::Development, &unconfigured).is_some(),
            cfg!(debug_assertions)
        );
    }
}
