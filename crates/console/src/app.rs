//! Console wiring: configuration, identity provider, guard context and
//! navigator.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use medfac_auth::{
    BuildMode, Bypass, GuardContext, IdentityProvider, IdentityPublisher, IdentitySnapshot, InMemoryIdentityProvider,
    ProviderConfig,
};

use crate::navigator::Navigator;
use crate::routes::RouteTable;

/// Environment variable naming a JSON identity snapshot for the CLI.
pub const IDENTITY_FILE_VAR: &str = "MEDFAC_IDENTITY_FILE";

/// Environment variable selecting the log output format (`json` or `pretty`).
pub const LOG_FORMAT_VAR: &str = "MEDFAC_LOG_FORMAT";

/// A wired console: the navigator plus the handle that drives identity state.
pub struct Console {
    pub navigator: Arc<Navigator>,
    pub identity: IdentityPublisher,
}

/// Build the navigator over [`RouteTable::admin`].
///
/// `provider` is `None` when no identity client could be created; every
/// navigation is then treated as signed out.
pub fn build_navigator(
    config: &ProviderConfig,
    mode: BuildMode,
    provider: Option<Arc<dyn IdentityProvider>>,
) -> Navigator {
    let context = match provider {
        Some(provider) => GuardContext::new(provider, config),
        None => GuardContext::without_provider(config),
    };
    let context = context.with_bypass(Bypass::resolve(mode, config));

    tracing::info!(
        domain = %config.domain,
        mode = ?mode,
        bypass = context.is_bypassed(),
        "console navigator ready"
    );

    Navigator::new(Arc::new(RouteTable::admin()), context)
}

/// Build a console backed by the in-memory identity provider.
pub fn build_console(config: &ProviderConfig, mode: BuildMode, initial: IdentitySnapshot) -> Console {
    let (identity, provider) = InMemoryIdentityProvider::channel(config, initial);
    let navigator = build_navigator(config, mode, Some(Arc::new(provider)));
    Console {
        navigator: Arc::new(navigator),
        identity,
    }
}

/// Read an identity snapshot from a JSON file.
///
/// Accepts either a full snapshot (`is_loading`, `is_authenticated`, `user`)
/// or bare user claims, which are taken as a signed-in user.
pub fn load_identity(path: &Path) -> anyhow::Result<IdentitySnapshot> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read identity file at {:?}", path))?;
    parse_identity(&raw).with_context(|| format!("invalid identity file at {:?}", path))
}

fn parse_identity(raw: &str) -> anyhow::Result<IdentitySnapshot> {
    let value: serde_json::Value = serde_json::from_str(raw)?;
    let is_snapshot = value
        .as_object()
        .is_some_and(|o| o.contains_key("is_authenticated") || o.contains_key("is_loading"));

    if is_snapshot {
        Ok(serde_json::from_value(value)?)
    } else {
        Ok(IdentitySnapshot::signed_in(serde_json::from_value(value)?))
    }
}
