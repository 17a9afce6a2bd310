use anyhow::Context;

use medfac_auth::{BuildMode, IdentitySnapshot, ProviderConfig};
use medfac_console::app::{IDENTITY_FILE_VAR, LOG_FORMAT_VAR};
use medfac_observability::LogFormat;

/// Evaluate each path given on the command line and print one JSON outcome per
/// line.
///
/// The identity comes from the JSON file named by `MEDFAC_IDENTITY_FILE`;
/// without it the user is signed out.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let format = std::env::var(LOG_FORMAT_VAR)
        .map(|v| LogFormat::parse(&v))
        .unwrap_or_default();
    medfac_observability::init_with(format);

    let config = ProviderConfig::from_env().context("invalid identity provider configuration")?;
    let mode = BuildMode::from_env()?;

    let identity = match std::env::var(IDENTITY_FILE_VAR) {
        Ok(path) => medfac_console::load_identity(path.as_ref())?,
        Err(_) => {
            tracing::info!("{} not set; navigating signed out", IDENTITY_FILE_VAR);
            IdentitySnapshot::signed_out()
        }
    };

    let console = medfac_console::build_console(&config, mode, identity);

    let targets: Vec<String> = std::env::args().skip(1).collect();
    if targets.is_empty() {
        tracing::warn!("no paths given; usage: medfac-console <path>...");
    }

    for target in targets {
        let outcome = console.navigator.navigate(&target).await;
        let line = serde_json::json!({ "request": target, "result": outcome });
        println!("{}", line);
    }

    Ok(())
}
