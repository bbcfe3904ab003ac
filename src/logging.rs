//! Logging setup for the command-line tool.
//!
//! ```no_run
//! use recipe_checks::logging;
//!
//! // Initialize once at startup
//! logging::init("info").expect("Failed to initialize logging");
//!
//! tracing::info!("recipe loaded");
//! ```

use anyhow::{Context as _, Result};
use tracing_subscriber::{EnvFilter, fmt};

/// Install a stderr subscriber at `level`.
///
/// `RUST_LOG`, when set, takes precedence over `level`.
///
/// # Errors
///
/// Returns error if `level` is not a valid filter directive or a global
/// subscriber is already installed.
pub fn init(level: &str) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .with_context(|| format!("Invalid log level '{level}'"))?;

    fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install log subscriber: {e}"))?;

    tracing::debug!("Logging initialized at level {level}");
    Ok(())
}
