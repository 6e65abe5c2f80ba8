//! Effective configuration for one invocation: the shared config file
//! and `DOCBOT_*` environment, with command-line flags on top.

use docbot_config::{Config, load_config};
use docbot_core::DashboardConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Load the config file and apply `--api-url` / `--timeout`.
pub fn effective_config(global: &GlobalOpts) -> Result<Config, CliError> {
    let mut cfg = load_config()?;
    if let Some(ref url) = global.api_url {
        cfg.api_url.clone_from(url);
    }
    if let Some(timeout) = global.timeout {
        cfg.timeout = timeout;
    }
    Ok(cfg)
}

/// Build the core's runtime configuration for this invocation.
pub fn dashboard_config(global: &GlobalOpts) -> Result<DashboardConfig, CliError> {
    let cfg = effective_config(global)?;
    tracing::debug!(api_url = %cfg.api_url, timeout = cfg.timeout, "resolved configuration");
    Ok(cfg.to_dashboard_config()?)
}
