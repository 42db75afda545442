//! Helpers shared by command handlers

use anyhow::{Context, Result};
use aysa_core::config::AysaConfig;
use aysa_registry::RegistryOperations;
use camino::Utf8Path;
use dialoguer::Confirm;
use tracing::debug;

use crate::output;

/// Load the configuration file selected with `-E`, `AYSA_CONFIG` or the default path
pub fn load_config(env: Option<&Utf8Path>) -> Result<AysaConfig> {
    let config = AysaConfig::load(env).context("Failed to load configuration")?;
    debug!("Using configuration {}", config.config_path);
    Ok(config)
}

/// Registry operations for the configured registry and namespace
pub fn registry_operations(config: &AysaConfig) -> Result<RegistryOperations> {
    let settings = config.registry()?;
    debug!("Registry settings: {:?}", settings);
    RegistryOperations::new(settings, config.release().clone())
        .with_context(|| format!("Failed to create a client for {}", settings.host))
}

/// Ask for confirmation unless `yes` was given
///
/// Returns `false` (after printing "Cancelled") when the user declines.
pub fn confirm(prompt: &str, yes: bool) -> Result<bool> {
    if yes {
        return Ok(true);
    }

    let confirmed = Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()?;

    if !confirmed {
        output::info("Cancelled");
    }
    Ok(confirmed)
}
