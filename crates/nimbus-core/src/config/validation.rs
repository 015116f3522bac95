//! Configuration validation

use tracing::debug;

use crate::error::{ConfigError, Result};

use super::types::Config;

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    debug!("validating configuration");
    validate_endpoint("cloud.endpoint", &config.cloud.endpoint)?;
    validate_endpoint("emulator.endpoint", &config.emulator.endpoint)?;
    validate_local(config)?;
    validate_compat(config)?;
    debug!("configuration validation passed");
    Ok(())
}

fn validate_endpoint(field: &str, endpoint: &str) -> Result<()> {
    if !(endpoint.starts_with("https://") || endpoint.starts_with("http://")) {
        return Err(ConfigError::invalid(field, "must be an http(s) URL").into());
    }
    Ok(())
}

fn validate_local(config: &Config) -> Result<()> {
    if config.local.command.trim().is_empty() {
        return Err(ConfigError::invalid("local.command", "command cannot be empty").into());
    }
    Ok(())
}

fn validate_compat(config: &Config) -> Result<()> {
    let prerelease = semver::Version::parse(&config.compat.prerelease_threshold)
        .map_err(|e| ConfigError::invalid("compat.prerelease_threshold", e.to_string()))?;
    if prerelease.pre.is_empty() {
        return Err(ConfigError::invalid(
            "compat.prerelease_threshold",
            "must carry a prerelease component",
        )
        .into());
    }

    semver::Version::parse(&config.compat.stable_threshold)
        .map_err(|e| ConfigError::invalid("compat.stable_threshold", e.to_string()))?;

    Ok(())
}
