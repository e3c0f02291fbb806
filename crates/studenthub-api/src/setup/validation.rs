//! Configuration validation
//!
//! Validates critical configuration values at startup to catch misconfigurations early.

use anyhow::Result;
use studenthub_core::Config;

/// Validate critical configuration values
///
/// Runs the config's own checks, then the ones that only matter for the HTTP
/// server.
pub fn validate_config(config: &Config) -> Result<()> {
    config.validate()?;

    let is_production = config.is_production();
    let env_var = std::env::var("ENVIRONMENT")
        .or_else(|_| std::env::var("APP_ENV"))
        .ok();

    if is_production && env_var.is_none() {
        tracing::warn!(
            "Production mode detected but ENVIRONMENT/APP_ENV not set - error details may leak"
        );
    }

    if is_production && config.cors_origins().iter().any(|o| o == "*") {
        return Err(anyhow::anyhow!(
            "CORS configured to allow all origins (*) in production. \
            Set specific allowed origins via the CORS_ORIGINS environment variable."
        ));
    }

    if config.session_ttl() < config.session_sweep_interval() {
        tracing::warn!(
            session_ttl_secs = config.session_ttl().as_secs(),
            sweep_interval_secs = config.session_sweep_interval().as_secs(),
            "Session TTL is shorter than the sweep interval; expired files may stay on disk until the next pass"
        );
    }

    Ok(())
}
