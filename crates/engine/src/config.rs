//! Engine configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `CHECKOUT_TIMEOUT_SECS` - Deadline for each blocking I/O call inside
//!   checkout (default: 10; must be a positive integer)

use std::time::Duration;

use thiserror::Error;

const CHECKOUT_TIMEOUT_VAR: &str = "CHECKOUT_TIMEOUT_SECS";
const DEFAULT_CHECKOUT_TIMEOUT_SECS: u64 = 10;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Deadline applied to each catalog read and order-store write inside
    /// checkout. Expiry rejects the checkout with `Timeout`, cart untouched.
    pub checkout_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            checkout_timeout: Duration::from_secs(DEFAULT_CHECKOUT_TIMEOUT_SECS),
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEnvVar`] if a variable is set but
    /// unparseable.
    pub fn from_env() -> Result<Self, ConfigError> {
        let checkout_timeout = match std::env::var(CHECKOUT_TIMEOUT_VAR) {
            Ok(raw) => parse_timeout_secs(&raw)?,
            Err(_) => Duration::from_secs(DEFAULT_CHECKOUT_TIMEOUT_SECS),
        };
        Ok(Self { checkout_timeout })
    }
}

fn parse_timeout_secs(raw: &str) -> Result<Duration, ConfigError> {
    let secs: u64 = raw.trim().parse().map_err(|_| {
        ConfigError::InvalidEnvVar(
            CHECKOUT_TIMEOUT_VAR.to_owned(),
            format!("expected a positive integer, got {raw:?}"),
        )
    })?;
    if secs == 0 {
        return Err(ConfigError::InvalidEnvVar(
            CHECKOUT_TIMEOUT_VAR.to_owned(),
            "timeout must be at least 1 second".to_owned(),
        ));
    }
    Ok(Duration::from_secs(secs))
}
