//! # Logging
//!
//! `tracing` subscriber setup for applications embedding this crate.
//!
//! The library itself only emits events and spans; installing a subscriber is
//! the host's choice. [`init_logging`] is the default setup: `RUST_LOG` wins,
//! otherwise the configured level applies to this crate.

use crate::config::SecretManagerConfig;
use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

/// Build the filter used when `RUST_LOG` is not set
pub fn default_filter(log_level: &str) -> String {
    format!("gcp_secret_manager={}", log_level.to_lowercase())
}

/// Install the global tracing subscriber
///
/// Uses JSON output when `log_format` is `json`, plain text otherwise.
///
/// # Errors
/// Returns an error if a global subscriber is already installed
pub fn init_logging(config: &SecretManagerConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(&config.log_level)));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let installed = if config.log_format.eq_ignore_ascii_case("json") {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    installed.map_err(|e| anyhow!("Failed to install tracing subscriber: {e}"))
}
