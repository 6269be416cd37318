//! # Configuration
//!
//! Process-wide settings, loaded once before the first client is built.
//!
//! Only the project id is required. Everything else has a default and can be
//! overridden via environment variables:
//!
//! - `GCP_PROJECT_ID` (or `GOOGLE_CLOUD_PROJECT`) - project owning the secrets
//! - `GCP_SECRET_MANAGER_ENDPOINT` - endpoint override (emulators, private endpoints)
//! - `SECRET_MANAGER_PAGE_SIZE` - page size for list calls
//! - `LOG_LEVEL` - ERROR, WARN, INFO, DEBUG, TRACE
//! - `LOG_FORMAT` - json, text

use crate::constants::{
    DEFAULT_LIST_PAGE_SIZE, DEFAULT_LOG_FORMAT, DEFAULT_LOG_LEVEL, ENV_ENDPOINT, ENV_PAGE_SIZE,
    ENV_PROJECT_ID, ENV_PROJECT_ID_FALLBACK,
};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretManagerConfig {
    pub project_id: String,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default = "default_list_page_size")]
    pub list_page_size: i32,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

fn default_list_page_size() -> i32 {
    DEFAULT_LIST_PAGE_SIZE
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_log_format() -> String {
    DEFAULT_LOG_FORMAT.to_string()
}

impl SecretManagerConfig {
    /// Configuration for `project_id` with every other setting at its default
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            endpoint: None,
            list_page_size: DEFAULT_LIST_PAGE_SIZE,
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }

    /// Load configuration from environment variables with defaults
    ///
    /// # Errors
    /// Returns [`Error::Config`] when no project id is set
    pub fn from_env() -> Result<Self> {
        let project_id = env_var_non_empty(ENV_PROJECT_ID)
            .or_else(|| env_var_non_empty(ENV_PROJECT_ID_FALLBACK))
            .ok_or_else(|| {
                Error::Config(format!(
                    "project id is not set; set {ENV_PROJECT_ID} or {ENV_PROJECT_ID_FALLBACK}"
                ))
            })?;

        Ok(Self {
            project_id,
            endpoint: env_var_non_empty(ENV_ENDPOINT),
            list_page_size: env_var_or_default(ENV_PAGE_SIZE, DEFAULT_LIST_PAGE_SIZE),
            log_level: env_var_or_default_str("LOG_LEVEL", DEFAULT_LOG_LEVEL),
            log_format: env_var_or_default_str("LOG_FORMAT", DEFAULT_LOG_FORMAT),
        })
    }

    /// Builder-style endpoint override
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }
}

/// Read environment variable or return default value
fn env_var_or_default<T: std::str::FromStr>(key: &str, default: T) -> T
where
    <T as std::str::FromStr>::Err: std::fmt::Debug,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Read environment variable as string or return default
fn env_var_or_default_str(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_var_non_empty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
