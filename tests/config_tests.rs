//! # Configuration Tests
//!
//! Environment loading for [`SecretManagerConfig`]. Everything lives in one test
//! because the process environment is shared between test threads.

use gcp_secret_manager::{Error, SecretManagerConfig};

const VARIABLES: [&str; 6] = [
    "GCP_PROJECT_ID",
    "GOOGLE_CLOUD_PROJECT",
    "GCP_SECRET_MANAGER_ENDPOINT",
    "SECRET_MANAGER_PAGE_SIZE",
    "LOG_LEVEL",
    "LOG_FORMAT",
];

fn clear_env() {
    for key in VARIABLES {
        std::env::remove_var(key);
    }
}

fn set_env(key: &str, value: &str) {
    std::env::set_var(key, value);
}

#[test]
fn test_from_env() {
    clear_env();

    // No project id at all
    let err = SecretManagerConfig::from_env().expect_err("project id is required");
    assert!(matches!(err, Error::Config(_)));

    // Blank values do not count
    set_env("GCP_PROJECT_ID", "   ");
    assert!(SecretManagerConfig::from_env().is_err());

    // Fallback variable
    set_env("GOOGLE_CLOUD_PROJECT", "fallback-project");
    let config = SecretManagerConfig::from_env().expect("fallback project id");
    assert_eq!(config.project_id, "fallback-project");
    assert_eq!(config, SecretManagerConfig::new("fallback-project"));

    // Primary variable wins, overrides are applied
    set_env("GCP_PROJECT_ID", "primary-project");
    set_env("GCP_SECRET_MANAGER_ENDPOINT", "http://localhost:8085");
    set_env("SECRET_MANAGER_PAGE_SIZE", "250");
    set_env("LOG_LEVEL", "DEBUG");
    set_env("LOG_FORMAT", "json");
    let config = SecretManagerConfig::from_env().expect("full config");
    assert_eq!(config.project_id, "primary-project");
    assert_eq!(config.endpoint.as_deref(), Some("http://localhost:8085"));
    assert_eq!(config.list_page_size, 250);
    assert_eq!(config.log_level, "DEBUG");
    assert_eq!(config.log_format, "json");

    // Unparseable page size falls back to the default
    set_env("SECRET_MANAGER_PAGE_SIZE", "lots");
    let config = SecretManagerConfig::from_env().expect("config");
    assert_eq!(config.list_page_size, 100);

    clear_env();
}
