//! # Constants
//!
//! Shared constants used throughout the crate.
//!
//! Defaults here can be overridden through [`crate::config::SecretManagerConfig`]
//! where applicable.

/// Version alias resolved by the backend to the newest enabled version
pub const LATEST_VERSION: &str = "latest";

/// Provider label attached to metrics
pub const PROVIDER: &str = "gcp";

/// Default number of items requested per list page
pub const DEFAULT_LIST_PAGE_SIZE: i32 = 100;

/// Default global log level
pub const DEFAULT_LOG_LEVEL: &str = "INFO";

/// Default log format (json, text)
pub const DEFAULT_LOG_FORMAT: &str = "text";

/// Environment variable holding the project id
pub const ENV_PROJECT_ID: &str = "GCP_PROJECT_ID";

/// Fallback environment variable for the project id (set by gcloud tooling)
pub const ENV_PROJECT_ID_FALLBACK: &str = "GOOGLE_CLOUD_PROJECT";

/// Environment variable overriding the Secret Manager endpoint
pub const ENV_ENDPOINT: &str = "GCP_SECRET_MANAGER_ENDPOINT";

/// Environment variable for the list page size
pub const ENV_PAGE_SIZE: &str = "SECRET_MANAGER_PAGE_SIZE";
