//! # Model
//!
//! Value types mirroring the Secret Manager v1 messages.
//!
//! These are what the [`SecretClient`](crate::client::SecretClient) trait speaks,
//! so the mock adapter and the tests never depend on the SDK's generated types.
//! The gRPC adapter converts field-for-field in both directions.

use crate::paths;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Replication policy of a secret
///
/// Secrets created by this crate always use [`Replication::Automatic`].
/// `UserManaged` only appears when reading secrets created elsewhere.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Replication {
    #[default]
    Automatic,
    UserManaged {
        locations: Vec<String>,
    },
}

/// A secret: a named container of versions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Secret {
    /// `projects/{project}/secrets/{secret}`, empty on create requests
    pub name: String,
    pub replication: Replication,
    pub labels: HashMap<String, String>,
    pub create_time: Option<DateTime<Utc>>,
}

/// Lifecycle state of a secret version
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum VersionState {
    #[default]
    Unspecified,
    Enabled,
    Disabled,
    /// Payload is gone for good; the metadata record remains
    Destroyed,
}

impl VersionState {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            VersionState::Unspecified => "STATE_UNSPECIFIED",
            VersionState::Enabled => "ENABLED",
            VersionState::Disabled => "DISABLED",
            VersionState::Destroyed => "DESTROYED",
        }
    }
}

/// Metadata of one secret version
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecretVersion {
    /// `projects/{project}/secrets/{secret}/versions/{version}`
    pub name: String,
    pub state: VersionState,
    pub create_time: Option<DateTime<Utc>>,
    pub destroy_time: Option<DateTime<Utc>>,
}

impl SecretVersion {
    /// Trailing version segment of [`SecretVersion::name`] (e.g. `"3"`)
    #[must_use]
    pub fn version_id(&self) -> Option<String> {
        paths::parse_version_name(&self.name).map(|name| name.version)
    }
}

/// Secret data attached to exactly one version
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SecretPayload {
    pub data: Vec<u8>,
}

impl SecretPayload {
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self { data: data.into() }
    }
}

// Payload bytes are never written to logs.
impl std::fmt::Debug for SecretPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretPayload")
            .field("data", &format_args!("<{} bytes>", self.data.len()))
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateSecretRequest {
    /// `projects/{project}`
    pub parent: String,
    pub secret_id: String,
    pub secret: Secret,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetSecretRequest {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteSecretRequest {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddSecretVersionRequest {
    /// `projects/{project}/secrets/{secret}`
    pub parent: String,
    pub payload: SecretPayload,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetSecretVersionRequest {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessSecretVersionRequest {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessSecretVersionResponse {
    /// Resolved version name; `latest` is replaced by the concrete version
    pub name: String,
    pub payload: Option<SecretPayload>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnableSecretVersionRequest {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisableSecretVersionRequest {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DestroySecretVersionRequest {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListSecretsRequest {
    /// `projects/{project}`
    pub parent: String,
    /// 0 lets the backend pick
    pub page_size: i32,
    /// Empty for the first page
    pub page_token: String,
    /// Backend filter expression, empty for none
    pub filter: String,
}

/// One page of secrets
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListSecretsResponse {
    pub secrets: Vec<Secret>,
    /// Empty when this is the last page
    pub next_page_token: String,
    pub total_size: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListSecretVersionsRequest {
    /// `projects/{project}/secrets/{secret}`
    pub parent: String,
    pub page_size: i32,
    pub page_token: String,
    pub filter: String,
}

/// One page of secret versions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListSecretVersionsResponse {
    pub versions: Vec<SecretVersion>,
    pub next_page_token: String,
    pub total_size: i32,
}
