//! # Secret Manager Clients
//!
//! The capability trait every Secret Manager call goes through, and its two
//! implementations:
//! - **gRPC Client**: Official Google Cloud SDK using gRPC ([`SecretManagerGRPC`])
//! - **Mock Client**: Closure-driven test double ([`MockSecretClient`])
//!
//! Application code depends on `Arc<dyn SecretClient>` only, never on a
//! concrete client, so the two stay interchangeable.

use crate::error::Result;
use crate::model::{
    AccessSecretVersionRequest, AccessSecretVersionResponse, AddSecretVersionRequest,
    CreateSecretRequest, DeleteSecretRequest, DestroySecretVersionRequest,
    DisableSecretVersionRequest, EnableSecretVersionRequest, GetSecretRequest,
    GetSecretVersionRequest, ListSecretVersionsRequest, ListSecretVersionsResponse,
    ListSecretsRequest, ListSecretsResponse, Secret, SecretVersion,
};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

pub mod common;
pub mod grpc;
pub mod mock;

pub use grpc::{GrpcClientFactory, SecretManagerGRPC};
pub use mock::{MockClientFactory, MockSecretClient};

/// Remote operations exposed by [`SecretClient`]
///
/// Used as the metrics label, in tracing spans and to name unassigned mock slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateSecret,
    GetSecret,
    DeleteSecret,
    AddSecretVersion,
    GetSecretVersion,
    AccessSecretVersion,
    EnableSecretVersion,
    DisableSecretVersion,
    DestroySecretVersion,
    ListSecrets,
    ListSecretVersions,
}

impl Operation {
    pub const ALL: [Operation; 11] = [
        Operation::CreateSecret,
        Operation::GetSecret,
        Operation::DeleteSecret,
        Operation::AddSecretVersion,
        Operation::GetSecretVersion,
        Operation::AccessSecretVersion,
        Operation::EnableSecretVersion,
        Operation::DisableSecretVersion,
        Operation::DestroySecretVersion,
        Operation::ListSecrets,
        Operation::ListSecretVersions,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::CreateSecret => "create_secret",
            Operation::GetSecret => "get_secret",
            Operation::DeleteSecret => "delete_secret",
            Operation::AddSecretVersion => "add_secret_version",
            Operation::GetSecretVersion => "get_secret_version",
            Operation::AccessSecretVersion => "access_secret_version",
            Operation::EnableSecretVersion => "enable_secret_version",
            Operation::DisableSecretVersion => "disable_secret_version",
            Operation::DestroySecretVersion => "destroy_secret_version",
            Operation::ListSecrets => "list_secrets",
            Operation::ListSecretVersions => "list_secret_versions",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capability trait for Secret Manager
///
/// One method per backend RPC. Each takes the request value and returns the
/// backend's answer or error unchanged. List methods return a single page;
/// [`SecretManager`](crate::secrets::SecretManager) turns pages into a lazy stream.
#[async_trait]
pub trait SecretClient: Send + Sync {
    /// Fails with `ALREADY_EXISTS` when the secret id is taken
    async fn create_secret(&self, request: CreateSecretRequest) -> Result<Secret>;

    async fn get_secret(&self, request: GetSecretRequest) -> Result<Secret>;

    /// Deletes the secret together with all of its versions
    async fn delete_secret(&self, request: DeleteSecretRequest) -> Result<()>;

    async fn add_secret_version(&self, request: AddSecretVersionRequest) -> Result<SecretVersion>;

    /// Version metadata, without the payload
    async fn get_secret_version(&self, request: GetSecretVersionRequest) -> Result<SecretVersion>;

    async fn access_secret_version(
        &self,
        request: AccessSecretVersionRequest,
    ) -> Result<AccessSecretVersionResponse>;

    async fn enable_secret_version(
        &self,
        request: EnableSecretVersionRequest,
    ) -> Result<SecretVersion>;

    async fn disable_secret_version(
        &self,
        request: DisableSecretVersionRequest,
    ) -> Result<SecretVersion>;

    /// Fails with `FAILED_PRECONDITION` when the version is already destroyed
    async fn destroy_secret_version(
        &self,
        request: DestroySecretVersionRequest,
    ) -> Result<SecretVersion>;

    async fn list_secrets(&self, request: ListSecretsRequest) -> Result<ListSecretsResponse>;

    async fn list_secret_versions(
        &self,
        request: ListSecretVersionsRequest,
    ) -> Result<ListSecretVersionsResponse>;

    /// Release the underlying transport
    ///
    /// Safe to call any number of times; only the first call releases anything.
    async fn close(&self) -> Result<()>;
}

/// Creates [`SecretClient`]s
///
/// The real factory connects to Secret Manager; tests swap in
/// [`MockClientFactory`] to hand out a prepared mock instead.
#[async_trait]
pub trait ClientFactory: Send + Sync {
    async fn new_secret_client(&self) -> Result<Arc<dyn SecretClient>>;
}
