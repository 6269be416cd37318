//! GCP Secret Manager gRPC Client
//!
//! Official Google Cloud SDK implementation using gRPC.
//! Uses the [`google-cloud-secretmanager-v1`] crate.
//!
//! Every [`SecretClient`] method maps its request onto the matching SDK call and
//! maps the response back field-for-field. Nothing is retried and no error is
//! reinterpreted: an RPC status becomes [`Error::Status`] with the same code and
//! message, anything else becomes [`Error::Transport`].

use super::{ClientFactory, SecretClient};
use crate::config::SecretManagerConfig;
use crate::error::{Error, Result, StatusCode};
use crate::model::{
    AccessSecretVersionRequest, AccessSecretVersionResponse, AddSecretVersionRequest,
    CreateSecretRequest, DeleteSecretRequest, DestroySecretVersionRequest,
    DisableSecretVersionRequest, EnableSecretVersionRequest, GetSecretRequest,
    GetSecretVersionRequest, ListSecretVersionsRequest, ListSecretVersionsResponse,
    ListSecretsRequest, ListSecretsResponse, Replication, Secret, SecretPayload, SecretVersion,
    VersionState,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use google_cloud_gax::error::rpc::Code;
use google_cloud_secretmanager_v1::client::SecretManagerService;
use google_cloud_secretmanager_v1::model;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info};

pub struct SecretManagerGRPC {
    /// `None` once the client has been closed
    client: RwLock<Option<SecretManagerService>>,
    endpoint: Option<String>,
}

impl std::fmt::Debug for SecretManagerGRPC {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretManagerGRPC")
            .field("endpoint", &self.endpoint)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

impl SecretManagerGRPC {
    /// Create a new `SecretManagerService` client
    ///
    /// Authentication is handled by the Google Cloud SDK through Application
    /// Default Credentials:
    /// - Service account JSON from `GOOGLE_APPLICATION_CREDENTIALS`
    /// - Workload Identity when running in GKE
    /// - Metadata server (for GCE/GKE/Cloud Run)
    ///
    /// # Errors
    /// Returns [`Error::Connect`] if the SDK client cannot be built
    pub async fn new(config: &SecretManagerConfig) -> Result<Self> {
        install_crypto_provider();

        let mut builder = SecretManagerService::builder();
        if let Some(endpoint) = &config.endpoint {
            info!("Routing Secret Manager requests to {}", endpoint);
            builder = builder.with_endpoint(endpoint.clone());
        }

        let client = builder.build().await.map_err(|e| {
            Error::Connect(format!(
                "{e}. Ensure GOOGLE_APPLICATION_CREDENTIALS is set or Workload Identity is configured"
            ))
        })?;

        Ok(Self::from_service(client, config.endpoint.clone()))
    }

    /// Wrap an already built SDK client
    ///
    /// For callers that need their own credentials or client options, e.g. an
    /// emulator with anonymous credentials. `endpoint` is only reported in `Debug`.
    pub fn from_service(client: SecretManagerService, endpoint: Option<String>) -> Self {
        Self {
            client: RwLock::new(Some(client)),
            endpoint,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.client
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    /// Handle for one call; the SDK client is reference counted so this is cheap
    fn client(&self) -> Result<SecretManagerService> {
        self.client
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(Error::Closed)
    }
}

#[async_trait]
impl SecretClient for SecretManagerGRPC {
    async fn create_secret(&self, request: CreateSecretRequest) -> Result<Secret> {
        debug!("CreateSecret {}/secrets/{}", request.parent, request.secret_id);
        self.client()?
            .create_secret()
            .set_parent(request.parent)
            .set_secret_id(request.secret_id)
            .set_secret(to_sdk_secret(request.secret))
            .send()
            .await
            .map(from_sdk_secret)
            .map_err(from_sdk_error)
    }

    async fn get_secret(&self, request: GetSecretRequest) -> Result<Secret> {
        debug!("GetSecret {}", request.name);
        self.client()?
            .get_secret()
            .set_name(request.name)
            .send()
            .await
            .map(from_sdk_secret)
            .map_err(from_sdk_error)
    }

    async fn delete_secret(&self, request: DeleteSecretRequest) -> Result<()> {
        debug!("DeleteSecret {}", request.name);
        self.client()?
            .delete_secret()
            .set_name(request.name)
            .send()
            .await
            .map_err(from_sdk_error)
    }

    async fn add_secret_version(&self, request: AddSecretVersionRequest) -> Result<SecretVersion> {
        debug!("AddSecretVersion {}", request.parent);
        // Secret Manager expects raw bytes; the SDK handles the wire encoding
        let mut payload = model::SecretPayload::default();
        payload.data = request.payload.data.into();

        self.client()?
            .add_secret_version()
            .set_parent(request.parent)
            .set_payload(payload)
            .send()
            .await
            .map(from_sdk_version)
            .map_err(from_sdk_error)
    }

    async fn get_secret_version(&self, request: GetSecretVersionRequest) -> Result<SecretVersion> {
        debug!("GetSecretVersion {}", request.name);
        self.client()?
            .get_secret_version()
            .set_name(request.name)
            .send()
            .await
            .map(from_sdk_version)
            .map_err(from_sdk_error)
    }

    async fn access_secret_version(
        &self,
        request: AccessSecretVersionRequest,
    ) -> Result<AccessSecretVersionResponse> {
        debug!("AccessSecretVersion {}", request.name);
        let response = self
            .client()?
            .access_secret_version()
            .set_name(request.name)
            .send()
            .await
            .map_err(from_sdk_error)?;

        Ok(AccessSecretVersionResponse {
            name: response.name,
            payload: response
                .payload
                .map(|payload| SecretPayload::new(payload.data.to_vec())),
        })
    }

    async fn enable_secret_version(
        &self,
        request: EnableSecretVersionRequest,
    ) -> Result<SecretVersion> {
        debug!("EnableSecretVersion {}", request.name);
        self.client()?
            .enable_secret_version()
            .set_name(request.name)
            .send()
            .await
            .map(from_sdk_version)
            .map_err(from_sdk_error)
    }

    async fn disable_secret_version(
        &self,
        request: DisableSecretVersionRequest,
    ) -> Result<SecretVersion> {
        debug!("DisableSecretVersion {}", request.name);
        self.client()?
            .disable_secret_version()
            .set_name(request.name)
            .send()
            .await
            .map(from_sdk_version)
            .map_err(from_sdk_error)
    }

    async fn destroy_secret_version(
        &self,
        request: DestroySecretVersionRequest,
    ) -> Result<SecretVersion> {
        debug!("DestroySecretVersion {}", request.name);
        self.client()?
            .destroy_secret_version()
            .set_name(request.name)
            .send()
            .await
            .map(from_sdk_version)
            .map_err(from_sdk_error)
    }

    async fn list_secrets(&self, request: ListSecretsRequest) -> Result<ListSecretsResponse> {
        debug!(
            "ListSecrets {} page_token={:?}",
            request.parent, request.page_token
        );
        let response = self
            .client()?
            .list_secrets()
            .set_parent(request.parent)
            .set_page_size(request.page_size)
            .set_page_token(request.page_token)
            .set_filter(request.filter)
            .send()
            .await
            .map_err(from_sdk_error)?;

        Ok(ListSecretsResponse {
            secrets: response.secrets.into_iter().map(from_sdk_secret).collect(),
            next_page_token: response.next_page_token,
            total_size: response.total_size,
        })
    }

    async fn list_secret_versions(
        &self,
        request: ListSecretVersionsRequest,
    ) -> Result<ListSecretVersionsResponse> {
        debug!(
            "ListSecretVersions {} page_token={:?}",
            request.parent, request.page_token
        );
        let response = self
            .client()?
            .list_secret_versions()
            .set_parent(request.parent)
            .set_page_size(request.page_size)
            .set_page_token(request.page_token)
            .set_filter(request.filter)
            .send()
            .await
            .map_err(from_sdk_error)?;

        Ok(ListSecretVersionsResponse {
            versions: response.versions.into_iter().map(from_sdk_version).collect(),
            next_page_token: response.next_page_token,
            total_size: response.total_size,
        })
    }

    async fn close(&self) -> Result<()> {
        let released = self
            .client
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if released.is_some() {
            info!("Closed Secret Manager client");
        }
        Ok(())
    }
}

/// [`ClientFactory`] connecting to Secret Manager over gRPC
#[derive(Debug, Clone)]
pub struct GrpcClientFactory {
    config: SecretManagerConfig,
}

impl GrpcClientFactory {
    pub fn new(config: SecretManagerConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ClientFactory for GrpcClientFactory {
    async fn new_secret_client(&self) -> Result<Arc<dyn SecretClient>> {
        let client = SecretManagerGRPC::new(&self.config).await?;
        Ok(Arc::new(client))
    }
}

/// rustls 0.23+ needs a process-wide provider; keep whatever the host installed
fn install_crypto_provider() {
    if rustls::crypto::CryptoProvider::get_default().is_none() {
        // Another thread may have installed one in the meantime.
        let _ = rustls::crypto::ring::default_provider().install_default();
    }
}

fn from_sdk_error(e: google_cloud_gax::error::Error) -> Error {
    match e.status() {
        Some(status) => Error::Status {
            code: from_sdk_code(&status.code),
            message: status.message.clone(),
        },
        None => Error::Transport(e.to_string()),
    }
}

fn from_sdk_code(code: &Code) -> StatusCode {
    match code {
        Code::Cancelled => StatusCode::Cancelled,
        Code::InvalidArgument => StatusCode::InvalidArgument,
        Code::DeadlineExceeded => StatusCode::DeadlineExceeded,
        Code::NotFound => StatusCode::NotFound,
        Code::AlreadyExists => StatusCode::AlreadyExists,
        Code::PermissionDenied => StatusCode::PermissionDenied,
        Code::ResourceExhausted => StatusCode::ResourceExhausted,
        Code::FailedPrecondition => StatusCode::FailedPrecondition,
        Code::Aborted => StatusCode::Aborted,
        Code::Unimplemented => StatusCode::Unimplemented,
        Code::Internal => StatusCode::Internal,
        Code::Unavailable => StatusCode::Unavailable,
        Code::Unauthenticated => StatusCode::Unauthenticated,
        _ => StatusCode::Other,
    }
}

fn to_sdk_secret(secret: Secret) -> model::Secret {
    let replication = match secret.replication {
        Replication::Automatic => {
            model::Replication::new().set_automatic(model::replication::Automatic::new())
        }
        Replication::UserManaged { locations } => model::Replication::new().set_user_managed(
            model::replication::UserManaged::new().set_replicas(locations.into_iter().map(
                |location| model::replication::user_managed::Replica::new().set_location(location),
            )),
        ),
    };

    model::Secret::new()
        .set_replication(replication)
        .set_labels(secret.labels)
}

fn from_sdk_secret(secret: model::Secret) -> Secret {
    let replication = match secret.replication.and_then(|r| r.replication) {
        Some(model::replication::Replication::UserManaged(user_managed)) => {
            Replication::UserManaged {
                locations: user_managed
                    .replicas
                    .into_iter()
                    .map(|replica| replica.location)
                    .collect(),
            }
        }
        _ => Replication::Automatic,
    };

    Secret {
        name: secret.name,
        replication,
        labels: secret.labels.into_iter().collect(),
        create_time: secret
            .create_time
            .and_then(|ts| to_utc(ts.seconds(), ts.nanos())),
    }
}

fn from_sdk_version(version: model::SecretVersion) -> SecretVersion {
    let state = match version.state {
        model::secret_version::State::Enabled => VersionState::Enabled,
        model::secret_version::State::Disabled => VersionState::Disabled,
        model::secret_version::State::Destroyed => VersionState::Destroyed,
        _ => VersionState::Unspecified,
    };

    SecretVersion {
        name: version.name,
        state,
        create_time: version
            .create_time
            .and_then(|ts| to_utc(ts.seconds(), ts.nanos())),
        destroy_time: version
            .destroy_time
            .and_then(|ts| to_utc(ts.seconds(), ts.nanos())),
    }
}

fn to_utc(seconds: i64, nanos: i32) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(seconds, u32::try_from(nanos).ok()?)
}
