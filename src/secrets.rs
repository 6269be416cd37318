//! # Secret Operations
//!
//! [`SecretManager`] is the application-facing API. Each method builds the
//! canonical resource name through [`crate::paths`], issues one or two calls on
//! the injected [`SecretClient`], and returns the result.
//!
//! ```rust,no_run
//! # async fn run() -> gcp_secret_manager::error::Result<()> {
//! use gcp_secret_manager::{SecretManager, SecretManagerConfig};
//!
//! let manager = SecretManager::from_config(&SecretManagerConfig::from_env()?).await?;
//! manager.create_secret_with_data("db-password", "s3cr3t").await?;
//! let payload = manager.get_secret("db-password", "").await?;
//! assert_eq!(payload.data, b"s3cr3t");
//! manager.close().await?;
//! # Ok(())
//! # }
//! ```

use crate::client::common::OperationTracker;
use crate::client::{ClientFactory, GrpcClientFactory, Operation, SecretClient};
use crate::config::SecretManagerConfig;
use crate::constants::DEFAULT_LIST_PAGE_SIZE;
use crate::error::{Error, Result};
use crate::model::{
    AccessSecretVersionRequest, AddSecretVersionRequest, CreateSecretRequest, DeleteSecretRequest,
    DestroySecretVersionRequest, DisableSecretVersionRequest, EnableSecretVersionRequest,
    GetSecretRequest, GetSecretVersionRequest, ListSecretVersionsRequest, ListSecretsRequest,
    Replication, Secret, SecretPayload, SecretVersion,
};
use crate::observability::metrics;
use crate::paths;
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tracing::{field::Empty, info, info_span, warn, Instrument};

/// Secret operations for one project
///
/// Holds a shared client handle and the project id. The client is never cloned,
/// only its `Arc`, so every operation (and every list stream) talks to the same
/// transport.
#[derive(Clone)]
pub struct SecretManager {
    client: Arc<dyn SecretClient>,
    project_id: String,
    page_size: i32,
}

impl std::fmt::Debug for SecretManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretManager")
            .field("project_id", &self.project_id)
            .field("page_size", &self.page_size)
            .finish_non_exhaustive()
    }
}

impl SecretManager {
    pub fn new(client: Arc<dyn SecretClient>, project_id: impl Into<String>) -> Self {
        Self {
            client,
            project_id: project_id.into(),
            page_size: DEFAULT_LIST_PAGE_SIZE,
        }
    }

    /// Page size requested from the backend by the list streams
    pub fn with_page_size(mut self, page_size: i32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Connect to Secret Manager over gRPC
    ///
    /// # Errors
    /// Returns [`Error::Connect`] if the client cannot be built
    pub async fn from_config(config: &SecretManagerConfig) -> Result<Self> {
        Self::from_factory(&GrpcClientFactory::new(config.clone()), config).await
    }

    /// Build the client through `factory`; tests pass a mock factory here
    pub async fn from_factory(
        factory: &dyn ClientFactory,
        config: &SecretManagerConfig,
    ) -> Result<Self> {
        let client = factory.new_secret_client().await?;
        Ok(Self::new(client, config.project_id.clone()).with_page_size(config.list_page_size))
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn client(&self) -> &Arc<dyn SecretClient> {
        &self.client
    }

    /// Whether `secret` exists
    ///
    /// Any failure of the lookup reads as `false`: a permission or transport
    /// error is indistinguishable from a missing secret here. Use
    /// [`SecretManager::try_secret_exists`] when the difference matters.
    pub async fn secret_exists(&self, secret: &str) -> bool {
        self.fetch_secret(secret).await.is_ok()
    }

    /// Whether `secret` exists, with errors other than `NOT_FOUND` returned to the caller
    pub async fn try_secret_exists(&self, secret: &str) -> Result<bool> {
        match self.fetch_secret(secret).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Create `secret` with automatic replication and no versions
    ///
    /// # Errors
    /// Returns [`Error::AlreadyExists`] without calling create when the
    /// existence check finds the secret.
    pub async fn create_empty_secret(&self, secret: &str) -> Result<Secret> {
        self.create_empty_secret_with_labels(secret, HashMap::new())
            .await
    }

    /// [`SecretManager::create_empty_secret`] with labels attached to the secret
    pub async fn create_empty_secret_with_labels(
        &self,
        secret: &str,
        labels: HashMap<String, String>,
    ) -> Result<Secret> {
        self.ensure_absent(secret).await?;
        self.create(secret, labels).await
    }

    /// Create `secret` and add `payload` as its first version
    ///
    /// If adding the version fails the empty secret is deleted again on a best
    /// effort basis and [`Error::PartialCreate`] is returned; its `cleanup`
    /// field is set when that delete failed too and the secret was left behind.
    pub async fn create_secret_with_data(
        &self,
        secret: &str,
        payload: impl Into<Vec<u8>>,
    ) -> Result<SecretVersion> {
        self.ensure_absent(secret).await?;
        self.create(secret, HashMap::new()).await?;

        match self.add_version(secret, SecretPayload::new(payload)).await {
            Ok(version) => Ok(version),
            Err(source) => {
                let name = paths::secret_name(&self.project_id, secret);
                warn!(
                    "Failed to add first version to {}: {}; deleting the empty secret",
                    name, source
                );
                let cleanup = self.delete(secret).await.err();
                if let Some(cleanup_error) = &cleanup {
                    warn!("Secret {} left without versions: {}", name, cleanup_error);
                }
                Err(Error::PartialCreate {
                    secret: name,
                    source: Box::new(source),
                    cleanup: cleanup.map(Box::new),
                })
            }
        }
    }

    /// Add `payload` as a new version of an existing secret
    pub async fn add_new_secret_version(
        &self,
        secret: &str,
        payload: impl Into<Vec<u8>>,
    ) -> Result<SecretVersion> {
        self.add_version(secret, SecretPayload::new(payload)).await
    }

    /// Payload of `version` (empty means `latest`)
    pub async fn get_secret(&self, secret: &str, version: &str) -> Result<SecretPayload> {
        let name = paths::version_name(&self.project_id, secret, version);
        let request = AccessSecretVersionRequest { name: name.clone() };
        let response = tracked(
            Operation::AccessSecretVersion,
            &name,
            self.client.access_secret_version(request),
        )
        .await?;
        response.payload.ok_or(Error::MissingPayload(name))
    }

    /// Metadata of `version` without its payload
    pub async fn get_secret_metadata(&self, secret: &str, version: &str) -> Result<SecretVersion> {
        let name = paths::version_name(&self.project_id, secret, version);
        let request = GetSecretVersionRequest { name: name.clone() };
        tracked(
            Operation::GetSecretVersion,
            &name,
            self.client.get_secret_version(request),
        )
        .await
    }

    pub async fn enable_secret(&self, secret: &str, version: &str) -> Result<SecretVersion> {
        let name = paths::version_name(&self.project_id, secret, version);
        info!("Enabling secret version {}", name);
        let request = EnableSecretVersionRequest { name: name.clone() };
        tracked(
            Operation::EnableSecretVersion,
            &name,
            self.client.enable_secret_version(request),
        )
        .await
    }

    pub async fn disable_secret(&self, secret: &str, version: &str) -> Result<SecretVersion> {
        let name = paths::version_name(&self.project_id, secret, version);
        info!("Disabling secret version {}", name);
        let request = DisableSecretVersionRequest { name: name.clone() };
        tracked(
            Operation::DisableSecretVersion,
            &name,
            self.client.disable_secret_version(request),
        )
        .await
    }

    /// Destroy `version`; its payload is gone for good, the metadata stays
    pub async fn delete_secret_version(
        &self,
        secret: &str,
        version: &str,
    ) -> Result<SecretVersion> {
        let name = paths::version_name(&self.project_id, secret, version);
        info!("Destroying secret version {}", name);
        let request = DestroySecretVersionRequest { name: name.clone() };
        tracked(
            Operation::DestroySecretVersion,
            &name,
            self.client.destroy_secret_version(request),
        )
        .await
    }

    /// Delete `secret`; the backend deletes all of its versions with it
    pub async fn delete_secret_and_versions(&self, secret: &str) -> Result<()> {
        self.delete(secret).await?;
        info!(
            "Secret {} deleted successfully",
            paths::secret_name(&self.project_id, secret)
        );
        Ok(())
    }

    /// Lazily list every secret in the project
    ///
    /// Pages are fetched as the stream is polled. Each call starts again from
    /// the first page.
    pub fn list_secrets(&self) -> BoxStream<'static, Result<Secret>> {
        self.list_secrets_filtered("")
    }

    /// [`SecretManager::list_secrets`] restricted by a backend filter expression
    /// (e.g. `labels.team=payments`)
    pub fn list_secrets_filtered(
        &self,
        filter: impl Into<String>,
    ) -> BoxStream<'static, Result<Secret>> {
        let client = Arc::clone(&self.client);
        let parent = paths::project_name(&self.project_id);
        let page_size = self.page_size;
        let filter = filter.into();

        paginate(move |page_token| {
            let client = Arc::clone(&client);
            let request = ListSecretsRequest {
                parent: parent.clone(),
                page_size,
                page_token,
                filter: filter.clone(),
            };
            async move {
                let parent = request.parent.clone();
                let page = tracked(
                    Operation::ListSecrets,
                    &parent,
                    client.list_secrets(request),
                )
                .await?;
                Ok::<_, Error>((page.secrets, page.next_page_token))
            }
        })
    }

    /// Lazily list every version of `secret`, newest first as returned by the backend
    pub fn list_secret_versions(&self, secret: &str) -> BoxStream<'static, Result<SecretVersion>> {
        let client = Arc::clone(&self.client);
        let parent = paths::secret_name(&self.project_id, secret);
        let page_size = self.page_size;

        paginate(move |page_token| {
            let client = Arc::clone(&client);
            let request = ListSecretVersionsRequest {
                parent: parent.clone(),
                page_size,
                page_token,
                filter: String::new(),
            };
            async move {
                let parent = request.parent.clone();
                let page = tracked(
                    Operation::ListSecretVersions,
                    &parent,
                    client.list_secret_versions(request),
                )
                .await?;
                Ok::<_, Error>((page.versions, page.next_page_token))
            }
        })
    }

    /// Release the client's transport; safe to call repeatedly
    pub async fn close(&self) -> Result<()> {
        self.client.close().await
    }

    async fn fetch_secret(&self, secret: &str) -> Result<Secret> {
        let name = paths::secret_name(&self.project_id, secret);
        let request = GetSecretRequest { name: name.clone() };
        tracked(Operation::GetSecret, &name, self.client.get_secret(request)).await
    }

    /// Local short-circuit for creates: no create call is issued for an existing secret
    async fn ensure_absent(&self, secret: &str) -> Result<()> {
        if self.secret_exists(secret).await {
            warn!("failed to create secret as secret already exists: {}", secret);
            metrics::increment_already_exists_short_circuits();
            return Err(Error::AlreadyExists(secret.to_string()));
        }
        Ok(())
    }

    async fn create(&self, secret: &str, labels: HashMap<String, String>) -> Result<Secret> {
        let parent = paths::project_name(&self.project_id);
        info!("Creating new GCP secret: {}", secret);
        let request = CreateSecretRequest {
            parent,
            secret_id: secret.to_string(),
            secret: Secret {
                replication: Replication::Automatic,
                labels,
                ..Default::default()
            },
        };
        let name = paths::secret_name(&self.project_id, secret);
        tracked(Operation::CreateSecret, &name, self.client.create_secret(request)).await
    }

    async fn add_version(&self, secret: &str, payload: SecretPayload) -> Result<SecretVersion> {
        let parent = paths::secret_name(&self.project_id, secret);
        info!("Adding new version to GCP secret: {}", secret);
        let request = AddSecretVersionRequest {
            parent: parent.clone(),
            payload,
        };
        tracked(
            Operation::AddSecretVersion,
            &parent,
            self.client.add_secret_version(request),
        )
        .await
    }

    async fn delete(&self, secret: &str) -> Result<()> {
        let name = paths::secret_name(&self.project_id, secret);
        info!("Deleting GCP secret: {}", name);
        let request = DeleteSecretRequest { name: name.clone() };
        tracked(Operation::DeleteSecret, &name, self.client.delete_secret(request)).await
    }
}

/// Run one client call inside a span and record its metrics
async fn tracked<T>(
    operation: Operation,
    resource: &str,
    call: impl Future<Output = Result<T>>,
) -> Result<T> {
    let span = info_span!(
        "gcp.secret",
        operation = operation.as_str(),
        resource.name = resource,
        operation.success = Empty,
        operation.duration_ms = Empty,
        error.code = Empty,
        error.message = Empty,
    );
    let tracker = OperationTracker::new(operation, span.clone());
    let result = call.instrument(span).await;
    tracker.finish(result)
}

/// Turn a page-at-a-time fetch into a lazy item stream
///
/// `fetch_page` gets the page token (empty for the first page) and returns the
/// page's items with the next token. The stream ends after the page whose next
/// token is empty, or at the first error.
fn paginate<T, F, Fut>(fetch_page: F) -> BoxStream<'static, Result<T>>
where
    T: Send + 'static,
    F: FnMut(String) -> Fut + Send + 'static,
    Fut: Future<Output = Result<(Vec<T>, String)>> + Send + 'static,
{
    stream::try_unfold(
        (fetch_page, Some(String::new())),
        |(mut fetch_page, page_token)| async move {
            let Some(page_token) = page_token else {
                return Ok::<_, Error>(None);
            };
            let (items, next_page_token) = fetch_page(page_token).await?;
            let next_page_token = (!next_page_token.is_empty()).then_some(next_page_token);
            let items = stream::iter(items.into_iter().map(Ok::<T, Error>));
            Ok(Some((items, (fetch_page, next_page_token))))
        },
    )
    .try_flatten()
    .boxed()
}
