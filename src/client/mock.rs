//! # Mock Secret Client
//!
//! A [`SecretClient`] whose behaviour is supplied per operation by closures.
//!
//! Every operation has one slot. Calling an operation runs the closure currently
//! in its slot; an empty slot fails with [`Error::NotImplemented`]. Slots can be
//! reassigned at any time through a shared reference, and each mock instance
//! owns its own slots, so tests running in parallel do not see each other's
//! behaviour.
//!
//! ```rust
//! use gcp_secret_manager::client::MockSecretClient;
//! use gcp_secret_manager::error::{Error, StatusCode};
//!
//! let mock = MockSecretClient::new();
//! mock.on_get_secret(|_| Err(Error::status(StatusCode::NotFound, "secret not found")));
//! ```

use super::{ClientFactory, Operation, SecretClient};
use crate::error::{Error, Result};
use crate::model::{
    AccessSecretVersionRequest, AccessSecretVersionResponse, AddSecretVersionRequest,
    CreateSecretRequest, DeleteSecretRequest, DestroySecretVersionRequest,
    DisableSecretVersionRequest, EnableSecretVersionRequest, GetSecretRequest,
    GetSecretVersionRequest, ListSecretVersionsRequest, ListSecretVersionsResponse,
    ListSecretsRequest, ListSecretsResponse, Secret, SecretVersion,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

type Handler<Req, Resp> = Arc<dyn Fn(Req) -> Result<Resp> + Send + Sync>;

#[derive(Default)]
struct Handlers {
    create_secret: Option<Handler<CreateSecretRequest, Secret>>,
    get_secret: Option<Handler<GetSecretRequest, Secret>>,
    delete_secret: Option<Handler<DeleteSecretRequest, ()>>,
    add_secret_version: Option<Handler<AddSecretVersionRequest, SecretVersion>>,
    get_secret_version: Option<Handler<GetSecretVersionRequest, SecretVersion>>,
    access_secret_version:
        Option<Handler<AccessSecretVersionRequest, AccessSecretVersionResponse>>,
    enable_secret_version: Option<Handler<EnableSecretVersionRequest, SecretVersion>>,
    disable_secret_version: Option<Handler<DisableSecretVersionRequest, SecretVersion>>,
    destroy_secret_version: Option<Handler<DestroySecretVersionRequest, SecretVersion>>,
    list_secrets: Option<Handler<ListSecretsRequest, ListSecretsResponse>>,
    list_secret_versions: Option<Handler<ListSecretVersionsRequest, ListSecretVersionsResponse>>,
}

/// Closure-driven [`SecretClient`] for tests
#[derive(Default)]
pub struct MockSecretClient {
    handlers: Mutex<Handlers>,
    calls: Mutex<HashMap<Operation, usize>>,
    close_calls: AtomicUsize,
}

impl std::fmt::Debug for MockSecretClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockSecretClient")
            .field("calls", &*self.lock_calls())
            .field("close_calls", &self.close_calls())
            .finish_non_exhaustive()
    }
}

impl MockSecretClient {
    /// Create a mock with every slot empty
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty every slot and zero all call counters
    pub fn reset(&self) {
        *self.lock_handlers() = Handlers::default();
        self.lock_calls().clear();
        self.close_calls.store(0, Ordering::SeqCst);
    }

    /// Number of times `operation` was invoked, whether or not its slot was assigned
    pub fn calls(&self, operation: Operation) -> usize {
        self.lock_calls().get(&operation).copied().unwrap_or(0)
    }

    pub fn close_calls(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }

    pub fn on_create_secret<F>(&self, f: F) -> &Self
    where
        F: Fn(CreateSecretRequest) -> Result<Secret> + Send + Sync + 'static,
    {
        self.lock_handlers().create_secret = Some(Arc::new(f));
        self
    }

    pub fn on_get_secret<F>(&self, f: F) -> &Self
    where
        F: Fn(GetSecretRequest) -> Result<Secret> + Send + Sync + 'static,
    {
        self.lock_handlers().get_secret = Some(Arc::new(f));
        self
    }

    pub fn on_delete_secret<F>(&self, f: F) -> &Self
    where
        F: Fn(DeleteSecretRequest) -> Result<()> + Send + Sync + 'static,
    {
        self.lock_handlers().delete_secret = Some(Arc::new(f));
        self
    }

    pub fn on_add_secret_version<F>(&self, f: F) -> &Self
    where
        F: Fn(AddSecretVersionRequest) -> Result<SecretVersion> + Send + Sync + 'static,
    {
        self.lock_handlers().add_secret_version = Some(Arc::new(f));
        self
    }

    pub fn on_get_secret_version<F>(&self, f: F) -> &Self
    where
        F: Fn(GetSecretVersionRequest) -> Result<SecretVersion> + Send + Sync + 'static,
    {
        self.lock_handlers().get_secret_version = Some(Arc::new(f));
        self
    }

    pub fn on_access_secret_version<F>(&self, f: F) -> &Self
    where
        F: Fn(AccessSecretVersionRequest) -> Result<AccessSecretVersionResponse>
            + Send
            + Sync
            + 'static,
    {
        self.lock_handlers().access_secret_version = Some(Arc::new(f));
        self
    }

    pub fn on_enable_secret_version<F>(&self, f: F) -> &Self
    where
        F: Fn(EnableSecretVersionRequest) -> Result<SecretVersion> + Send + Sync + 'static,
    {
        self.lock_handlers().enable_secret_version = Some(Arc::new(f));
        self
    }

    pub fn on_disable_secret_version<F>(&self, f: F) -> &Self
    where
        F: Fn(DisableSecretVersionRequest) -> Result<SecretVersion> + Send + Sync + 'static,
    {
        self.lock_handlers().disable_secret_version = Some(Arc::new(f));
        self
    }

    pub fn on_destroy_secret_version<F>(&self, f: F) -> &Self
    where
        F: Fn(DestroySecretVersionRequest) -> Result<SecretVersion> + Send + Sync + 'static,
    {
        self.lock_handlers().destroy_secret_version = Some(Arc::new(f));
        self
    }

    pub fn on_list_secrets<F>(&self, f: F) -> &Self
    where
        F: Fn(ListSecretsRequest) -> Result<ListSecretsResponse> + Send + Sync + 'static,
    {
        self.lock_handlers().list_secrets = Some(Arc::new(f));
        self
    }

    pub fn on_list_secret_versions<F>(&self, f: F) -> &Self
    where
        F: Fn(ListSecretVersionsRequest) -> Result<ListSecretVersionsResponse>
            + Send
            + Sync
            + 'static,
    {
        self.lock_handlers().list_secret_versions = Some(Arc::new(f));
        self
    }

    fn lock_handlers(&self) -> MutexGuard<'_, Handlers> {
        self.handlers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_calls(&self) -> MutexGuard<'_, HashMap<Operation, usize>> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Count the call, then run the slot's closure outside the lock so it may
    /// reassign slots itself
    fn dispatch<Req, Resp>(
        &self,
        operation: Operation,
        slot: impl FnOnce(&Handlers) -> Option<Handler<Req, Resp>>,
        request: Req,
    ) -> Result<Resp> {
        *self.lock_calls().entry(operation).or_insert(0) += 1;
        let handler = slot(&self.lock_handlers());
        match handler {
            Some(handler) => handler(request),
            None => Err(Error::NotImplemented(operation)),
        }
    }
}

#[async_trait]
impl SecretClient for MockSecretClient {
    async fn create_secret(&self, request: CreateSecretRequest) -> Result<Secret> {
        self.dispatch(
            Operation::CreateSecret,
            |h| h.create_secret.clone(),
            request,
        )
    }

    async fn get_secret(&self, request: GetSecretRequest) -> Result<Secret> {
        self.dispatch(Operation::GetSecret, |h| h.get_secret.clone(), request)
    }

    async fn delete_secret(&self, request: DeleteSecretRequest) -> Result<()> {
        self.dispatch(
            Operation::DeleteSecret,
            |h| h.delete_secret.clone(),
            request,
        )
    }

    async fn add_secret_version(&self, request: AddSecretVersionRequest) -> Result<SecretVersion> {
        self.dispatch(
            Operation::AddSecretVersion,
            |h| h.add_secret_version.clone(),
            request,
        )
    }

    async fn get_secret_version(&self, request: GetSecretVersionRequest) -> Result<SecretVersion> {
        self.dispatch(
            Operation::GetSecretVersion,
            |h| h.get_secret_version.clone(),
            request,
        )
    }

    async fn access_secret_version(
        &self,
        request: AccessSecretVersionRequest,
    ) -> Result<AccessSecretVersionResponse> {
        self.dispatch(
            Operation::AccessSecretVersion,
            |h| h.access_secret_version.clone(),
            request,
        )
    }

    async fn enable_secret_version(
        &self,
        request: EnableSecretVersionRequest,
    ) -> Result<SecretVersion> {
        self.dispatch(
            Operation::EnableSecretVersion,
            |h| h.enable_secret_version.clone(),
            request,
        )
    }

    async fn disable_secret_version(
        &self,
        request: DisableSecretVersionRequest,
    ) -> Result<SecretVersion> {
        self.dispatch(
            Operation::DisableSecretVersion,
            |h| h.disable_secret_version.clone(),
            request,
        )
    }

    async fn destroy_secret_version(
        &self,
        request: DestroySecretVersionRequest,
    ) -> Result<SecretVersion> {
        self.dispatch(
            Operation::DestroySecretVersion,
            |h| h.destroy_secret_version.clone(),
            request,
        )
    }

    async fn list_secrets(&self, request: ListSecretsRequest) -> Result<ListSecretsResponse> {
        self.dispatch(Operation::ListSecrets, |h| h.list_secrets.clone(), request)
    }

    async fn list_secret_versions(
        &self,
        request: ListSecretVersionsRequest,
    ) -> Result<ListSecretVersionsResponse> {
        self.dispatch(
            Operation::ListSecretVersions,
            |h| h.list_secret_versions.clone(),
            request,
        )
    }

    async fn close(&self) -> Result<()> {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// [`ClientFactory`] handing out one shared [`MockSecretClient`]
#[derive(Debug, Clone, Default)]
pub struct MockClientFactory {
    client: Arc<MockSecretClient>,
}

impl MockClientFactory {
    pub fn new(client: Arc<MockSecretClient>) -> Self {
        Self { client }
    }

    /// The mock every created client refers to
    pub fn mock(&self) -> &Arc<MockSecretClient> {
        &self.client
    }
}

#[async_trait]
impl ClientFactory for MockClientFactory {
    async fn new_secret_client(&self) -> Result<Arc<dyn SecretClient>> {
        let client: Arc<dyn SecretClient> = Arc::clone(&self.client) as Arc<dyn SecretClient>;
        Ok(client)
    }
}
