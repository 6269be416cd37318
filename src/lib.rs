//! GCP Secret Manager client library
//!
//! A small, mockable wrapper around Google Cloud Secret Manager.
//!
//! - [`paths`]: canonical resource names (`projects/{p}/secrets/{s}/versions/{v}`)
//! - [`client`]: the [`SecretClient`] capability trait with a gRPC implementation
//!   and a closure-driven mock
//! - [`secrets`]: [`SecretManager`], the operations applications call
//! - [`config`], [`observability`]: environment configuration, logging and metrics
//!
//! Tests are included in the module files and under `tests/`.

pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod model;
pub mod observability;
pub mod paths;
pub mod secrets;

pub use client::{
    ClientFactory, GrpcClientFactory, MockClientFactory, MockSecretClient, Operation,
    SecretClient, SecretManagerGRPC,
};
pub use config::SecretManagerConfig;
pub use error::{Error, Result, StatusCode};
pub use model::{Replication, Secret, SecretPayload, SecretVersion, VersionState};
pub use secrets::SecretManager;
