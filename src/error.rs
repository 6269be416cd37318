//! # Errors
//!
//! Error type shared by the façade, the capability trait and both adapters.
//!
//! Backend failures are surfaced with their RPC status code and message and are
//! never remapped to a different kind. The only locally raised conditions are
//! [`Error::AlreadyExists`] (existence check short-circuit), [`Error::Closed`],
//! [`Error::NotImplemented`] (mock) and [`Error::PartialCreate`].

use crate::client::Operation;
use std::fmt;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// RPC status codes returned by Secret Manager
///
/// Mirrors the canonical gRPC codes the backend uses. Codes this crate has no
/// use for collapse into [`StatusCode::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    Cancelled,
    InvalidArgument,
    DeadlineExceeded,
    NotFound,
    AlreadyExists,
    PermissionDenied,
    ResourceExhausted,
    FailedPrecondition,
    Aborted,
    Unimplemented,
    Internal,
    Unavailable,
    Unauthenticated,
    Other,
}

impl StatusCode {
    /// Get the canonical upper-case name (e.g. `NOT_FOUND`)
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusCode::Cancelled => "CANCELLED",
            StatusCode::InvalidArgument => "INVALID_ARGUMENT",
            StatusCode::DeadlineExceeded => "DEADLINE_EXCEEDED",
            StatusCode::NotFound => "NOT_FOUND",
            StatusCode::AlreadyExists => "ALREADY_EXISTS",
            StatusCode::PermissionDenied => "PERMISSION_DENIED",
            StatusCode::ResourceExhausted => "RESOURCE_EXHAUSTED",
            StatusCode::FailedPrecondition => "FAILED_PRECONDITION",
            StatusCode::Aborted => "ABORTED",
            StatusCode::Unimplemented => "UNIMPLEMENTED",
            StatusCode::Internal => "INTERNAL",
            StatusCode::Unavailable => "UNAVAILABLE",
            StatusCode::Unauthenticated => "UNAUTHENTICATED",
            StatusCode::Other => "UNKNOWN",
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum Error {
    /// Raised locally when the existence check finds the secret, before any create call
    #[error("failed to create secret as secret already exists: {0}")]
    AlreadyExists(String),

    #[error("secret manager returned {code}: {message}")]
    Status { code: StatusCode, message: String },

    /// The call failed before the backend produced an RPC status (network, TLS, auth setup)
    #[error("secret manager transport error: {0}")]
    Transport(String),

    #[error("failed to set up secret manager client: {0}")]
    Connect(String),

    #[error("secret manager client is closed")]
    Closed,

    #[error("mock client has no behaviour assigned for {0}")]
    NotImplemented(Operation),

    #[error("secret version {0} returned no payload")]
    MissingPayload(String),

    /// The secret was created but its first version could not be added
    ///
    /// `cleanup` is `None` when the empty secret was deleted again, otherwise it
    /// holds the error of the failed delete and the secret still exists with no
    /// versions.
    #[error("secret {secret} was created but adding its first version failed: {source}")]
    PartialCreate {
        secret: String,
        #[source]
        source: Box<Error>,
        cleanup: Option<Box<Error>>,
    },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// Shorthand for a backend status error
    pub fn status(code: StatusCode, message: impl Into<String>) -> Self {
        Error::Status {
            code,
            message: message.into(),
        }
    }

    /// Status code carried by this error
    ///
    /// Local `AlreadyExists` reports [`StatusCode::AlreadyExists`] so callers can
    /// treat both the short-circuit and a backend collision the same way.
    /// `PartialCreate` reports the code of the failed add-version call.
    #[must_use]
    pub fn code(&self) -> Option<StatusCode> {
        match self {
            Error::Status { code, .. } => Some(*code),
            Error::AlreadyExists(_) => Some(StatusCode::AlreadyExists),
            Error::PartialCreate { source, .. } => source.code(),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.code() == Some(StatusCode::NotFound)
    }

    #[must_use]
    pub fn is_already_exists(&self) -> bool {
        self.code() == Some(StatusCode::AlreadyExists)
    }
}
