use std::fmt;

use thiserror::Error;

use crate::request::SigningArtifacts;
use crate::response::ServiceError;

/// The error type for awsnano operations.
///
/// Only `message` is rendered by `Display`. A service error keeps the parsed
/// payload and, when debug logging was enabled while the request ran, the
/// locally computed signing artifacts for comparison with what the service
/// expected.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct Error {
    kind: ErrorKind,
    message: String,
    #[source]
    source: Option<anyhow::Error>,
    service_error: Option<Box<ServiceError>>,
    artifacts: Option<Box<SigningArtifacts>>,
}

/// The kind of error that occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request could not be signed (bad header value, malformed URL, etc.)
    SigningFailed,

    /// The service answered with a non-success status
    ServiceError,

    /// The response body could not be understood
    ResponseInvalid,

    /// Credentials are missing or malformed
    CredentialInvalid,

    /// Request cannot be signed (missing required fields, etc.)
    RequestInvalid,

    /// Configuration error (missing fields, invalid values)
    ConfigInvalid,

    /// Internal inconsistencies and transport failures
    Unexpected,
}

impl Error {
    /// Create a new error with the given kind and message
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
            service_error: None,
            artifacts: None,
        }
    }

    /// Add a source error
    pub fn with_source(mut self, source: impl Into<anyhow::Error>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Attach the signing artifacts of the request that produced this error.
    pub fn with_artifacts(mut self, artifacts: SigningArtifacts) -> Self {
        self.artifacts = Some(Box::new(artifacts));
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The parsed error payload for [`ErrorKind::ServiceError`].
    pub fn service_error(&self) -> Option<&ServiceError> {
        self.service_error.as_deref()
    }

    /// Canonical request, string to sign and authorization of the failed
    /// request, if they were captured.
    pub fn artifacts(&self) -> Option<&SigningArtifacts> {
        self.artifacts.as_deref()
    }

    /// Check if the service rejected the request.
    pub fn is_service_error(&self) -> bool {
        self.kind == ErrorKind::ServiceError
    }
}

// Convenience constructors
impl Error {
    /// Create a signing failed error
    pub fn signing_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SigningFailed, message)
    }

    /// Create a service error carrying the parsed payload of the response
    /// received for `url`.
    pub fn service(url: &str, service_error: ServiceError) -> Self {
        let mut err = Self::new(
            ErrorKind::ServiceError,
            format!("request to {url} failed: {service_error}"),
        );
        err.service_error = Some(Box::new(service_error));
        err
    }

    /// Create a response invalid error
    pub fn response_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ResponseInvalid, message)
    }

    /// Create a credential invalid error
    pub fn credential_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::CredentialInvalid, message)
    }

    /// Create a request invalid error
    pub fn request_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RequestInvalid, message)
    }

    /// Create a config invalid error
    pub fn config_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ConfigInvalid, message)
    }

    /// Create an unexpected error
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unexpected, message)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::SigningFailed => write!(f, "failed to sign request"),
            ErrorKind::ServiceError => write!(f, "service error"),
            ErrorKind::ResponseInvalid => write!(f, "invalid response"),
            ErrorKind::CredentialInvalid => write!(f, "invalid credentials"),
            ErrorKind::RequestInvalid => write!(f, "invalid request"),
            ErrorKind::ConfigInvalid => write!(f, "invalid configuration"),
            ErrorKind::Unexpected => write!(f, "unexpected error"),
        }
    }
}

/// Convenience type alias for Results
pub type Result<T> = std::result::Result<T, Error>;

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::unexpected(err.to_string()).with_source(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::unexpected(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<std::fmt::Error> for Error {
    fn from(err: std::fmt::Error) -> Self {
        Self::unexpected(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::Error> for Error {
    fn from(err: http::Error) -> Self {
        Self::signing_failed(format!("failed to create signed request: {err}"))
            .with_source(anyhow::Error::from(err))
    }
}

impl From<http::header::InvalidHeaderName> for Error {
    fn from(err: http::header::InvalidHeaderName) -> Self {
        Self::signing_failed(format!("failed to create signed request: {err}"))
            .with_source(anyhow::Error::from(err))
    }
}

impl From<http::header::InvalidHeaderValue> for Error {
    fn from(err: http::header::InvalidHeaderValue) -> Self {
        Self::signing_failed(format!("failed to create signed request: {err}"))
            .with_source(anyhow::Error::from(err))
    }
}

impl From<http::uri::InvalidUri> for Error {
    fn from(err: http::uri::InvalidUri) -> Self {
        Self::config_invalid(format!("invalid endpoint url: {err}"))
            .with_source(anyhow::Error::from(err))
    }
}
