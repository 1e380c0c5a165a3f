//! Error model shared by every Atelier crate.
//!
//! A single [`AppError`] travels the whole stack: storage adapters, the hub
//! engine, and the HTTP layer all speak it, so `?` works across crate
//! boundaries and the api crate can map `kind` straight to a status code.

use std::fmt;

use thiserror::Error;

/// Coarse classification of an [`AppError`].
///
/// The api crate turns the kind into an HTTP status; the `Display` form is
/// the machine-readable code clients see in error bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// Request input failed validation (bad body, unknown recipient,
    /// oversized metadata).
    Validation,
    /// The addressed entity does not exist.
    NotFound,
    /// The operation collided with concurrent state.
    Conflict,
    /// The trusted identity headers were missing or unusable.
    Session,
    /// The history store rejected or failed an operation.
    Database,
    /// Encoding or decoding a payload failed.
    Serialization,
    /// The service configuration could not be loaded or is invalid.
    Configuration,
    /// A dependency is down; retry later.
    ServiceUnavailable,
    /// Anything that has no better bucket.
    Internal,
}

impl ErrorKind {
    /// Stable wire code for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "VALIDATION",
            Self::NotFound => "NOT_FOUND",
            Self::Conflict => "CONFLICT",
            Self::Session => "SESSION",
            Self::Database => "DATABASE",
            Self::Serialization => "SERIALIZATION",
            Self::Configuration => "CONFIGURATION",
            Self::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            Self::Internal => "INTERNAL",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The application-wide error.
///
/// Carries a kind for dispatch, a message for humans, and optionally the
/// underlying cause for logs. Lower layers attach sources with
/// [`AppError::with_source`]; everything above matches on `kind`.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    pub kind: ErrorKind,
    pub message: String,
    /// Root cause, kept for `tracing` output. Never serialized to clients.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Wrap an underlying error, keeping it on the source chain.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    // Shorthand constructors for the kinds raised directly in code.

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn session(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Session, message)
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Database, message)
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }
}

// The boxed source is not cloneable; a clone keeps kind and message only.
impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(ErrorKind::Serialization, format!("JSON error: {err}"), err)
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorKind::Internal, format!("I/O failure: {err}"), err)
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Could not load configuration: {err}"),
            err,
        )
    }
}
