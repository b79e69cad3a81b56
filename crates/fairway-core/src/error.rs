//! Unified error types for the golf-data acquisition layer.

use std::fmt::Debug;
use thiserror::Error;

/// Unified error type for Fairway.
///
/// Variants follow the propagation policy of the data layer:
/// configuration and unknown-provider errors are unrecoverable,
/// transport errors surface only after the retry budget is exhausted,
/// and cache errors are absorbed by the cache store before they reach
/// a caller.
#[derive(Error, Debug)]
pub enum FairwayError {
    // ============ Provider Lifecycle Errors ============
    /// A contract method was invoked before `initialize`.
    #[error("Provider not initialized: {0}")]
    NotInitialized(String),

    /// `initialize` was invoked a second time.
    #[error("Provider already initialized: {0}")]
    AlreadyInitialized(String),

    /// Configuration error (missing API key, malformed URL, ...).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Provider selector did not name a known provider.
    #[error("Unknown provider type: '{0}'")]
    UnknownProvider(String),

    // ============ Domain Errors ============
    /// Resource not found
    #[error("Resource not found: {resource_type} with id {id}")]
    NotFound {
        resource_type: &'static str,
        id: String,
    },

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    // ============ Transport Errors ============
    /// Upstream answered with a non-success status after all retries.
    #[error("HTTP {status} from {url}")]
    Http { status: u16, url: String },

    /// Connection-level failure (refused, reset, DNS, TLS).
    #[error("Network error: {0}")]
    Network(String),

    /// Timeout error
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// Upstream answered but the payload could not be understood.
    #[error("External service error: {service} - {message}")]
    ExternalService { service: String, message: String },

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    // ============ Infrastructure Errors ============
    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// Redis/Cache error
    #[error("Cache error: {0}")]
    Cache(String),

    /// JSON (de)serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    // ============ Internal Errors ============
    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Generic error wrapper
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FairwayError {
    /// Returns a machine-readable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotInitialized(_) => "PROVIDER_NOT_INITIALIZED",
            Self::AlreadyInitialized(_) => "PROVIDER_ALREADY_INITIALIZED",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::UnknownProvider(_) => "UNKNOWN_PROVIDER",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Http { .. } => "UPSTREAM_HTTP_ERROR",
            Self::Network(_) => "NETWORK_ERROR",
            Self::Timeout(_) => "TIMEOUT",
            Self::ExternalService { .. } => "EXTERNAL_SERVICE_ERROR",
            Self::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Cache(_) => "CACHE_ERROR",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
            Self::Internal(_) | Self::Other(_) => "INTERNAL_ERROR",
        }
    }

    /// Creates a not found error for a resource.
    #[must_use]
    pub fn not_found<T: ToString>(resource_type: &'static str, id: T) -> Self {
        Self::NotFound {
            resource_type,
            id: id.to_string(),
        }
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn configuration<T: Into<String>>(message: T) -> Self {
        Self::Configuration(message.into())
    }

    /// Creates a validation error.
    #[must_use]
    pub fn validation<T: Into<String>>(message: T) -> Self {
        Self::Validation(message.into())
    }

    /// Creates an external service error.
    #[must_use]
    pub fn external<S: Into<String>, M: Into<String>>(service: S, message: M) -> Self {
        Self::ExternalService {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal<T: Into<String>>(message: T) -> Self {
        Self::Internal(message.into())
    }

    /// Checks if this error is retriable.
    #[must_use]
    pub const fn is_retriable(&self) -> bool {
        match self {
            Self::Http { status, .. } => *status == 429 || *status >= 500,
            Self::Network(_) | Self::Timeout(_) | Self::Database(_) | Self::Cache(_) => true,
            _ => false,
        }
    }

    /// Returns true for errors that must surface immediately, never retried
    /// and never masked by cached data.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Configuration(_) | Self::UnknownProvider(_) | Self::NotInitialized(_)
        )
    }
}

#[cfg(feature = "sqlx")]
impl From<sqlx::Error> for FairwayError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => Self::NotFound {
                resource_type: "database_row",
                id: "unknown".to_string(),
            },
            _ => Self::Database(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for FairwayError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
