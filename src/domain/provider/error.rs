//! Provider error taxonomy
//!
//! Every provider failure is classified into one of four kinds, each with a
//! stable machine-readable code so the calling layer can decide on its own
//! retry or backoff policy. Timeouts are surfaced as the connection kind to
//! keep the taxonomy small.

use thiserror::Error;

/// Errors raised by AI providers and the embedding backends
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("invalid_api_key: {message}")]
    InvalidApiKey { message: String },

    #[error("model_not_found: {message}")]
    ModelNotFound { message: String },

    #[error("rate_limit_exceeded: {message}")]
    RateLimitExceeded { message: String },

    #[error("connection_failure: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl ProviderError {
    pub fn invalid_api_key(message: impl Into<String>) -> Self {
        Self::InvalidApiKey {
            message: message.into(),
        }
    }

    pub fn model_not_found(message: impl Into<String>) -> Self {
        Self::ModelNotFound {
            message: message.into(),
        }
    }

    pub fn rate_limit_exceeded(message: impl Into<String>) -> Self {
        Self::RateLimitExceeded {
            message: message.into(),
        }
    }

    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
            source: None,
        }
    }

    /// Connection failure carrying the underlying cause for diagnostics
    pub fn connection_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Connection {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Stable error code for the calling layer
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidApiKey { .. } => "invalid_api_key",
            Self::ModelNotFound { .. } => "model_not_found",
            Self::RateLimitExceeded { .. } => "rate_limit_exceeded",
            Self::Connection { .. } => "connection_failure",
        }
    }

    /// Whether a retry can reasonably succeed
    ///
    /// Only connection failures are transient. Invalid keys and rate limits
    /// must never be retried by the gateway.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Connection { .. })
    }
}
