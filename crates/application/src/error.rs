//! Application-level errors

use domain::DomainError;
use thiserror::Error;

/// Errors that can occur in the application layer
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Domain-level error
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Requested record does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Feed URL failed the safety checks, nothing was fetched
    #[error("Feed URL is not allowed: only public http(s) addresses can be synced")]
    UnsafeFeedUrl,

    /// Feed server answered with a non-2xx status
    #[error("Feed server responded with {status} {status_text}")]
    FeedStatus {
        /// HTTP status code
        status: u16,
        /// Reason phrase
        status_text: String,
    },

    /// External service error (network, TLS, oversized body, ...)
    #[error("External service error: {0}")]
    ExternalService(String),

    /// Record store error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApplicationError {
    /// Check if retrying the same operation could succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ExternalService(_) | Self::Storage(_) => true,
            Self::FeedStatus { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}
