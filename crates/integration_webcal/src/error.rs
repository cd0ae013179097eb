//! Webcal client errors

use thiserror::Error;

/// Errors returned by [`WebcalClient`](crate::WebcalClient)
#[derive(Debug, Error)]
pub enum WebcalError {
    /// The HTTP client could not be built
    #[error("HTTP client setup failed: {0}")]
    ClientSetup(String),

    /// Connection to the feed server failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// The request did not complete in time
    #[error("Request timed out after {0}s")]
    Timeout(u64),

    /// The server answered with a non-2xx status
    #[error("Feed server responded with {status} {status_text}")]
    HttpStatus {
        /// HTTP status code
        status: u16,
        /// Standard reason phrase for `status`
        ///
        /// The reason phrase the server sent is not available from the HTTP
        /// stack, so this is the registered phrase for the code, or
        /// "Unknown" for unregistered codes.
        status_text: String,
    },

    /// A redirect was refused or the redirect limit was exceeded
    #[error("Redirect rejected: {0}")]
    RedirectRejected(String),

    /// The body exceeded the configured limit
    #[error("Feed body exceeds {limit} bytes")]
    BodyTooLarge {
        /// Configured limit in bytes
        limit: usize,
    },

    /// Any other transport failure
    #[error("Request failed: {0}")]
    RequestFailed(String),
}

impl WebcalError {
    /// Check if retrying the request could succeed
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::ConnectionFailed(_) | Self::Timeout(_) => true,
            Self::HttpStatus { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}
