//! Feed fetcher port
//!
//! Downloads the raw body of an ICS feed. Callers must have validated the
//! URL before calling [`FeedFetcherPort::fetch`].

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Port for fetching feed bodies over HTTP(S)
#[cfg_attr(test, automock)]
#[async_trait]
pub trait FeedFetcherPort: Send + Sync {
    /// Issue a single GET and return the response body
    ///
    /// A non-2xx status is returned as [`ApplicationError::FeedStatus`].
    async fn fetch(&self, url: &str) -> Result<String, ApplicationError>;
}
