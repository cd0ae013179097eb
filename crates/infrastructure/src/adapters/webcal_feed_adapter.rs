//! Webcal feed adapter - Implements FeedFetcherPort using integration_webcal

use std::sync::Arc;

use application::{error::ApplicationError, ports::FeedFetcherPort, UrlSafetyValidator};
use async_trait::async_trait;
use integration_webcal::{HttpWebcalClient, WebcalClient, WebcalConfig, WebcalError};
use tracing::{debug, instrument};

/// Adapter that downloads subscribed feeds over HTTP(S)
pub struct WebcalFeedAdapter {
    client: Arc<dyn WebcalClient>,
}

impl std::fmt::Debug for WebcalFeedAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebcalFeedAdapter").finish_non_exhaustive()
    }
}

impl WebcalFeedAdapter {
    /// Create an adapter whose redirects are held to the feed URL rules
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to initialize.
    pub fn new(config: WebcalConfig) -> Result<Self, ApplicationError> {
        let client = HttpWebcalClient::new(config, UrlSafetyValidator::is_safe)
            .map_err(|e| ApplicationError::Configuration(e.to_string()))?;
        Ok(Self::with_client(Arc::new(client)))
    }

    /// Create an adapter over an existing client
    #[must_use]
    pub fn with_client(client: Arc<dyn WebcalClient>) -> Self {
        Self { client }
    }

    /// Map integration webcal error to application error
    fn map_error(err: WebcalError) -> ApplicationError {
        match err {
            WebcalError::HttpStatus {
                status,
                status_text,
            } => ApplicationError::FeedStatus {
                status,
                status_text,
            },
            WebcalError::ClientSetup(e) => ApplicationError::Configuration(e),
            other => ApplicationError::ExternalService(other.to_string()),
        }
    }
}

#[async_trait]
impl FeedFetcherPort for WebcalFeedAdapter {
    #[instrument(skip(self))]
    async fn fetch(&self, url: &str) -> Result<String, ApplicationError> {
        let result = self.client.fetch_feed(url).await.map_err(Self::map_error);

        match &result {
            Ok(body) => debug!(bytes = body.len(), "Fetched feed"),
            Err(e) => debug!(error = %e, "Failed to fetch feed"),
        }

        result
    }
}
