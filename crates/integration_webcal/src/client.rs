//! Webcal HTTP client
//!
//! Issues a single GET per feed and returns the body as text.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, header, redirect};
use tracing::{debug, instrument, warn};

use crate::{config::WebcalConfig, error::WebcalError};

/// Media types sent in the `Accept` header
const ACCEPT_CALENDAR: &str = "text/calendar, */*;q=0.5";

/// Decides whether a redirect target may be followed
///
/// Receives the absolute target URL of each hop.
pub type RedirectGuard = fn(&str) -> bool;

/// Client trait for downloading calendar feeds
#[async_trait]
pub trait WebcalClient: Send + Sync {
    /// Download the feed at `url`
    ///
    /// Non-2xx responses are returned as [`WebcalError::HttpStatus`].
    async fn fetch_feed(&self, url: &str) -> Result<String, WebcalError>;
}

/// reqwest-backed [`WebcalClient`]
#[derive(Debug)]
pub struct HttpWebcalClient {
    client: Client,
    config: WebcalConfig,
}

impl HttpWebcalClient {
    /// Create a client that checks every redirect hop with `redirect_guard`
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(config: WebcalConfig, redirect_guard: RedirectGuard) -> Result<Self, WebcalError> {
        let max_redirects = config.max_redirects;
        let policy = redirect::Policy::custom(move |attempt| {
            if attempt.previous().len() > max_redirects {
                return attempt.error(format!("more than {max_redirects} redirects"));
            }
            if redirect_guard(attempt.url().as_str()) {
                attempt.follow()
            } else {
                let target = attempt.url().to_string();
                attempt.error(format!("redirect target {target} is not allowed"))
            }
        });

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .user_agent(config.user_agent.clone())
            .redirect(policy)
            .build()
            .map_err(|e| WebcalError::ClientSetup(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Map a transport error onto [`WebcalError`]
    fn map_transport_error(&self, error: &reqwest::Error) -> WebcalError {
        if error.is_timeout() {
            WebcalError::Timeout(self.config.timeout_secs)
        } else if error.is_redirect() {
            WebcalError::RedirectRejected(error_chain(error))
        } else if error.is_connect() {
            WebcalError::ConnectionFailed(error_chain(error))
        } else {
            WebcalError::RequestFailed(error_chain(error))
        }
    }

    /// Read the body, failing once it grows past the configured limit
    async fn read_limited(&self, mut response: Response) -> Result<String, WebcalError> {
        let limit = self.config.max_body_bytes;

        if response
            .content_length()
            .is_some_and(|len| u64::try_from(limit).is_ok_and(|limit| len > limit))
        {
            return Err(WebcalError::BodyTooLarge { limit });
        }

        let mut body = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| self.map_transport_error(&e))?
        {
            if body.len() + chunk.len() > limit {
                return Err(WebcalError::BodyTooLarge { limit });
            }
            body.extend_from_slice(&chunk);
        }

        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

#[async_trait]
impl WebcalClient for HttpWebcalClient {
    #[instrument(skip(self))]
    async fn fetch_feed(&self, url: &str) -> Result<String, WebcalError> {
        debug!("Fetching calendar feed");

        let response = self
            .client
            .get(url)
            .header(header::ACCEPT, ACCEPT_CALENDAR)
            .send()
            .await
            .map_err(|e| self.map_transport_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Feed server returned an error status");
            return Err(WebcalError::HttpStatus {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let body = self.read_limited(response).await?;
        debug!(bytes = body.len(), "Fetched calendar feed");
        Ok(body)
    }
}

/// Display an error together with its sources
fn error_chain(error: &(dyn std::error::Error + 'static)) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
