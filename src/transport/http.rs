//! HTTP transport for the chat endpoint

use super::{ChatTransport, SendRequest, SendResponse, TransportError};
use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, RETRY_AFTER};
use reqwest::{Client, RequestBuilder, Response};
use std::sync::Arc;
use std::time::Duration;

/// Header carrying the anti-forgery token
pub const CSRF_HEADER: &str = "X-CSRFToken";

/// Supplies the anti-forgery token for each request
///
/// Owned by the session/auth layer; the transport only attaches whatever it
/// returns. `None` sends the request without the header.
pub trait CsrfTokenSource: Send + Sync {
    fn csrf_token(&self) -> Option<String>;
}

/// Token fixed at startup
#[derive(Debug, Clone, Default)]
pub struct StaticCsrfToken(Option<String>);

impl StaticCsrfToken {
    pub fn new(token: Option<String>) -> Self {
        Self(token)
    }
}

impl CsrfTokenSource for StaticCsrfToken {
    fn csrf_token(&self) -> Option<String> {
        self.0.clone()
    }
}

/// reqwest-backed transport
///
/// Keeps a cookie store so the session cookie travels with every request,
/// which the server needs to validate the anti-forgery token.
pub struct HttpTransport {
    client: Client,
    chat_url: String,
    clear_url: String,
    tokens: Arc<dyn CsrfTokenSource>,
}

impl HttpTransport {
    /// # Errors
    ///
    /// Fails if the underlying HTTP client cannot be built (e.g. the TLS
    /// backend fails to initialise).
    pub fn new(
        base_url: &str,
        timeout: Duration,
        tokens: Arc<dyn CsrfTokenSource>,
    ) -> Result<Self, TransportError> {
        let base = base_url.trim_end_matches('/');
        let client = Client::builder()
            .timeout(timeout)
            .cookie_store(true)
            .build()
            .map_err(|e| TransportError::unknown(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            chat_url: format!("{base}/chat"),
            clear_url: format!("{base}/clear-chat"),
            tokens,
        })
    }

    fn post(&self, url: &str) -> RequestBuilder {
        let builder = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json");
        match self.tokens.csrf_token() {
            Some(token) => builder.header(CSRF_HEADER, token),
            None => builder,
        }
    }

    async fn classify_failure(response: Response) -> TransportError {
        let status = response.status();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<u64>().ok())
            .map(Duration::from_secs);
        let body = response.text().await.unwrap_or_default();

        let error = TransportError::from_status(status.as_u16(), &body);
        match retry_after {
            Some(delay) => error.with_retry_after(delay),
            None => error,
        }
    }
}

fn request_error(e: &reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::network(format!("Request timeout: {e}"))
    } else if e.is_connect() {
        TransportError::network(format!("Connection failed: {e}"))
    } else {
        TransportError::unknown(format!("Request failed: {e}"))
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn send(&self, request: &SendRequest) -> Result<SendResponse, TransportError> {
        let response = self
            .post(&self.chat_url)
            .json(request)
            .send()
            .await
            .map_err(|e| request_error(&e))?;

        if !response.status().is_success() {
            return Err(Self::classify_failure(response).await);
        }

        let body = response
            .text()
            .await
            .map_err(|e| TransportError::network(format!("Failed to read response: {e}")))?;

        serde_json::from_str(&body).map_err(|e| {
            TransportError::invalid_response(format!("Failed to parse response: {e} - body: {body}"))
        })
    }

    async fn clear(&self) -> Result<(), TransportError> {
        let response = self
            .post(&self.clear_url)
            .send()
            .await
            .map_err(|e| request_error(&e))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::classify_failure(response).await)
        }
    }
}
