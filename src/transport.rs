//! Chat endpoint transport
//!
//! Provides a common interface for talking to the remote chat endpoint, an
//! HTTP implementation, and a logging decorator.

mod error;
mod http;
mod types;

pub use error::{TransportError, TransportErrorKind, GENERIC_ERROR_MESSAGE, RATE_LIMIT_MESSAGE};
pub use http::{CsrfTokenSource, HttpTransport, StaticCsrfToken, CSRF_HEADER};
pub use types::{ContextEntry, ContextRole, SendRequest, SendResponse};

use async_trait::async_trait;
use std::sync::Arc;

/// Remote chat endpoint
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send one user message and wait for the server's decision
    async fn send(&self, request: &SendRequest) -> Result<SendResponse, TransportError>;

    /// Ask the server to forget the conversation
    async fn clear(&self) -> Result<(), TransportError>;
}

#[async_trait]
impl<T: ChatTransport + ?Sized> ChatTransport for Arc<T> {
    async fn send(&self, request: &SendRequest) -> Result<SendResponse, TransportError> {
        (**self).send(request).await
    }

    async fn clear(&self) -> Result<(), TransportError> {
        (**self).clear().await
    }
}

/// Logging wrapper for chat transports
pub struct LoggingTransport<T> {
    inner: T,
}

impl<T: ChatTransport> LoggingTransport<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<T: ChatTransport> ChatTransport for LoggingTransport<T> {
    async fn send(&self, request: &SendRequest) -> Result<SendResponse, TransportError> {
        let start = std::time::Instant::now();
        let result = self.inner.send(request).await;
        let duration = start.elapsed();

        match &result {
            Ok(response) => {
                tracing::info!(
                    duration_ms = %duration.as_millis(),
                    confirmed = request.confirmed,
                    context_len = request.context.len(),
                    requires_confirmation = response.requires_confirmation,
                    has_warning = response.warning.is_some(),
                    has_response = response.response.is_some(),
                    "Chat request completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    duration_ms = %duration.as_millis(),
                    error = %e.message,
                    status = ?e.status,
                    retryable = e.kind.is_retryable(),
                    "Chat request failed"
                );
            }
        }

        result
    }

    async fn clear(&self) -> Result<(), TransportError> {
        let start = std::time::Instant::now();
        let result = self.inner.clear().await;
        let duration = start.elapsed();

        match &result {
            Ok(()) => tracing::info!(duration_ms = %duration.as_millis(), "Chat cleared on server"),
            Err(e) => tracing::error!(
                duration_ms = %duration.as_millis(),
                error = %e.message,
                status = ?e.status,
                "Chat clear failed"
            ),
        }

        result
    }
}
