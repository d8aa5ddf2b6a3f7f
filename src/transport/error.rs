//! Transport error types

use std::time::Duration;
use thiserror::Error;

/// Shown for every transport failure other than rate limiting
pub const GENERIC_ERROR_MESSAGE: &str = "Sorry, there was an error processing your request.";

/// Shown when the server answers 429
pub const RATE_LIMIT_MESSAGE: &str =
    "Rate limit exceeded. Please wait before sending more messages.";

/// Transport error with classification
///
/// `message` carries diagnostic detail for logs. It is never shown to the
/// user; see [`TransportErrorKind::user_message`].
#[derive(Debug, Error)]
#[error("{message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
    pub status: Option<u16>,
    pub retry_after: Option<Duration>,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
            retry_after: None,
        }
    }

    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    #[must_use]
    pub fn with_retry_after(mut self, duration: Duration) -> Self {
        self.retry_after = Some(duration);
        self
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Network, message)
    }

    pub fn rate_limit(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::RateLimit, message)
    }

    pub fn server_error(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::ServerError, message)
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Auth, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::InvalidRequest, message)
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::InvalidResponse, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Unknown, message)
    }

    /// Classify a non-2xx status
    pub fn from_status(status: u16, body: &str) -> Self {
        let error = match status {
            401 | 403 => Self::auth(format!("Authentication failed: {body}")),
            429 => Self::rate_limit(format!("Rate limited: {body}")),
            400 => Self::invalid_request(format!("Invalid request: {body}")),
            500..=599 => Self::server_error(format!("Server error: {body}")),
            _ => Self::unknown(format!("HTTP {status}: {body}")),
        };
        error.with_status(status)
    }

    pub fn user_message(&self) -> &'static str {
        self.kind.user_message()
    }
}

/// Error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// Connection failures, timeouts
    Network,
    /// Rate limited (429)
    RateLimit,
    /// Server error (5xx)
    ServerError,
    /// Authentication or anti-forgery check failed (401, 403)
    Auth,
    /// Bad request (400)
    InvalidRequest,
    /// 2xx with a body that is not a chat response
    InvalidResponse,
    Unknown,
}

impl TransportErrorKind {
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::Network | Self::RateLimit | Self::ServerError)
    }

    /// Safe text to show the user for this failure
    pub fn user_message(self) -> &'static str {
        match self {
            Self::RateLimit => RATE_LIMIT_MESSAGE,
            _ => GENERIC_ERROR_MESSAGE,
        }
    }
}
