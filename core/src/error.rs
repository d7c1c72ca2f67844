//! Error type for the ConnectWon API client.
//!
//! # Design
//! Two families share one struct. Errors declared by the backend carry the
//! response status plus the `code`/`details` from its `{ error: ... }`
//! envelope. Transport-level failures (timeout, dropped connection, malformed
//! request) use status `0`. `ErrorKind` keeps the two apart without string
//! matching, which is what the retry policy keys on.

use serde_json::Value;
use thiserror::Error;

/// HTTP statuses that are considered transient and retried.
pub const RETRYABLE_STATUSES: [u16; 6] = [408, 429, 500, 502, 503, 504];

/// Message carried by every timeout error.
pub const TIMEOUT_MESSAGE: &str = "Request timeout";

/// Broad classification of an [`ApiError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The server answered with a non-2xx status.
    Http,
    /// The per-request deadline elapsed before a response arrived.
    Timeout,
    /// The connection failed or was aborted mid-flight.
    Network,
    /// The request could not be constructed (bad URL, bad header).
    InvalidRequest,
    /// The request payload could not be serialized to JSON.
    Encode,
    /// The response payload did not match the expected type.
    Decode,
}

/// Error returned by every client call.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ApiError {
    message: String,
    status: u16,
    code: Option<String>,
    details: Option<Value>,
    kind: ErrorKind,
}

impl ApiError {
    /// An error declared by the backend for a non-2xx response.
    pub fn http(
        status: u16,
        message: impl Into<String>,
        code: Option<String>,
        details: Option<Value>,
    ) -> Self {
        Self {
            message: message.into(),
            status,
            code,
            details,
            kind: ErrorKind::Http,
        }
    }

    pub fn timeout() -> Self {
        Self::transport(ErrorKind::Timeout, TIMEOUT_MESSAGE)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::transport(ErrorKind::Network, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::transport(ErrorKind::InvalidRequest, message)
    }

    pub fn encode(message: impl Into<String>) -> Self {
        Self::transport(ErrorKind::Encode, message)
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::transport(ErrorKind::Decode, message)
    }

    fn transport(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: 0,
            code: None,
            details: None,
            kind,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// HTTP status of the failed response, or `0` for transport failures.
    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Whether the retry policy may re-issue the request that produced this
    /// error.
    pub fn is_retryable(&self) -> bool {
        if RETRYABLE_STATUSES.contains(&self.status) {
            return true;
        }
        self.status == 0 && matches!(self.kind, ErrorKind::Timeout | ErrorKind::Network)
    }
}
