//! The network seam of the client.
//!
//! `ApiClient` never talks to a socket directly; it hands an `HttpRequest`
//! to a `Transport` and gets an `HttpResponse` back. Non-2xx statuses are
//! ordinary responses here. Only failures that prevent a response from
//! arriving at all are `TransportError`s.

mod reqwest;
#[cfg(test)]
mod stub;

pub use self::reqwest::ReqwestTransport;
#[cfg(test)]
pub use self::stub::{StubStep, StubTransport};

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};

/// Failure to obtain any response for a request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("failed to fetch: {0}")]
    Connect(String),

    #[error("request aborted: {0}")]
    Aborted(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("failed to read response body: {0}")]
    Body(String),
}

impl From<TransportError> for ApiError {
    fn from(error: TransportError) -> Self {
        match error {
            TransportError::InvalidRequest(_) => ApiError::invalid_request(error.to_string()),
            TransportError::Connect(_) | TransportError::Aborted(_) | TransportError::Body(_) => {
                ApiError::network(error.to_string())
            }
        }
    }
}

/// Executes one HTTP round trip.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).send(request).await
    }
}
