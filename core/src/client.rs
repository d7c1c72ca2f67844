//! Request executor and retry policy.
//!
//! # Design
//! `execute` performs exactly one round trip: it resolves the bearer token,
//! builds an `HttpRequest`, sends it through the `Transport` under a
//! deadline, and normalizes the response. `request` wraps `execute` with a
//! bounded exponential backoff for transient failures. `send` decodes the
//! normalized payload into a caller type. Resource facades in
//! `crate::resources` sit on top of `send`.
//!
//! Calls share nothing mutable. Every call owns its own timer, and dropping
//! the returned future cancels the in-flight request.

use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::time::{sleep, timeout};
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, RequestOptions};
use crate::resources::{Auth, Participants, Payments, Programs, Users, Venues};
use crate::transport::{ReqwestTransport, Transport};
use crate::types::HealthStatus;

/// Delay before the first retry; doubled for each one after it.
pub const BASE_BACKOFF: Duration = Duration::from_millis(1000);

/// Typed client for the ConnectWon backend API.
///
/// Cheap to clone; clones share the configuration and the transport.
pub struct ApiClient<T = ReqwestTransport> {
    inner: Arc<Inner<T>>,
}

struct Inner<T> {
    config: ClientConfig,
    transport: T,
}

impl<T> Clone for ApiClient<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl ApiClient<ReqwestTransport> {
    /// Creates a client backed by `reqwest`. Fails on an empty base URL or
    /// a zero timeout.
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        config
            .validate()
            .map_err(|e| ApiError::invalid_request(e.to_string()))?;
        Ok(Self::with_transport(config, ReqwestTransport::new()?))
    }
}

impl<T: Transport> ApiClient<T> {
    /// Uses `config` as given; call `ClientConfig::validate` first when it
    /// comes from the builder methods.
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self {
            inner: Arc::new(Inner { config, transport }),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Full URL for `path`, including the query string when any parameter
    /// is defined.
    pub fn url(&self, path: &str, options: &RequestOptions) -> String {
        let query = options.query_string();
        if query.is_empty() {
            format!("{}{path}", self.inner.config.base_url())
        } else {
            format!("{}{path}?{query}", self.inner.config.base_url())
        }
    }

    async fn build_request(
        &self,
        path: &str,
        options: &RequestOptions,
    ) -> Result<HttpRequest, ApiError> {
        let mut headers = vec![("Content-Type".to_string(), "application/json".to_string())];
        if let Some(token) = self.inner.config.token().resolve().await {
            headers.push(("Authorization".to_string(), format!("Bearer {token}")));
        }
        for (name, value) in &options.headers {
            headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(name));
            headers.push((name.clone(), value.clone()));
        }

        let body = options
            .body
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| ApiError::encode(e.to_string()))?;

        Ok(HttpRequest {
            method: options.method,
            url: self.url(path, options),
            headers,
            body,
        })
    }

    /// Performs a single attempt and normalizes its outcome.
    ///
    /// Returns `None` for `204 No Content`.
    pub async fn execute(
        &self,
        path: &str,
        options: &RequestOptions,
    ) -> Result<Option<Value>, ApiError> {
        let request = self.build_request(path, options).await?;
        debug!("{} {}", request.method.as_str(), request.url);

        let response = timeout(self.inner.config.timeout(), self.inner.transport.send(request))
            .await
            .map_err(|_| ApiError::timeout())??;

        debug!("{} {} -> {}", options.method.as_str(), path, response.status);
        normalize_response(response)
    }

    /// Executes with retries: up to `retries` extra attempts for transient
    /// failures, waiting `2^attempt` seconds before each.
    pub async fn request(
        &self,
        path: &str,
        options: &RequestOptions,
    ) -> Result<Option<Value>, ApiError> {
        let retries = self.inner.config.retries();
        let mut attempt = 0;

        loop {
            match self.execute(path, options).await {
                Ok(payload) => return Ok(payload),
                Err(error) if error.is_retryable() && attempt < retries => {
                    let delay = backoff_delay(attempt);
                    warn!(
                        "{} {} failed with status {} ({}), retry {} of {} in {:?}",
                        options.method.as_str(),
                        path,
                        error.status(),
                        error,
                        attempt + 1,
                        retries,
                        delay
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(error) => return Err(error),
            }
        }
    }

    /// `request` followed by decoding the payload. A missing payload decodes
    /// from `null`, so `()` and `Option<_>` accept `204 No Content`.
    pub async fn send<R: DeserializeOwned>(
        &self,
        path: &str,
        options: &RequestOptions,
    ) -> Result<R, ApiError> {
        let payload = self.request(path, options).await?;
        serde_json::from_value(payload.unwrap_or(Value::Null))
            .map_err(|e| ApiError::decode(format!("unexpected response from {path}: {e}")))
    }

    /// `request` for endpoints whose payload carries nothing the caller
    /// needs. Any 2xx answer is success, whatever its body.
    pub async fn send_unit(&self, path: &str, options: &RequestOptions) -> Result<(), ApiError> {
        self.request(path, options).await.map(drop)
    }

    pub async fn get<R: DeserializeOwned>(&self, path: &str) -> Result<R, ApiError> {
        self.send(path, &RequestOptions::new(HttpMethod::Get)).await
    }

    /// GET with the defined fields of `query` as query parameters.
    pub async fn get_with<R, Q>(&self, path: &str, query: &Q) -> Result<R, ApiError>
    where
        R: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let options = RequestOptions::new(HttpMethod::Get).query_from(query)?;
        self.send(path, &options).await
    }

    pub async fn post<R, B>(&self, path: &str, body: &B) -> Result<R, ApiError>
    where
        R: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let options = RequestOptions::new(HttpMethod::Post).json(body)?;
        self.send(path, &options).await
    }

    /// POST without a body, for action endpoints.
    pub async fn post_empty<R: DeserializeOwned>(&self, path: &str) -> Result<R, ApiError> {
        self.send(path, &RequestOptions::new(HttpMethod::Post)).await
    }

    pub async fn put<R, B>(&self, path: &str, body: &B) -> Result<R, ApiError>
    where
        R: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let options = RequestOptions::new(HttpMethod::Put).json(body)?;
        self.send(path, &options).await
    }

    pub async fn patch<R, B>(&self, path: &str, body: &B) -> Result<R, ApiError>
    where
        R: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let options = RequestOptions::new(HttpMethod::Patch).json(body)?;
        self.send(path, &options).await
    }

    /// POST whose response body is ignored.
    pub async fn post_unit<B>(&self, path: &str, body: &B) -> Result<(), ApiError>
    where
        B: Serialize + ?Sized,
    {
        let options = RequestOptions::new(HttpMethod::Post).json(body)?;
        self.send_unit(path, &options).await
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.send_unit(path, &RequestOptions::new(HttpMethod::Delete)).await
    }

    pub async fn health(&self) -> Result<HealthStatus, ApiError> {
        self.get("/health").await
    }

    pub fn auth(&self) -> Auth<'_, T> {
        Auth::new(self)
    }

    pub fn users(&self) -> Users<'_, T> {
        Users::new(self)
    }

    pub fn programs(&self) -> Programs<'_, T> {
        Programs::new(self)
    }

    pub fn participants(&self) -> Participants<'_, T> {
        Participants::new(self)
    }

    pub fn venues(&self) -> Venues<'_, T> {
        Venues::new(self)
    }

    pub fn payments(&self) -> Payments<'_, T> {
        Payments::new(self)
    }
}

/// Wait before retry number `attempt + 1`.
pub fn backoff_delay(attempt: u32) -> Duration {
    let factor = 2u32.saturating_pow(attempt);
    BASE_BACKOFF.saturating_mul(factor)
}

/// Maps a raw response to the payload or the error it carries.
///
/// - `204` yields `None`.
/// - Other 2xx bodies are parsed as JSON; a `{ "data": X }` envelope yields
///   `X`, any other JSON is returned unchanged, and an unparsable body comes
///   back as a JSON string holding the raw text.
/// - Non-2xx bodies with an `error` field become the declared error;
///   anything else becomes a generic error with the raw text or the status
///   line as its message.
pub fn normalize_response(response: HttpResponse) -> Result<Option<Value>, ApiError> {
    if !response.is_success() {
        return Err(error_from_response(response));
    }
    if response.status == 204 {
        return Ok(None);
    }

    let payload = match serde_json::from_str::<Value>(&response.body) {
        Ok(Value::Object(mut fields)) => match fields.remove("data") {
            Some(data) => data,
            None => Value::Object(fields),
        },
        Ok(value) => value,
        Err(_) => Value::String(response.body),
    };
    Ok(Some(payload))
}

fn error_from_response(response: HttpResponse) -> ApiError {
    let status = response.status;
    let parsed = serde_json::from_str::<Value>(&response.body).ok();

    if let Some(error) = parsed.as_ref().and_then(|body| body.get("error")) {
        return match error {
            Value::Object(fields) => ApiError::http(
                status,
                fields
                    .get("message")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| status_line(status)),
                fields.get("code").and_then(code_string),
                fields.get("details").cloned(),
            ),
            Value::String(message) => ApiError::http(status, message.clone(), None, None),
            other => ApiError::http(status, status_line(status), None, Some(other.clone())),
        };
    }

    let message = if response.body.trim().is_empty() {
        status_line(status)
    } else {
        response.body
    };
    ApiError::http(status, message, None, parsed)
}

fn code_string(code: &Value) -> Option<String> {
    match code {
        Value::String(code) => Some(code.clone()),
        Value::Number(code) => Some(code.to_string()),
        _ => None,
    }
}

fn status_line(status: u16) -> String {
    match StatusCode::from_u16(status)
        .ok()
        .and_then(|status| status.canonical_reason())
    {
        Some(reason) => format!("HTTP {status} {reason}"),
        None => format!("HTTP {status}"),
    }
}
