use super::{Transport, TransportError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, Method};
use tracing::trace;

/// A transport based on [`reqwest`].
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Creates a transport with its own connection pool.
    pub fn new() -> Result<Self, TransportError> {
        Ok(Self {
            client: ClientBuilder::new().build()?,
        })
    }

    /// Wraps an existing client, sharing its connection pool.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        trace!("sending {} {}", request.method.as_str(), &request.url);

        let mut builder = self
            .client
            .request(method(request.method), request.url.as_str());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = self.client.execute(builder.build()?).await?;
        let status = response.status().as_u16();

        trace!("got {} response from {}", status, &request.url);

        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();

        Ok(HttpResponse {
            status,
            headers,
            body: response.text().await?,
        })
    }
}

fn method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_builder() {
            Self::InvalidRequest(error.to_string())
        } else if error.is_body() || error.is_decode() {
            Self::Body(error.to_string())
        } else if error.is_timeout() {
            Self::Aborted(error.to_string())
        } else {
            Self::Connect(error.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn relative_urls_are_invalid_requests() {
        let transport = ReqwestTransport::new().unwrap();
        let result = transport
            .send(HttpRequest {
                method: HttpMethod::Get,
                url: "/api/health".to_string(),
                headers: Vec::new(),
                body: None,
            })
            .await;

        assert!(matches!(result, Err(TransportError::InvalidRequest(_))));
    }

    #[test]
    fn methods_map_one_to_one() {
        assert_eq!(method(HttpMethod::Get), Method::GET);
        assert_eq!(method(HttpMethod::Patch), Method::PATCH);
        assert_eq!(method(HttpMethod::Delete), Method::DELETE);
    }
}
