//! HTTP wire types shared by the executor and the transport seam.
//!
//! # Design
//! Requests and responses are plain data. The client assembles an
//! `HttpRequest`, hands it to a `Transport`, and interprets the returned
//! `HttpResponse`; nothing here touches the network. `RequestOptions` is the
//! per-call descriptor callers build, created fresh for every call.

use serde::Serialize;
use serde_json::{Number, Value};
use url::form_urlencoded;

use crate::error::ApiError;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// An HTTP request described as plain data.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A primitive query parameter value. `Null` entries are dropped when the
/// query string is rendered.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
    String(String),
    Number(Number),
    Bool(bool),
    Null,
}

impl QueryValue {
    /// Converts a JSON value; arrays and objects have no query form.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(QueryValue::String(s.clone())),
            Value::Number(n) => Some(QueryValue::Number(n.clone())),
            Value::Bool(b) => Some(QueryValue::Bool(*b)),
            Value::Null => Some(QueryValue::Null),
            Value::Array(_) | Value::Object(_) => None,
        }
    }

    fn render(&self) -> Option<String> {
        match self {
            QueryValue::String(s) => Some(s.clone()),
            QueryValue::Number(n) => Some(n.to_string()),
            QueryValue::Bool(b) => Some(b.to_string()),
            QueryValue::Null => None,
        }
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        QueryValue::String(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        QueryValue::String(value)
    }
}

impl From<bool> for QueryValue {
    fn from(value: bool) -> Self {
        QueryValue::Bool(value)
    }
}

impl From<i64> for QueryValue {
    fn from(value: i64) -> Self {
        QueryValue::Number(value.into())
    }
}

impl From<u32> for QueryValue {
    fn from(value: u32) -> Self {
        QueryValue::Number(value.into())
    }
}

impl From<f64> for QueryValue {
    fn from(value: f64) -> Self {
        Number::from_f64(value).map_or(QueryValue::Null, QueryValue::Number)
    }
}

impl<T: Into<QueryValue>> From<Option<T>> for QueryValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(QueryValue::Null, Into::into)
    }
}

/// Per-call request descriptor.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub method: HttpMethod,
    pub body: Option<Value>,
    pub query: Vec<(String, QueryValue)>,
    pub headers: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn new(method: HttpMethod) -> Self {
        Self {
            method,
            ..Default::default()
        }
    }

    pub fn method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    /// Serializes `body` to JSON.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body).map_err(|e| ApiError::encode(e.to_string()))?;
        self.body = Some(value);
        Ok(self)
    }

    pub fn query_param(mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Forwards the fields of a partial query struct. `None` fields and
    /// nested values are skipped.
    pub fn query_from<Q: Serialize + ?Sized>(mut self, query: &Q) -> Result<Self, ApiError> {
        let value = serde_json::to_value(query).map_err(|e| ApiError::encode(e.to_string()))?;
        match value {
            Value::Object(fields) => {
                for (key, field) in &fields {
                    if let Some(value) = QueryValue::from_json(field) {
                        self.query.push((key.clone(), value));
                    }
                }
                Ok(self)
            }
            Value::Null => Ok(self),
            other => Err(ApiError::encode(format!(
                "query must serialize to an object, got {other}"
            ))),
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Renders the query string without the leading `?`; empty when no
    /// defined parameter remains.
    pub fn query_string(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in &self.query {
            if let Some(value) = value.render() {
                serializer.append_pair(key, &value);
            }
        }
        serializer.finish()
    }
}
