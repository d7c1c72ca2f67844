//! Async typed client for the ConnectWon care-platform API.
//!
//! # Overview
//! `ApiClient` turns typed calls such as `client.programs().activate(id)`
//! into JSON-over-HTTP requests against the backend, unwraps the backend's
//! `{ data: ... }` success envelope, and maps its `{ error: ... }` envelope
//! into `ApiError`.
//!
//! # Design
//! - One attempt (`ApiClient::execute`) is separated from the retry policy
//!   (`ApiClient::request`), which re-issues requests that failed with a
//!   transient status (408, 429, 500, 502, 503, 504) or a transport failure,
//!   waiting `2^attempt` seconds in between.
//! - The network is behind the `Transport` trait; `ReqwestTransport` is the
//!   default and tests substitute a scripted one.
//! - The client holds no mutable state. Concurrent calls are independent and
//!   each carries its own timeout.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod resources;
pub mod token;
pub mod transport;
pub mod types;
pub mod value;

pub use client::{normalize_response, ApiClient};
pub use config::{ClientConfig, ConfigError};
pub use error::{ApiError, ErrorKind};
pub use http::{HttpMethod, HttpRequest, HttpResponse, QueryValue, RequestOptions};
pub use token::{TokenProvider, TokenSource};
pub use transport::{ReqwestTransport, Transport, TransportError};
pub use value::{Email, PhoneNumber, ValueError, Won};
