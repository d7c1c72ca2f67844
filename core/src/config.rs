//! Client configuration.
//!
//! # Data Flow
//! ```text
//! defaults
//!     → optional TOML file (`[client]` table)
//!     → CONNECTWON_API_* environment variables
//!     → ClientConfig (validated, immutable once handed to ApiClient)
//! ```

use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::token::{TokenProvider, TokenSource};

pub const DEFAULT_BASE_URL: &str = "/api";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(30_000);
pub const DEFAULT_RETRIES: u32 = 3;

pub const ENV_BASE_URL: &str = "CONNECTWON_API_URL";
pub const ENV_TOKEN: &str = "CONNECTWON_API_TOKEN";
pub const ENV_TIMEOUT_MS: &str = "CONNECTWON_API_TIMEOUT_MS";
pub const ENV_RETRIES: &str = "CONNECTWON_API_RETRIES";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("{name} must be a non-negative integer, got {value:?}")]
    InvalidNumber { name: String, value: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Settings for an `ApiClient`.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    base_url: String,
    token: TokenSource,
    timeout: Duration,
    retries: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: TokenSource::None,
            timeout: DEFAULT_TIMEOUT,
            retries: DEFAULT_RETRIES,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self::default().with_base_url(base_url)
    }

    /// Trailing slashes are stripped, so `"/"` leaves an empty base URL
    /// that `validate` rejects.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = TokenSource::Static(token.into());
        self
    }

    pub fn with_token_provider(mut self, provider: impl TokenProvider + 'static) -> Self {
        self.token = TokenSource::provider(provider);
        self
    }

    pub fn with_token_source(mut self, token: TokenSource) -> Self {
        self.token = token;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token(&self) -> &TokenSource {
        &self.token
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn retries(&self) -> u32 {
        self.retries
    }

    /// Defaults overridden by the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().merge_env(|name| env::var(name).ok())
    }

    /// Load a TOML file, then apply environment overrides.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)?.merge_env(|name| env::var(name).ok())
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let file: FileConfig = toml::from_str(content)?;
        let client = file.client;
        let mut config = Self::default();

        if let Some(base_url) = client.base_url {
            config = config.with_base_url(&base_url);
        }
        if let Some(token) = client.token {
            config = config.with_token(token);
        }
        if let Some(timeout_ms) = client.timeout_ms {
            config.timeout = Duration::from_millis(timeout_ms);
        }
        if let Some(retries) = client.retries {
            config.retries = retries;
        }

        config.validate()?;
        Ok(config)
    }

    fn merge_env(mut self, var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        if let Some(base_url) = var(ENV_BASE_URL) {
            self = self.with_base_url(&base_url);
        }
        if let Some(token) = var(ENV_TOKEN) {
            self = self.with_token(token);
        }
        if let Some(value) = var(ENV_TIMEOUT_MS) {
            self.timeout = Duration::from_millis(parse_number(ENV_TIMEOUT_MS, &value)?);
        }
        if let Some(value) = var(ENV_RETRIES) {
            let retries = parse_number(ENV_RETRIES, &value)?;
            self.retries = u32::try_from(retries).map_err(|_| ConfigError::InvalidNumber {
                name: ENV_RETRIES.to_string(),
                value,
            })?;
        }

        self.validate()?;
        Ok(self)
    }

    /// Rejects an empty base URL and a zero timeout. The file and
    /// environment loaders run this; `ApiClient::new` runs it too.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.is_empty() {
            return Err(ConfigError::Invalid("base_url must not be empty".to_string()));
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::Invalid("timeout must be greater than zero".to_string()));
        }
        Ok(())
    }
}

fn parse_number(name: &str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidNumber {
        name: name.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    client: FileClientConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileClientConfig {
    base_url: Option<String>,
    token: Option<String>,
    timeout_ms: Option<u64>,
    retries: Option<u32>,
}
