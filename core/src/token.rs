//! Bearer token sources.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

/// Produces the current bearer token on demand. Returning `None` sends the
/// request unauthenticated.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn token(&self) -> Option<String>;
}

#[async_trait]
impl<F, Fut> TokenProvider for F
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Option<String>> + Send + 'static,
{
    async fn token(&self) -> Option<String> {
        (self)().await
    }
}

/// Where the client gets its bearer token from.
#[derive(Clone, Default)]
pub enum TokenSource {
    #[default]
    None,
    Static(String),
    Provider(Arc<dyn TokenProvider>),
}

impl TokenSource {
    pub fn provider(provider: impl TokenProvider + 'static) -> Self {
        TokenSource::Provider(Arc::new(provider))
    }

    /// Resolves the token for one request. Empty tokens count as absent.
    pub async fn resolve(&self) -> Option<String> {
        let token = match self {
            TokenSource::None => None,
            TokenSource::Static(token) => Some(token.clone()),
            TokenSource::Provider(provider) => provider.token().await,
        };
        token.filter(|token| !token.is_empty())
    }
}

impl fmt::Debug for TokenSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenSource::None => write!(f, "None"),
            TokenSource::Static(_) => write!(f, "Static(<redacted>)"),
            TokenSource::Provider(_) => write!(f, "Provider(..)"),
        }
    }
}
