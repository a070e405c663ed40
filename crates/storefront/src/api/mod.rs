//! HTTP client for the external MangaVerse API.
//!
//! # Architecture
//!
//! - The API owns inventory, orders, payments and accounts; this client only
//!   calls it. Nothing is retried automatically.
//! - Catalog reads are cached in memory via `moka` (5 minute TTL).
//! - Error bodies of the form `{"message": "..."}` are surfaced verbatim
//!   through [`ApiError::server_message`].
//!
//! # Example
//!
//! ```rust,ignore
//! use mangaverse_storefront::api::ApiClient;
//!
//! let api = ApiClient::new(&config.api)?;
//! let products = api.list_products().await?;
//! let orders = api.my_orders(token).await?;
//! ```

mod catalog;
mod orders;
mod payments;
pub mod types;
mod users;

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

use crate::config::ApiConfig;
use types::Product;

/// Errors that can occur when calling the API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never got a response (connection refused, DNS, timeout).
    #[error("No response from server: {0}")]
    Unreachable(#[source] reqwest::Error),

    /// Reading the response failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("Server error ({status}): {}", .message.as_deref().unwrap_or("no details"))]
    Server { status: u16, message: Option<String> },

    /// The requested resource does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The response body did not have the expected shape.
    #[error("Invalid response: {0}")]
    Parse(String),

    /// The configured base URL cannot have paths appended.
    #[error("Invalid API base URL: {0}")]
    InvalidBaseUrl(String),
}

impl ApiError {
    /// Message supplied by the server in its error body, if any.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Server { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// True if no response was received at all.
    #[must_use]
    pub const fn is_unreachable(&self) -> bool {
        matches!(self, Self::Unreachable(_))
    }
}

/// Error body shape used by the API.
#[derive(serde::Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// Cached catalog values.
#[derive(Debug, Clone)]
enum CacheValue {
    Product(Arc<Product>),
    Products(Arc<Vec<Product>>),
}

/// Client for the MangaVerse API.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    cache: Cache<String, CacheValue>,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL cannot be used as a base or the HTTP
    /// client fails to build.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        if config.base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl(config.base_url.to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.base_url.clone(),
                cache,
            }),
        })
    }

    /// The configured base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Drop all cached catalog data.
    pub fn invalidate_cache(&self) {
        self.inner.cache.invalidate_all();
    }

    /// Build `<base>/<segments...>`, percent-encoding each segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidBaseUrl(self.inner.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn get(&self, segments: &[&str]) -> Result<RequestBuilder, ApiError> {
        Ok(self.inner.client.get(self.endpoint(segments)?))
    }

    fn post(&self, segments: &[&str]) -> Result<RequestBuilder, ApiError> {
        Ok(self.inner.client.post(self.endpoint(segments)?))
    }

    fn put(&self, segments: &[&str]) -> Result<RequestBuilder, ApiError> {
        Ok(self.inner.client.put(self.endpoint(segments)?))
    }

    /// Send a request and decode a JSON success body.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().await.map_err(ApiError::Unreachable)?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.message);
            tracing::debug!(status = status.as_u16(), ?message, "API error response");
            return Err(ApiError::Server {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| ApiError::Parse(e.to_string()))
    }
}

/// Map a 404 server error to [`ApiError::NotFound`].
fn not_found_as(err: ApiError, what: impl FnOnce() -> String) -> ApiError {
    match err {
        ApiError::Server { status, .. } if status == StatusCode::NOT_FOUND.as_u16() => {
            ApiError::NotFound(what())
        }
        other => other,
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::time::Duration;

    use url::Url;

    use super::ApiClient;
    use crate::config::ApiConfig;

    /// A client pointed at a mock server.
    #[allow(clippy::unwrap_used)]
    pub fn client_for(uri: &str) -> ApiClient {
        let config = ApiConfig {
            base_url: Url::parse(&format!("{uri}/api")).unwrap(),
            timeout: Duration::from_secs(5),
        };
        ApiClient::new(&config).unwrap()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_appends_and_encodes_segments() {
        let api = test_support::client_for("http://localhost:5000");
        let url = api.endpoint(&["products", "a b/c"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/api/products/a%20b%2Fc");
    }

    #[test]
    fn trailing_slash_base_is_handled() {
        let config = ApiConfig {
            base_url: Url::parse("http://localhost:5000/api/").unwrap(),
            timeout: Duration::from_secs(1),
        };
        let api = ApiClient::new(&config).unwrap();
        let url = api.endpoint(&["orders", "myorders"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/api/orders/myorders");
    }

    #[test]
    fn rejects_non_base_urls() {
        let config = ApiConfig {
            base_url: Url::parse("mailto:shop@mangaverse.io").unwrap(),
            timeout: Duration::from_secs(1),
        };
        assert!(matches!(
            ApiClient::new(&config),
            Err(ApiError::InvalidBaseUrl(_))
        ));
    }

    #[test]
    fn server_message_is_exposed() {
        let err = ApiError::Server {
            status: 400,
            message: Some("Out of stock".to_string()),
        };
        assert_eq!(err.server_message(), Some("Out of stock"));
        assert_eq!(err.to_string(), "Server error (400): Out of stock");
    }
}
