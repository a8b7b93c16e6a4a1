//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional; defaults point at the local development services.
//!
//! - `SHOPSYNC_CATALOG_URL` - Product service endpoint (default: `http://localhost:8082/product`)
//! - `SHOPSYNC_CART_URL` - Cart service endpoint (default: `http://localhost:8083/cart`)
//! - `SHOPSYNC_WISHLIST_URL` - Wishlist service endpoint (default: `http://localhost:8082/wishlist`)
//! - `SHOPSYNC_ORDER_URL` - Order service endpoint (default: `http://localhost:8083/order`)
//! - `SHOPSYNC_API_TOKEN` - Bearer token for catalog/order admin calls
//! - `SHOPSYNC_REQUEST_TIMEOUT_MS` - Gateway request timeout (default: 10000)
//! - `SHOPSYNC_SEARCH_DEBOUNCE_MS` - Search quiet-period window (default: 300)
//! - `SHOPSYNC_MIN_QUERY_LEN` - Minimum search query length (default: 2)

use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_CATALOG_URL: &str = "http://localhost:8082/product";
const DEFAULT_CART_URL: &str = "http://localhost:8083/cart";
const DEFAULT_WISHLIST_URL: &str = "http://localhost:8082/wishlist";
const DEFAULT_ORDER_URL: &str = "http://localhost:8083/order";
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 300;
const DEFAULT_MIN_QUERY_LEN: usize = 2;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Client configuration.
#[derive(Clone)]
pub struct ClientConfig {
    /// Product service base endpoint.
    pub catalog_url: Url,
    /// Cart service base endpoint.
    pub cart_url: Url,
    /// Wishlist service base endpoint.
    pub wishlist_url: Url,
    /// Order service base endpoint.
    pub order_url: Url,
    /// Bearer token for calls not scoped to a session identity.
    pub api_token: Option<SecretString>,
    /// Per-request gateway timeout; expiry feeds the rollback path.
    pub request_timeout: Duration,
    /// Search quiet-period window.
    pub debounce_window: Duration,
    /// Queries shorter than this never reach the network.
    pub min_query_len: usize,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("catalog_url", &self.catalog_url.as_str())
            .field("cart_url", &self.cart_url.as_str())
            .field("wishlist_url", &self.wishlist_url.as_str())
            .field("order_url", &self.order_url.as_str())
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .field("request_timeout", &self.request_timeout)
            .field("debounce_window", &self.debounce_window)
            .field("min_query_len", &self.min_query_len)
            .finish()
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        // The defaults are compile-time constants; parsing cannot fail.
        #[allow(clippy::unwrap_used)]
        Self {
            catalog_url: Url::parse(DEFAULT_CATALOG_URL).unwrap(),
            cart_url: Url::parse(DEFAULT_CART_URL).unwrap(),
            wishlist_url: Url::parse(DEFAULT_WISHLIST_URL).unwrap(),
            order_url: Url::parse(DEFAULT_ORDER_URL).unwrap(),
            api_token: None,
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
            debounce_window: Duration::from_millis(DEFAULT_SEARCH_DEBOUNCE_MS),
            min_query_len: DEFAULT_MIN_QUERY_LEN,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables, falling back to the
    /// local development defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a set variable fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            catalog_url: env_url("SHOPSYNC_CATALOG_URL", defaults.catalog_url)?,
            cart_url: env_url("SHOPSYNC_CART_URL", defaults.cart_url)?,
            wishlist_url: env_url("SHOPSYNC_WISHLIST_URL", defaults.wishlist_url)?,
            order_url: env_url("SHOPSYNC_ORDER_URL", defaults.order_url)?,
            api_token: std::env::var("SHOPSYNC_API_TOKEN")
                .ok()
                .filter(|t| !t.is_empty())
                .map(SecretString::from),
            request_timeout: Duration::from_millis(env_parse(
                "SHOPSYNC_REQUEST_TIMEOUT_MS",
                DEFAULT_REQUEST_TIMEOUT_MS,
            )?),
            debounce_window: Duration::from_millis(env_parse(
                "SHOPSYNC_SEARCH_DEBOUNCE_MS",
                DEFAULT_SEARCH_DEBOUNCE_MS,
            )?),
            min_query_len: env_parse("SHOPSYNC_MIN_QUERY_LEN", DEFAULT_MIN_QUERY_LEN)?,
        })
    }
}

fn env_url(name: &str, default: Url) -> Result<Url, ConfigError> {
    match std::env::var(name) {
        Ok(raw) => {
            Url::parse(&raw).map_err(|e| ConfigError::InvalidEnvVar(name.to_string(), e.to_string()))
        }
        Err(_) => Ok(default),
    }
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidEnvVar(name.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.catalog_url.as_str(), DEFAULT_CATALOG_URL);
        assert_eq!(config.debounce_window, Duration::from_millis(300));
        assert_eq!(config.min_query_len, 2);
        assert!(config.api_token.is_none());
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = ClientConfig {
            api_token: Some(SecretString::from("super-secret")),
            ..ClientConfig::default()
        };
        let debug = format!("{config:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("super-secret"));
    }
}
