//! HTTP implementation of the remote gateway over `reqwest`.
//!
//! Maps HTTP status codes onto the [`GatewayError`] taxonomy and caches
//! catalog reads with `moka` (5-minute TTL). Cart, wishlist, and order
//! state is mutable per user and is never cached.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, instrument};
use url::Url;

use shopsync_core::{
    CartLine, Order, OrderDraft, OrderId, OrderStatus, Product, ProductDraft, ProductId,
    ProductPatch, SessionIdentity, WishlistEntry,
};

use crate::config::ClientConfig;
use crate::gateway::{GatewayError, RemoteGateway};

const CACHE_CAPACITY: u64 = 1000;
const CACHE_TTL: Duration = Duration::from_secs(300);
const PRODUCT_LIST_KEY: &str = "products:all";

#[derive(Clone)]
enum CacheValue {
    Product(Box<Product>),
    Products(Vec<Product>),
}

/// Client for the storefront's remote services.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct HttpGateway {
    inner: Arc<HttpGatewayInner>,
}

struct HttpGatewayInner {
    client: reqwest::Client,
    catalog: String,
    cart: String,
    wishlist: String,
    orders: String,
    api_token: Option<SecretString>,
    cache: Cache<String, CacheValue>,
}

fn base(url: &Url) -> String {
    url.as_str().trim_end_matches('/').to_string()
}

fn truncate(body: &str) -> String {
    body.chars().take(200).collect()
}

impl HttpGateway {
    /// Create a gateway from client configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| GatewayError::Unknown(format!("failed to build HTTP client: {e}")))?;

        let cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(CACHE_TTL)
            .build();

        Ok(Self {
            inner: Arc::new(HttpGatewayInner {
                client,
                catalog: base(&config.catalog_url),
                cart: base(&config.cart_url),
                wishlist: base(&config.wishlist_url),
                orders: base(&config.order_url),
                api_token: config.api_token.clone(),
                cache,
            }),
        })
    }

    fn authed(
        req: reqwest::RequestBuilder,
        token: Option<&SecretString>,
    ) -> reqwest::RequestBuilder {
        match token {
            Some(token) => req.bearer_auth(token.expose_secret()),
            None => req,
        }
    }

    /// Send a request and map the response status onto the error taxonomy.
    async fn send(req: reqwest::RequestBuilder) -> Result<reqwest::Response, GatewayError> {
        let response = req.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(GatewayError::RateLimited(retry_after));
        }

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(match status.as_u16() {
            401 | 403 => GatewayError::Unauthorized,
            404 => GatewayError::NotFound(truncate(&body)),
            400 | 422 => GatewayError::Validation(truncate(&body)),
            _ => GatewayError::Unknown(format!("HTTP {status}: {}", truncate(&body))),
        })
    }

    async fn send_json<T: DeserializeOwned>(
        req: reqwest::RequestBuilder,
    ) -> Result<T, GatewayError> {
        Ok(Self::send(req).await?.json().await?)
    }

    async fn invalidate_product(&self, id: ProductId) {
        self.inner.cache.invalidate(&format!("product:{id}")).await;
        self.inner
            .cache
            .invalidate(&PRODUCT_LIST_KEY.to_string())
            .await;
    }
}

impl RemoteGateway for HttpGateway {
    // =========================================================================
    // Catalog (reads cached - replaced wholesale on writes)
    // =========================================================================

    #[instrument(skip(self))]
    async fn list_products(&self) -> Result<Vec<Product>, GatewayError> {
        let key = PRODUCT_LIST_KEY.to_string();
        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for product list");
            return Ok(products);
        }

        let req = Self::authed(
            self.inner.client.get(&self.inner.catalog),
            self.inner.api_token.as_ref(),
        );
        let products: Vec<Product> = Self::send_json(req).await?;

        self.inner
            .cache
            .insert(key, CacheValue::Products(products.clone()))
            .await;
        Ok(products)
    }

    #[instrument(skip(self))]
    async fn get_product(&self, id: ProductId) -> Result<Product, GatewayError> {
        let key = format!("product:{id}");
        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let url = format!("{}/{id}", self.inner.catalog);
        let req = Self::authed(self.inner.client.get(url), self.inner.api_token.as_ref());
        let product: Product = Self::send_json(req).await?;

        self.inner
            .cache
            .insert(key, CacheValue::Product(Box::new(product.clone())))
            .await;
        Ok(product)
    }

    #[instrument(skip(self, draft))]
    async fn create_product(&self, draft: &ProductDraft) -> Result<Product, GatewayError> {
        let req = Self::authed(
            self.inner.client.post(&self.inner.catalog).json(draft),
            self.inner.api_token.as_ref(),
        );
        let product: Product = Self::send_json(req).await?;
        self.invalidate_product(product.id).await;
        Ok(product)
    }

    #[instrument(skip(self, patch))]
    async fn update_product(
        &self,
        id: ProductId,
        patch: &ProductPatch,
    ) -> Result<Product, GatewayError> {
        let url = format!("{}/{id}", self.inner.catalog);
        let req = Self::authed(
            self.inner.client.put(url).json(patch),
            self.inner.api_token.as_ref(),
        );
        let product: Product = Self::send_json(req).await?;
        self.invalidate_product(id).await;
        Ok(product)
    }

    #[instrument(skip(self))]
    async fn delete_product(&self, id: ProductId) -> Result<(), GatewayError> {
        let url = format!("{}/{id}", self.inner.catalog);
        let req = Self::authed(self.inner.client.delete(url), self.inner.api_token.as_ref());
        Self::send(req).await?;
        self.invalidate_product(id).await;
        Ok(())
    }

    // Search responses track live queries and are never cached.
    #[instrument(skip(self))]
    async fn search_products(&self, query: &str) -> Result<Vec<Product>, GatewayError> {
        let url = format!("{}/search", self.inner.catalog);
        let req = Self::authed(
            self.inner.client.get(url).query(&[("query", query)]),
            self.inner.api_token.as_ref(),
        );
        Self::send_json(req).await
    }

    // =========================================================================
    // Cart (not cached - mutable per-user state)
    // =========================================================================

    #[instrument(skip(self, session), fields(user_id = %session.user_id()))]
    async fn fetch_cart(&self, session: &SessionIdentity) -> Result<Vec<CartLine>, GatewayError> {
        let url = format!("{}/{}", self.inner.cart, session.user_id());
        let req = Self::authed(self.inner.client.get(url), Some(session.token()));
        Self::send_json(req).await
    }

    #[instrument(skip(self, session), fields(user_id = %session.user_id()))]
    async fn add_cart_line(
        &self,
        session: &SessionIdentity,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<(), GatewayError> {
        let url = format!("{}/{}/add", self.inner.cart, session.user_id());
        let body = json!({ "productId": product_id, "quantity": quantity });
        let req = Self::authed(self.inner.client.post(url).json(&body), Some(session.token()));
        Self::send(req).await?;
        Ok(())
    }

    #[instrument(skip(self, session), fields(user_id = %session.user_id()))]
    async fn remove_cart_line(
        &self,
        session: &SessionIdentity,
        product_id: ProductId,
    ) -> Result<(), GatewayError> {
        let url = format!(
            "{}/{}/delete/{product_id}",
            self.inner.cart,
            session.user_id()
        );
        let req = Self::authed(self.inner.client.delete(url), Some(session.token()));
        Self::send(req).await?;
        Ok(())
    }

    #[instrument(skip(self, session), fields(user_id = %session.user_id()))]
    async fn update_cart_line(
        &self,
        session: &SessionIdentity,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<(), GatewayError> {
        let url = format!(
            "{}/{}/update/{product_id}",
            self.inner.cart,
            session.user_id()
        );
        let req = Self::authed(
            self.inner.client.put(url).query(&[("quantity", quantity)]),
            Some(session.token()),
        );
        Self::send(req).await?;
        Ok(())
    }

    // =========================================================================
    // Wishlist (not cached - mutable per-user state)
    // =========================================================================

    #[instrument(skip(self, session), fields(user_id = %session.user_id()))]
    async fn fetch_wishlist(
        &self,
        session: &SessionIdentity,
    ) -> Result<Vec<WishlistEntry>, GatewayError> {
        let url = format!("{}/{}", self.inner.wishlist, session.user_id());
        let req = Self::authed(self.inner.client.get(url), Some(session.token()));
        Self::send_json(req).await
    }

    #[instrument(skip(self, session), fields(user_id = %session.user_id()))]
    async fn add_wishlist_entry(
        &self,
        session: &SessionIdentity,
        product_id: ProductId,
    ) -> Result<(), GatewayError> {
        let url = format!("{}/{}/add", self.inner.wishlist, session.user_id());
        let body = json!({ "productId": product_id });
        let req = Self::authed(self.inner.client.post(url).json(&body), Some(session.token()));
        Self::send(req).await?;
        Ok(())
    }

    #[instrument(skip(self, session), fields(user_id = %session.user_id()))]
    async fn remove_wishlist_entry(
        &self,
        session: &SessionIdentity,
        product_id: ProductId,
    ) -> Result<(), GatewayError> {
        let url = format!(
            "{}/{}/remove/{product_id}",
            self.inner.wishlist,
            session.user_id()
        );
        let req = Self::authed(self.inner.client.delete(url), Some(session.token()));
        Self::send(req).await?;
        Ok(())
    }

    // =========================================================================
    // Orders
    // =========================================================================

    #[instrument(skip(self, session, draft), fields(user_id = %session.user_id()))]
    async fn create_order(
        &self,
        session: &SessionIdentity,
        draft: &OrderDraft,
    ) -> Result<Order, GatewayError> {
        let req = Self::authed(
            self.inner.client.post(&self.inner.orders).json(draft),
            Some(session.token()),
        );
        Self::send_json(req).await
    }

    #[instrument(skip(self, session), fields(user_id = %session.user_id()))]
    async fn list_orders(&self, session: &SessionIdentity) -> Result<Vec<Order>, GatewayError> {
        let url = format!("{}/user/{}", self.inner.orders, session.user_id());
        let req = Self::authed(self.inner.client.get(url), Some(session.token()));
        Self::send_json(req).await
    }

    #[instrument(skip(self))]
    async fn get_order(&self, id: OrderId) -> Result<Order, GatewayError> {
        let url = format!("{}/{id}", self.inner.orders);
        let req = Self::authed(self.inner.client.get(url), self.inner.api_token.as_ref());
        Self::send_json(req).await
    }

    #[instrument(skip(self))]
    async fn update_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, GatewayError> {
        let url = format!("{}/{id}/status", self.inner.orders);
        let body = json!({ "status": status.as_str() });
        let req = Self::authed(
            self.inner.client.patch(url).json(&body),
            self.inner.api_token.as_ref(),
        );
        Self::send_json(req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_trims_trailing_slash() {
        let url = Url::parse("http://localhost:8082/product/").unwrap();
        assert_eq!(base(&url), "http://localhost:8082/product");
        let url = Url::parse("http://localhost:8082/product").unwrap();
        assert_eq!(base(&url), "http://localhost:8082/product");
    }

    #[test]
    fn test_truncate_caps_body() {
        let long = "x".repeat(500);
        assert_eq!(truncate(&long).len(), 200);
    }

    #[test]
    fn test_gateway_builds_from_default_config() {
        let config = ClientConfig::default();
        assert!(HttpGateway::new(&config).is_ok());
    }
}
