//! Remote gateway: the request/response seam to the storefront services.
//!
//! The core consumes this interface; it never owns the transport. The
//! [`RemoteGateway`] trait mirrors the catalog, cart, wishlist, and order
//! endpoints, and every call resolves to either a success payload or a
//! [`GatewayError`] classification. Tests script the trait directly; the
//! production implementation is [`HttpGateway`].

mod http;

pub use http::HttpGateway;

use thiserror::Error;

use shopsync_core::{
    CartLine, Order, OrderDraft, OrderId, OrderStatus, Product, ProductDraft, ProductId,
    ProductPatch, SessionIdentity, WishlistEntry,
};

/// Gateway failure classification.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The service rejected the credentials (or their absence).
    #[error("Unauthorized")]
    Unauthorized,

    /// The addressed entity does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The service rejected the request payload.
    #[error("Validation rejected: {0}")]
    Validation(String),

    /// No response was obtained: connection refused, DNS failure, timeout.
    #[error("Service unreachable: {0}")]
    Unreachable(String),

    /// The service asked us to back off.
    #[error("Rate limited, retry after {0}s")]
    RateLimited(u64),

    /// Anything the taxonomy does not cover.
    #[error("Unexpected response: {0}")]
    Unknown(String),
}

impl GatewayError {
    /// Whether this failure came from the transport rather than the
    /// service itself.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Unreachable(_))
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() || e.is_connect() {
            Self::Unreachable(e.to_string())
        } else if e.is_decode() {
            Self::Unknown(format!("malformed response body: {e}"))
        } else {
            Self::Unknown(e.to_string())
        }
    }
}

/// The remote order/user/product services, as one transport-agnostic
/// interface.
///
/// Cart and wishlist endpoints are scoped to a [`SessionIdentity`]; the
/// executor refuses those mutations locally when no session is present, so
/// implementations may assume the identity is meaningful.
pub trait RemoteGateway: Send + Sync {
    // Catalog

    fn list_products(
        &self,
    ) -> impl Future<Output = Result<Vec<Product>, GatewayError>> + Send;

    fn get_product(
        &self,
        id: ProductId,
    ) -> impl Future<Output = Result<Product, GatewayError>> + Send;

    fn create_product(
        &self,
        draft: &ProductDraft,
    ) -> impl Future<Output = Result<Product, GatewayError>> + Send;

    fn update_product(
        &self,
        id: ProductId,
        patch: &ProductPatch,
    ) -> impl Future<Output = Result<Product, GatewayError>> + Send;

    fn delete_product(
        &self,
        id: ProductId,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;

    fn search_products(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<Vec<Product>, GatewayError>> + Send;

    // Cart

    fn fetch_cart(
        &self,
        session: &SessionIdentity,
    ) -> impl Future<Output = Result<Vec<CartLine>, GatewayError>> + Send;

    fn add_cart_line(
        &self,
        session: &SessionIdentity,
        product_id: ProductId,
        quantity: u32,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;

    fn remove_cart_line(
        &self,
        session: &SessionIdentity,
        product_id: ProductId,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;

    fn update_cart_line(
        &self,
        session: &SessionIdentity,
        product_id: ProductId,
        quantity: u32,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;

    // Wishlist

    fn fetch_wishlist(
        &self,
        session: &SessionIdentity,
    ) -> impl Future<Output = Result<Vec<WishlistEntry>, GatewayError>> + Send;

    fn add_wishlist_entry(
        &self,
        session: &SessionIdentity,
        product_id: ProductId,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;

    fn remove_wishlist_entry(
        &self,
        session: &SessionIdentity,
        product_id: ProductId,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;

    // Orders

    fn create_order(
        &self,
        session: &SessionIdentity,
        draft: &OrderDraft,
    ) -> impl Future<Output = Result<Order, GatewayError>> + Send;

    fn list_orders(
        &self,
        session: &SessionIdentity,
    ) -> impl Future<Output = Result<Vec<Order>, GatewayError>> + Send;

    fn get_order(
        &self,
        id: OrderId,
    ) -> impl Future<Output = Result<Order, GatewayError>> + Send;

    fn update_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> impl Future<Output = Result<Order, GatewayError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_classification() {
        assert!(GatewayError::Unreachable("connection refused".to_string()).is_transport());
        assert!(!GatewayError::Unauthorized.is_transport());
        assert!(!GatewayError::NotFound("order 4".to_string()).is_transport());
    }

    #[test]
    fn test_error_display() {
        assert_eq!(GatewayError::Unauthorized.to_string(), "Unauthorized");
        assert_eq!(
            GatewayError::RateLimited(3).to_string(),
            "Rate limited, retry after 3s"
        );
    }
}
