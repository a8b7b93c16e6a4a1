//! The storefront service: optimistic mutations against the reactive store.
//!
//! Every cart/wishlist mutation follows one protocol:
//!
//! 1. Capture the section's value from the current snapshot.
//! 2. Commit the locally computed result via `replace` - synchronous and
//!    immediately observable.
//! 3. Issue the corresponding remote write.
//! 4. On success, keep the optimistic value; on failure, commit the
//!    captured value back, emit one notification, and return the error.
//!
//! The cart slice is mirrored to [`CartStorage`] after every commit,
//! including rollbacks, so the persisted cart always matches the in-memory
//! one. Mutations that require a session identity and find none are
//! refused before step 2 - no optimistic update, no network call.
//!
//! Catalog writes are admin-facing and confirm-then-commit instead: the
//! store only changes once the server has acknowledged, and the server's
//! canonical payload (including a newly assigned identifier) is what gets
//! committed.

use std::pin::Pin;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::instrument;

use shopsync_core::{
    CartLine, Order, OrderDraft, OrderId, OrderStatus, Product, ProductDraft, ProductId,
    ProductPatch, SessionIdentity,
};

use crate::error::{ClientError, Result};
use crate::gateway::{GatewayError, RemoteGateway};
use crate::notify::{NotificationKind, Notifier};
use crate::persist::CartStorage;
use crate::store::{ReactiveStore, Section, SectionValue, Snapshot};

/// Client-side storefront service.
///
/// Owns the reactive store and drives all mutations against it. Cheaply
/// cloneable; clones share the same store, session, and storage.
pub struct StorefrontService<G, S> {
    inner: Arc<ServiceInner<G, S>>,
}

impl<G, S> Clone for StorefrontService<G, S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct ServiceInner<G, S> {
    gateway: G,
    storage: S,
    store: ReactiveStore,
    session: RwLock<Option<SessionIdentity>>,
    notifier: Notifier,
}

// =============================================================================
// Pure cart computations
// =============================================================================

fn with_added_line(mut lines: Vec<CartLine>, product: Product, quantity: u32) -> Vec<CartLine> {
    // At most one line per product: a repeat add increments in place.
    if let Some(line) = lines.iter_mut().find(|l| l.product.id == product.id) {
        line.quantity = line.quantity.saturating_add(quantity);
    } else {
        lines.push(CartLine::new(product, quantity));
    }
    lines
}

fn without_line(lines: Vec<CartLine>, product_id: ProductId) -> Vec<CartLine> {
    lines
        .into_iter()
        .filter(|line| line.product.id != product_id)
        .collect()
}

fn with_quantity(mut lines: Vec<CartLine>, product_id: ProductId, quantity: u32) -> Vec<CartLine> {
    for line in &mut lines {
        if line.product.id == product_id {
            line.quantity = quantity;
        }
    }
    lines
}

fn validate_rating(rating: Option<f32>) -> Result<()> {
    if let Some(r) = rating
        && !(0.0..=5.0).contains(&r)
    {
        return Err(ClientError::Validation(format!(
            "rating must be within [0, 5], got {r}"
        )));
    }
    Ok(())
}

impl<G: RemoteGateway, S: CartStorage> StorefrontService<G, S> {
    /// Create a service over the given gateway and cart storage.
    ///
    /// The store starts empty; call [`hydrate`](Self::hydrate) to load the
    /// persisted cart and remote state.
    #[must_use]
    pub fn new(gateway: G, storage: S, notifier: Notifier) -> Self {
        Self {
            inner: Arc::new(ServiceInner {
                gateway,
                storage,
                store: ReactiveStore::new(),
                session: RwLock::new(None),
                notifier,
            }),
        }
    }

    /// The reactive store backing this service.
    #[must_use]
    pub fn store(&self) -> &ReactiveStore {
        &self.inner.store
    }

    /// Convenience read of the current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        self.inner.store.read()
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// The current session identity, if any.
    #[must_use]
    pub fn session(&self) -> Option<SessionIdentity> {
        self.inner
            .session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Install a session identity; gated mutations become available.
    pub fn set_session(&self, session: SessionIdentity) {
        *self
            .inner
            .session
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(session);
    }

    /// Drop the session identity and empty both gated sections, mirroring
    /// the cleared cart to storage.
    pub fn clear_session(&self) {
        *self
            .inner
            .session
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
        self.inner.store.replace(SectionValue::Cart(Vec::new()));
        self.persist_cart();
        self.inner.store.replace(SectionValue::Wishlist(Vec::new()));
    }

    fn require_session(&self) -> Result<SessionIdentity> {
        self.session().ok_or(ClientError::Unauthorized)
    }

    // =========================================================================
    // Optimistic mutation protocol
    // =========================================================================

    /// Mirror the current in-memory cart to storage. Persistence failures
    /// are logged, never propagated: the mutation already committed.
    fn persist_cart(&self) {
        let cart = self.inner.store.read().cart;
        if let Err(e) = self.inner.storage.save(&cart) {
            tracing::warn!(error = %e, "Failed to persist cart");
        }
    }

    /// Commit `optimistic`, await the remote write, and either keep the
    /// commit or roll back to `previous` exactly as captured.
    async fn commit_and_reconcile<Fut>(
        &self,
        previous: SectionValue,
        optimistic: SectionValue,
        remote: Fut,
        kind: NotificationKind,
        failure_message: &str,
    ) -> Result<()>
    where
        Fut: Future<Output = std::result::Result<(), GatewayError>>,
    {
        let is_cart = optimistic.section() == Section::Cart;

        self.inner.store.replace(optimistic);
        if is_cart {
            self.persist_cart();
        }

        match remote.await {
            Ok(()) => Ok(()),
            Err(e) => {
                tracing::warn!(error = %e, "Remote write failed, rolling back");
                self.inner.store.replace(previous);
                if is_cart {
                    self.persist_cart();
                }
                self.inner.notifier.error(kind, failure_message);
                Err(ClientError::Remote(e))
            }
        }
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Add a product to the cart, incrementing the existing line if one is
    /// present.
    ///
    /// # Errors
    ///
    /// [`ClientError::Unauthorized`] without a session,
    /// [`ClientError::Validation`] for a zero quantity, or
    /// [`ClientError::Remote`] after rollback.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn add_to_cart(&self, product: Product, quantity: u32) -> Result<()> {
        let session = self.require_session()?;
        if quantity == 0 {
            return Err(ClientError::Validation(
                "quantity must be positive".to_string(),
            ));
        }

        let previous = self.inner.store.read().cart;
        let optimistic = with_added_line(previous.clone(), product.clone(), quantity);
        let remote = self
            .inner
            .gateway
            .add_cart_line(&session, product.id, quantity);

        self.commit_and_reconcile(
            SectionValue::Cart(previous),
            SectionValue::Cart(optimistic),
            remote,
            NotificationKind::Cart,
            "Failed to add item to cart. Please try again.",
        )
        .await
    }

    /// Remove a product's line from the cart.
    ///
    /// # Errors
    ///
    /// [`ClientError::Unauthorized`] without a session, or
    /// [`ClientError::Remote`] after rollback.
    #[instrument(skip(self))]
    pub async fn remove_from_cart(&self, product_id: ProductId) -> Result<()> {
        let session = self.require_session()?;

        let previous = self.inner.store.read().cart;
        let optimistic = without_line(previous.clone(), product_id);
        let remote = self.inner.gateway.remove_cart_line(&session, product_id);

        self.commit_and_reconcile(
            SectionValue::Cart(previous),
            SectionValue::Cart(optimistic),
            remote,
            NotificationKind::Cart,
            "Failed to remove item from cart.",
        )
        .await
    }

    /// Set the quantity of a cart line. A quantity of zero is removal and
    /// routes through [`remove_from_cart`](Self::remove_from_cart).
    ///
    /// # Errors
    ///
    /// [`ClientError::Unauthorized`] without a session, or
    /// [`ClientError::Remote`] after rollback.
    #[instrument(skip(self))]
    pub async fn set_quantity(&self, product_id: ProductId, quantity: u32) -> Result<()> {
        if quantity == 0 {
            return self.remove_from_cart(product_id).await;
        }
        let session = self.require_session()?;

        let previous = self.inner.store.read().cart;
        let optimistic = with_quantity(previous.clone(), product_id, quantity);
        let remote = self
            .inner
            .gateway
            .update_cart_line(&session, product_id, quantity);

        self.commit_and_reconcile(
            SectionValue::Cart(previous),
            SectionValue::Cart(optimistic),
            remote,
            NotificationKind::Cart,
            "Failed to update cart quantity.",
        )
        .await
    }

    /// Empty the cart. There is no bulk endpoint; each line is deleted
    /// remotely, and any failure rolls back the whole mutation.
    ///
    /// # Errors
    ///
    /// [`ClientError::Unauthorized`] without a session, or
    /// [`ClientError::Remote`] after rollback.
    #[instrument(skip(self))]
    pub async fn clear_cart(&self) -> Result<()> {
        let session = self.require_session()?;

        let previous = self.inner.store.read().cart;
        let ids: Vec<ProductId> = previous.iter().map(|line| line.product.id).collect();
        let gateway = &self.inner.gateway;
        let remote = async move {
            for product_id in ids {
                gateway.remove_cart_line(&session, product_id).await?;
            }
            Ok(())
        };

        self.commit_and_reconcile(
            SectionValue::Cart(previous),
            SectionValue::Cart(Vec::new()),
            remote,
            NotificationKind::Cart,
            "Failed to clear cart.",
        )
        .await
    }

    // =========================================================================
    // Wishlist
    // =========================================================================

    /// Toggle a product's wishlist membership.
    ///
    /// Membership is computed once against the captured snapshot; the
    /// add/remove branch is fixed at entry and not re-evaluated even if a
    /// concurrent mutation changes membership mid-flight (last caller
    /// wins).
    ///
    /// # Errors
    ///
    /// [`ClientError::Unauthorized`] without a session, or
    /// [`ClientError::Remote`] after rollback.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn toggle_wishlist(&self, product: Product) -> Result<()> {
        let session = self.require_session()?;

        let previous = self.inner.store.read().wishlist;
        let present = previous.iter().any(|entry| entry.id == product.id);
        let product_id = product.id;

        let optimistic = if present {
            previous
                .iter()
                .filter(|entry| entry.id != product_id)
                .cloned()
                .collect()
        } else {
            let mut entries = previous.clone();
            entries.push(product);
            entries
        };

        let remote: Pin<Box<dyn Future<Output = std::result::Result<(), GatewayError>> + Send + '_>> =
            if present {
                Box::pin(self.inner.gateway.remove_wishlist_entry(&session, product_id))
            } else {
                Box::pin(self.inner.gateway.add_wishlist_entry(&session, product_id))
            };

        self.commit_and_reconcile(
            SectionValue::Wishlist(previous),
            SectionValue::Wishlist(optimistic),
            remote,
            NotificationKind::Wishlist,
            "Failed to update wishlist.",
        )
        .await
    }

    // =========================================================================
    // Catalog (confirm-then-commit)
    // =========================================================================

    /// Fetch the catalog and replace the products section.
    ///
    /// # Errors
    ///
    /// [`ClientError::Remote`] if the catalog service fails; the store is
    /// left unchanged.
    #[instrument(skip(self))]
    pub async fn load_products(&self) -> Result<Vec<Product>> {
        let products = self.inner.gateway.list_products().await?;
        self.inner
            .store
            .replace(SectionValue::Products(products.clone()));
        Ok(products)
    }

    /// Fetch one product by identifier. Does not touch the store.
    ///
    /// # Errors
    ///
    /// [`ClientError::Remote`] if the product is missing or the service
    /// fails.
    #[instrument(skip(self))]
    pub async fn get_product(&self, id: ProductId) -> Result<Product> {
        Ok(self.inner.gateway.get_product(id).await?)
    }

    /// Create a product. The server-assigned identifier comes back in the
    /// canonical payload, which is what gets appended to the store.
    ///
    /// # Errors
    ///
    /// [`ClientError::Validation`] for malformed input, or
    /// [`ClientError::Remote`] if the write is rejected.
    #[instrument(skip(self, draft))]
    pub async fn create_product(&self, draft: ProductDraft) -> Result<Product> {
        if draft.name.trim().is_empty() {
            return Err(ClientError::Validation(
                "product name must not be empty".to_string(),
            ));
        }
        validate_rating(draft.rating)?;

        let created = self.inner.gateway.create_product(&draft).await?;
        let mut products = self.inner.store.read().products;
        products.push(created.clone());
        self.inner.store.replace(SectionValue::Products(products));
        Ok(created)
    }

    /// Partially update a product; the server's canonical payload replaces
    /// the stored one wholesale.
    ///
    /// # Errors
    ///
    /// [`ClientError::Validation`] for malformed input, or
    /// [`ClientError::Remote`] if the write is rejected.
    #[instrument(skip(self, patch))]
    pub async fn update_product(&self, id: ProductId, patch: ProductPatch) -> Result<Product> {
        validate_rating(patch.rating)?;

        let updated = self.inner.gateway.update_product(id, &patch).await?;
        let products = self
            .inner
            .store
            .read()
            .products
            .into_iter()
            .map(|p| if p.id == id { updated.clone() } else { p })
            .collect();
        self.inner.store.replace(SectionValue::Products(products));
        Ok(updated)
    }

    /// Delete a product from the catalog.
    ///
    /// # Errors
    ///
    /// [`ClientError::Remote`] if the delete is rejected; the store is
    /// left unchanged.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: ProductId) -> Result<()> {
        self.inner.gateway.delete_product(id).await?;
        let products = without_product(self.inner.store.read().products, id);
        self.inner.store.replace(SectionValue::Products(products));
        Ok(())
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Place an order from the current cart, clearing the cart on success.
    ///
    /// The remote cart cleanup after a successful order is best-effort:
    /// the order exists either way, so cleanup failures are only logged.
    ///
    /// # Errors
    ///
    /// [`ClientError::Unauthorized`] without a session,
    /// [`ClientError::Validation`] for an empty cart, or
    /// [`ClientError::Remote`] if the order service rejects the draft (the
    /// cart is left untouched).
    #[instrument(skip(self))]
    pub async fn place_order(&self) -> Result<Order> {
        let session = self.require_session()?;
        let lines = self.inner.store.read().cart;
        if lines.is_empty() {
            return Err(ClientError::Validation("cart is empty".to_string()));
        }

        let draft = OrderDraft::from_cart(session.user_id(), &lines);
        let order = match self.inner.gateway.create_order(&session, &draft).await {
            Ok(order) => order,
            Err(e) => {
                self.inner.notifier.error(
                    NotificationKind::Order,
                    "Failed to place order. Please try again.",
                );
                return Err(e.into());
            }
        };

        self.inner.store.replace(SectionValue::Cart(Vec::new()));
        self.persist_cart();

        for line in &lines {
            if let Err(e) = self
                .inner
                .gateway
                .remove_cart_line(&session, line.product.id)
                .await
            {
                tracing::warn!(
                    error = %e,
                    product_id = %line.product.id,
                    "Failed to clear remote cart line after order"
                );
            }
        }

        Ok(order)
    }

    /// List the current user's orders.
    ///
    /// # Errors
    ///
    /// [`ClientError::Unauthorized`] without a session, or
    /// [`ClientError::Remote`] if the order service fails.
    #[instrument(skip(self))]
    pub async fn list_orders(&self) -> Result<Vec<Order>> {
        let session = self.require_session()?;
        Ok(self.inner.gateway.list_orders(&session).await?)
    }

    /// Fetch one order by identifier.
    ///
    /// # Errors
    ///
    /// [`ClientError::Remote`] if the order is missing or the service
    /// fails.
    #[instrument(skip(self))]
    pub async fn get_order(&self, id: OrderId) -> Result<Order> {
        Ok(self.inner.gateway.get_order(id).await?)
    }

    /// Update an order's status (dashboard operation).
    ///
    /// # Errors
    ///
    /// [`ClientError::Remote`] if the update is rejected.
    #[instrument(skip(self))]
    pub async fn update_order_status(&self, id: OrderId, status: OrderStatus) -> Result<Order> {
        Ok(self.inner.gateway.update_order_status(id, status).await?)
    }

    // =========================================================================
    // Startup
    // =========================================================================

    /// Initial load: persisted cart first so the UI renders without a
    /// refetch, then the catalog, then (with a session) the authoritative
    /// remote cart and wishlist. Individual failures are logged and
    /// notified; hydration itself never fails.
    #[instrument(skip(self))]
    pub async fn hydrate(&self) {
        let persisted = self.inner.storage.load();
        if !persisted.is_empty() {
            self.inner.store.replace(SectionValue::Cart(persisted));
        }

        match self.inner.gateway.list_products().await {
            Ok(products) => self.inner.store.replace(SectionValue::Products(products)),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load catalog");
                self.inner
                    .notifier
                    .error(NotificationKind::Catalog, "Failed to load products.");
            }
        }

        let Some(session) = self.session() else {
            return;
        };

        match self.inner.gateway.fetch_cart(&session).await {
            Ok(cart) => {
                self.inner.store.replace(SectionValue::Cart(cart));
                self.persist_cart();
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load remote cart");
                self.inner
                    .notifier
                    .error(NotificationKind::Cart, "Failed to load cart.");
            }
        }

        match self.inner.gateway.fetch_wishlist(&session).await {
            Ok(wishlist) => self.inner.store.replace(SectionValue::Wishlist(wishlist)),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load wishlist");
                self.inner
                    .notifier
                    .error(NotificationKind::Wishlist, "Failed to load wishlist.");
            }
        }
    }
}

fn without_product(products: Vec<Product>, id: ProductId) -> Vec<Product> {
    products.into_iter().filter(|p| p.id != id).collect()
}
