//! Integration test support for Shopsync.
//!
//! Provides [`MockGateway`], a scripted in-process stand-in for the remote
//! services, plus entity fixtures. Each gateway method pops the next
//! scripted outcome from its own queue; an outcome can carry a gate so a
//! test controls exactly when the "network" resolves, which is how the
//! rollback and latest-wins interleavings are exercised. Every call is
//! recorded for assertion.
//!
//! Unscripted calls resolve to a benign default (empty collections,
//! successful writes) so tests only script what they care about.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use tokio::sync::oneshot;

use shopsync_client::gateway::{GatewayError, RemoteGateway};
use shopsync_core::{
    CartLine, Order, OrderDraft, OrderId, OrderStatus, Price, Product, ProductDraft, ProductId,
    ProductPatch, SessionIdentity, UserId, WishlistEntry,
};

// =============================================================================
// Fixtures
// =============================================================================

/// A catalog entry with the given identifier and unit price in cents.
#[must_use]
pub fn product(id: i64, cents: u64) -> Product {
    Product {
        id: ProductId::new(id),
        name: format!("Product {id}"),
        description: String::new(),
        category: "Misc".to_string(),
        available_qty: 10,
        price: Price::from_cents(cents),
        image_url: None,
        rating: None,
    }
}

/// A cart line over [`product`].
#[must_use]
pub fn line(id: i64, cents: u64, quantity: u32) -> CartLine {
    CartLine::new(product(id, cents), quantity)
}

/// A session identity for the given user.
#[must_use]
pub fn session(user: i64) -> SessionIdentity {
    SessionIdentity::new(UserId::new(user), secrecy::SecretString::from("tok-test"))
}

/// An order as the order service would return it for the given draft.
#[must_use]
pub fn placed_order(id: i64, draft: &OrderDraft) -> Order {
    Order {
        id: OrderId::new(id),
        user_id: draft.user_id,
        total_amount: draft.total_amount,
        status: OrderStatus::Placed,
        created_at: Utc::now(),
        items: draft.items.clone(),
    }
}

// =============================================================================
// Scripted outcomes
// =============================================================================

struct Scripted<T> {
    gate: Option<oneshot::Receiver<()>>,
    result: Result<T, GatewayError>,
}

/// A queue of scripted outcomes for one gateway method.
pub struct Script<T> {
    queue: Mutex<VecDeque<Scripted<T>>>,
}

impl<T> Default for Script<T> {
    fn default() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
        }
    }
}

impl<T> Script<T> {
    /// Script a successful outcome.
    pub fn push_ok(&self, value: T) {
        self.queue.lock().unwrap().push_back(Scripted {
            gate: None,
            result: Ok(value),
        });
    }

    /// Script a failure.
    pub fn push_err(&self, err: GatewayError) {
        self.queue.lock().unwrap().push_back(Scripted {
            gate: None,
            result: Err(err),
        });
    }

    /// Script an outcome that resolves only after the returned sender
    /// fires (or is dropped).
    pub fn push_gated(&self, result: Result<T, GatewayError>) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.queue.lock().unwrap().push_back(Scripted {
            gate: Some(rx),
            result,
        });
        tx
    }

    async fn take(&self, default: Result<T, GatewayError>) -> Result<T, GatewayError> {
        let scripted = self.queue.lock().unwrap().pop_front();
        match scripted {
            Some(Scripted { gate, result }) => {
                if let Some(gate) = gate {
                    let _ = gate.await;
                }
                result
            }
            None => default,
        }
    }
}

// =============================================================================
// Call recording
// =============================================================================

/// One recorded gateway call, in invocation order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListProducts,
    GetProduct(i64),
    CreateProduct(String),
    UpdateProduct(i64),
    DeleteProduct(i64),
    Search(String),
    FetchCart(i64),
    AddCartLine { user: i64, product: i64, quantity: u32 },
    RemoveCartLine { user: i64, product: i64 },
    UpdateCartLine { user: i64, product: i64, quantity: u32 },
    FetchWishlist(i64),
    AddWishlistEntry { user: i64, product: i64 },
    RemoveWishlistEntry { user: i64, product: i64 },
    CreateOrder { user: i64, total: String },
    ListOrders(i64),
    GetOrder(i64),
    UpdateOrderStatus { order: i64, status: OrderStatus },
}

// =============================================================================
// Mock gateway
// =============================================================================

/// Scripted stand-in for the remote services. Clones share scripts and the
/// call log, so a test keeps one handle for scripting and assertions after
/// handing the other to the service under test.
#[derive(Clone, Default)]
pub struct MockGateway {
    calls: Arc<Mutex<Vec<Call>>>,
    pub products: Arc<Script<Vec<Product>>>,
    pub product: Arc<Script<Product>>,
    pub product_create: Arc<Script<Product>>,
    pub product_update: Arc<Script<Product>>,
    pub product_delete: Arc<Script<()>>,
    pub search: Arc<Script<Vec<Product>>>,
    pub cart: Arc<Script<Vec<CartLine>>>,
    pub cart_add: Arc<Script<()>>,
    pub cart_remove: Arc<Script<()>>,
    pub cart_update: Arc<Script<()>>,
    pub wishlist: Arc<Script<Vec<WishlistEntry>>>,
    pub wishlist_add: Arc<Script<()>>,
    pub wishlist_remove: Arc<Script<()>>,
    pub order_create: Arc<Script<Order>>,
    pub orders: Arc<Script<Vec<Order>>>,
    pub order: Arc<Script<Order>>,
    pub order_status: Arc<Script<Order>>,
}

impl MockGateway {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All calls made so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls made so far that match the predicate.
    #[must_use]
    pub fn calls_where(&self, pred: impl Fn(&Call) -> bool) -> Vec<Call> {
        self.calls().into_iter().filter(|c| pred(c)).collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

fn missing<T>(what: &str) -> Result<T, GatewayError> {
    Err(GatewayError::NotFound(what.to_string()))
}

impl RemoteGateway for MockGateway {
    async fn list_products(&self) -> Result<Vec<Product>, GatewayError> {
        self.record(Call::ListProducts);
        self.products.take(Ok(Vec::new())).await
    }

    async fn get_product(&self, id: ProductId) -> Result<Product, GatewayError> {
        self.record(Call::GetProduct(id.as_i64()));
        self.product.take(missing("product")).await
    }

    async fn create_product(&self, draft: &ProductDraft) -> Result<Product, GatewayError> {
        self.record(Call::CreateProduct(draft.name.clone()));
        self.product_create.take(missing("product")).await
    }

    async fn update_product(
        &self,
        id: ProductId,
        _patch: &ProductPatch,
    ) -> Result<Product, GatewayError> {
        self.record(Call::UpdateProduct(id.as_i64()));
        self.product_update.take(missing("product")).await
    }

    async fn delete_product(&self, id: ProductId) -> Result<(), GatewayError> {
        self.record(Call::DeleteProduct(id.as_i64()));
        self.product_delete.take(Ok(())).await
    }

    async fn search_products(&self, query: &str) -> Result<Vec<Product>, GatewayError> {
        self.record(Call::Search(query.to_string()));
        self.search.take(Ok(Vec::new())).await
    }

    async fn fetch_cart(&self, session: &SessionIdentity) -> Result<Vec<CartLine>, GatewayError> {
        self.record(Call::FetchCart(session.user_id().as_i64()));
        self.cart.take(Ok(Vec::new())).await
    }

    async fn add_cart_line(
        &self,
        session: &SessionIdentity,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<(), GatewayError> {
        self.record(Call::AddCartLine {
            user: session.user_id().as_i64(),
            product: product_id.as_i64(),
            quantity,
        });
        self.cart_add.take(Ok(())).await
    }

    async fn remove_cart_line(
        &self,
        session: &SessionIdentity,
        product_id: ProductId,
    ) -> Result<(), GatewayError> {
        self.record(Call::RemoveCartLine {
            user: session.user_id().as_i64(),
            product: product_id.as_i64(),
        });
        self.cart_remove.take(Ok(())).await
    }

    async fn update_cart_line(
        &self,
        session: &SessionIdentity,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<(), GatewayError> {
        self.record(Call::UpdateCartLine {
            user: session.user_id().as_i64(),
            product: product_id.as_i64(),
            quantity,
        });
        self.cart_update.take(Ok(())).await
    }

    async fn fetch_wishlist(
        &self,
        session: &SessionIdentity,
    ) -> Result<Vec<WishlistEntry>, GatewayError> {
        self.record(Call::FetchWishlist(session.user_id().as_i64()));
        self.wishlist.take(Ok(Vec::new())).await
    }

    async fn add_wishlist_entry(
        &self,
        session: &SessionIdentity,
        product_id: ProductId,
    ) -> Result<(), GatewayError> {
        self.record(Call::AddWishlistEntry {
            user: session.user_id().as_i64(),
            product: product_id.as_i64(),
        });
        self.wishlist_add.take(Ok(())).await
    }

    async fn remove_wishlist_entry(
        &self,
        session: &SessionIdentity,
        product_id: ProductId,
    ) -> Result<(), GatewayError> {
        self.record(Call::RemoveWishlistEntry {
            user: session.user_id().as_i64(),
            product: product_id.as_i64(),
        });
        self.wishlist_remove.take(Ok(())).await
    }

    async fn create_order(
        &self,
        session: &SessionIdentity,
        draft: &OrderDraft,
    ) -> Result<Order, GatewayError> {
        self.record(Call::CreateOrder {
            user: session.user_id().as_i64(),
            total: draft.total_amount.to_string(),
        });
        self.order_create.take(missing("order")).await
    }

    async fn list_orders(&self, session: &SessionIdentity) -> Result<Vec<Order>, GatewayError> {
        self.record(Call::ListOrders(session.user_id().as_i64()));
        self.orders.take(Ok(Vec::new())).await
    }

    async fn get_order(&self, id: OrderId) -> Result<Order, GatewayError> {
        self.record(Call::GetOrder(id.as_i64()));
        self.order.take(missing("order")).await
    }

    async fn update_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, GatewayError> {
        self.record(Call::UpdateOrderStatus {
            order: id.as_i64(),
            status,
        });
        self.order_status.take(missing("order")).await
    }
}
