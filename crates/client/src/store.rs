//! The reactive store: single source of truth for catalog, cart, and
//! wishlist state.
//!
//! The store holds one [`Snapshot`] and exposes three operations:
//! [`read`](ReactiveStore::read), [`replace`](ReactiveStore::replace), and
//! [`subscribe`](ReactiveStore::subscribe). `replace` is the only primitive
//! mutation; every higher-level operation in the mutation executor is a
//! derived replace computed from the snapshot it captured. A section
//! transition is a single assignment under the lock, so no reader ever
//! observes a half-updated cart line.
//!
//! Derived aggregates (item count, subtotal) are pure functions of the
//! snapshot, recomputed on read. Nothing stores them, so they cannot
//! diverge from their components.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::mpsc;

use shopsync_core::{CartLine, Price, Product, ProductId, WishlistEntry};

/// A consistent view of all three state sections as of the last committed
/// mutation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub products: Vec<Product>,
    pub cart: Vec<CartLine>,
    pub wishlist: Vec<WishlistEntry>,
}

impl Snapshot {
    /// Total number of items in the cart (sum of line quantities).
    #[must_use]
    pub fn cart_count(&self) -> u32 {
        self.cart.iter().map(|line| line.quantity).sum()
    }

    /// Cart subtotal across all lines.
    #[must_use]
    pub fn cart_subtotal(&self) -> Price {
        self.cart
            .iter()
            .fold(Price::ZERO, |acc, line| acc.plus(line.line_total()))
    }

    /// Number of wishlist entries.
    #[must_use]
    pub fn wishlist_count(&self) -> usize {
        self.wishlist.len()
    }

    /// Whether the cart has a line for this product.
    #[must_use]
    pub fn is_in_cart(&self, product_id: ProductId) -> bool {
        self.cart.iter().any(|line| line.product.id == product_id)
    }

    /// Whether the wishlist contains this product.
    #[must_use]
    pub fn is_in_wishlist(&self, product_id: ProductId) -> bool {
        self.wishlist.iter().any(|entry| entry.id == product_id)
    }
}

/// The three independently replaceable state sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Products,
    Cart,
    Wishlist,
}

/// A total overwrite value for one section.
#[derive(Debug, Clone, PartialEq)]
pub enum SectionValue {
    Products(Vec<Product>),
    Cart(Vec<CartLine>),
    Wishlist(Vec<WishlistEntry>),
}

impl SectionValue {
    /// Which section this value targets.
    #[must_use]
    pub const fn section(&self) -> Section {
        match self {
            Self::Products(_) => Section::Products,
            Self::Cart(_) => Section::Cart,
            Self::Wishlist(_) => Section::Wishlist,
        }
    }
}

struct State {
    snapshot: Snapshot,
    subscribers: Vec<(u64, mpsc::UnboundedSender<Snapshot>)>,
    next_subscriber_id: u64,
}

/// The reactive store.
///
/// Cheaply cloneable; all clones share the same state. Constructed
/// explicitly and passed to collaborators - there is no global instance.
#[derive(Clone)]
pub struct ReactiveStore {
    inner: Arc<Mutex<State>>,
}

impl Default for ReactiveStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ReactiveStore {
    /// Create a store with an empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(State {
                snapshot: Snapshot::default(),
                subscribers: Vec::new(),
                next_subscriber_id: 0,
            })),
        }
    }

    /// Return the latest snapshot. Never blocks on I/O; the lock is held
    /// only for the clone.
    #[must_use]
    pub fn read(&self) -> Snapshot {
        self.lock().snapshot.clone()
    }

    /// Totally overwrite one section.
    ///
    /// The assignment and the fan-out to subscribers happen under the same
    /// lock, so observers receive every committed snapshot in commit order
    /// with no transition skipped. Senders are unbounded, so fan-out never
    /// suspends.
    pub fn replace(&self, value: SectionValue) {
        let mut state = self.lock();
        match value {
            SectionValue::Products(products) => state.snapshot.products = products,
            SectionValue::Cart(cart) => state.snapshot.cart = cart,
            SectionValue::Wishlist(wishlist) => state.snapshot.wishlist = wishlist,
        }
        let snapshot = state.snapshot.clone();
        // Prune subscribers whose receiving half is gone.
        state
            .subscribers
            .retain(|(_, tx)| tx.send(snapshot.clone()).is_ok());
    }

    /// Subscribe to snapshot transitions.
    ///
    /// The returned [`Subscription`] yields every snapshot committed after
    /// this call, in commit order, until it is dropped.
    #[must_use]
    pub fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut state = self.lock();
        let id = state.next_subscriber_id;
        state.next_subscriber_id += 1;
        state.subscribers.push((id, tx));
        Subscription {
            id,
            rx,
            store: Arc::clone(&self.inner),
        }
    }

    /// Drop all subscribers. Part of explicit teardown; outstanding
    /// [`Subscription`] handles see their channel close.
    pub fn shutdown(&self) {
        self.lock().subscribers.clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        // A poisoned lock only means a panic elsewhere; the snapshot itself
        // is always a complete value, so we keep serving it.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Handle to an active store subscription. Dropping it unsubscribes.
pub struct Subscription {
    id: u64,
    rx: mpsc::UnboundedReceiver<Snapshot>,
    store: Arc<Mutex<State>>,
}

impl Subscription {
    /// Wait for the next committed snapshot. `None` after
    /// [`ReactiveStore::shutdown`].
    pub async fn recv(&mut self) -> Option<Snapshot> {
        self.rx.recv().await
    }

    /// Non-blocking poll for an already-committed snapshot.
    pub fn try_recv(&mut self) -> Option<Snapshot> {
        self.rx.try_recv().ok()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let mut state = self
            .store
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        state.subscribers.retain(|(id, _)| *id != self.id);
    }
}
