//! Cart state store.
//!
//! The single source of truth for the in-memory cart snapshot. Views read
//! snapshots and call mutation operations; every mutation replaces the
//! snapshot with the cart the backend returned (the backend is authoritative
//! for `total_items` and `subtotal`).
//!
//! # Ordering
//!
//! Two rapid mutations on the same line issue two independent requests whose
//! responses can land out of order. Each request therefore takes a
//! monotonically increasing sequence number before it is sent, and a response
//! is applied only if no newer response has already been applied. Concurrent
//! identical mutations are deliberately *not* de-duplicated; a double-click
//! on + issues two requests, and both count.
//!
//! # Errors
//!
//! `refresh` never propagates failure; it records a generic message and
//! leaves the previous snapshot intact. Mutations record the same kind of
//! message *and* return the error so the calling view can react (e.g. keep a
//! pending control disabled).

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::Mutex;
use tracing::instrument;

use haberdash_core::ProductId;

use crate::api::{ApiError, Cart, Client};

/// Injectable cart store, shared through application state.
///
/// Cheaply cloneable via `Arc`; the lifecycle is tied to the application
/// session (created at startup, dropped at shutdown).
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<CartStoreInner>,
}

struct CartStoreInner {
    api: Client,
    state: Mutex<CartState>,
    /// Sequence source for mutation ordering; see module docs.
    seq: AtomicU64,
}

struct CartState {
    cart: Option<Cart>,
    error: Option<String>,
    loading: bool,
    last_applied: u64,
}

/// A point-in-time view of the store for rendering.
#[derive(Debug, Clone)]
pub struct CartSnapshot {
    /// The cart, or `None` before the first successful load.
    pub cart: Option<Cart>,
    /// True until the initial load settles. Mutations never set this;
    /// quantity changes should not flicker a global spinner.
    pub loading: bool,
    /// Generic message from the most recent failed operation.
    pub error: Option<String>,
}

impl CartSnapshot {
    /// The cart, or an empty cart before the first load.
    #[must_use]
    pub fn cart_or_empty(&self) -> Cart {
        self.cart.clone().unwrap_or_else(Cart::empty)
    }
}

impl CartStore {
    /// Create a new store backed by the given API client.
    #[must_use]
    pub fn new(api: Client) -> Self {
        Self {
            inner: Arc::new(CartStoreInner {
                api,
                state: Mutex::new(CartState {
                    cart: None,
                    error: None,
                    loading: true,
                    last_applied: 0,
                }),
                seq: AtomicU64::new(0),
            }),
        }
    }

    /// Take a snapshot of the current state.
    pub async fn snapshot(&self) -> CartSnapshot {
        let state = self.inner.state.lock().await;
        CartSnapshot {
            cart: state.cart.clone(),
            loading: state.loading,
            error: state.error.clone(),
        }
    }

    /// Reserve the next sequence number. Called before the request is sent
    /// so that issue order, not arrival order, decides which response wins.
    fn next_seq(&self) -> u64 {
        self.inner.seq.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Apply a server cart unless a newer response already has.
    async fn apply(&self, seq: u64, cart: Cart) {
        let mut state = self.inner.state.lock().await;
        if seq >= state.last_applied {
            state.cart = Some(cart);
            state.last_applied = seq;
        } else {
            tracing::debug!(seq, last_applied = state.last_applied, "discarding stale cart response");
        }
    }

    async fn clear_error(&self) {
        self.inner.state.lock().await.error = None;
    }

    async fn record_error(&self, message: &str) {
        self.inner.state.lock().await.error = Some(message.to_string());
    }

    /// Fetch the current cart from the backend, replacing local state.
    ///
    /// On failure the previous snapshot is kept and a generic error is
    /// recorded; the failure is never propagated.
    #[instrument(skip(self))]
    pub async fn refresh(&self) {
        self.clear_error().await;
        let seq = self.next_seq();
        match self.inner.api.get_cart().await {
            Ok(cart) => self.apply(seq, cart).await,
            Err(e) => {
                tracing::warn!("Failed to load cart: {e}");
                self.record_error("Failed to load cart").await;
            }
        }
        self.inner.state.lock().await.loading = false;
    }

    /// Add units of a product to the cart.
    ///
    /// # Errors
    ///
    /// Propagates the API error after recording a generic message, so the
    /// caller can avoid optimistic state drift.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add_item(&self, product_id: ProductId, quantity: u32) -> Result<(), ApiError> {
        self.clear_error().await;
        let seq = self.next_seq();
        match self.inner.api.add_cart_item(product_id, quantity).await {
            Ok(mutation) => {
                self.apply(seq, mutation.cart).await;
                Ok(())
            }
            Err(e) => {
                self.record_error("Failed to add item to cart").await;
                Err(e)
            }
        }
    }

    /// Set the absolute quantity of an existing line.
    ///
    /// Callers wanting a quantity below 1 must call [`Self::remove_item`]
    /// instead; the store does not auto-convert.
    ///
    /// # Errors
    ///
    /// Propagates the API error after recording a generic message.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn update_item(&self, product_id: ProductId, quantity: u32) -> Result<(), ApiError> {
        self.clear_error().await;
        let seq = self.next_seq();
        match self.inner.api.update_cart_item(product_id, quantity).await {
            Ok(mutation) => {
                self.apply(seq, mutation.cart).await;
                Ok(())
            }
            Err(e) => {
                self.record_error("Failed to update cart").await;
                Err(e)
            }
        }
    }

    /// Remove a line from the cart.
    ///
    /// # Errors
    ///
    /// Propagates the API error after recording a generic message.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn remove_item(&self, product_id: ProductId) -> Result<(), ApiError> {
        self.clear_error().await;
        let seq = self.next_seq();
        match self.inner.api.remove_cart_item(product_id).await {
            Ok(removal) => {
                self.apply(seq, removal.cart).await;
                Ok(())
            }
            Err(e) => {
                self.record_error("Failed to remove item from cart").await;
                Err(e)
            }
        }
    }

    /// Empty the cart. Idempotent: clearing an already-empty cart succeeds
    /// and yields the empty snapshot.
    ///
    /// # Errors
    ///
    /// Propagates the API error after recording a generic message.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<(), ApiError> {
        self.clear_error().await;
        let seq = self.next_seq();
        match self.inner.api.clear_cart().await {
            Ok(cart) => {
                self.apply(seq, cart).await;
                Ok(())
            }
            Err(e) => {
                self.record_error("Failed to clear cart").await;
                Err(e)
            }
        }
    }
}
