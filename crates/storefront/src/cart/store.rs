//! The cart store.

use std::sync::atomic::{AtomicU64, Ordering};

use scamp_core::{CartId, CartLineId};
use tokio::sync::{Mutex, watch};
use tracing::{debug, error, info, instrument, warn};

use super::snapshot::{CartSnapshot, CartWatch};
use super::{CartError, CartItemInput, checked_quantity};
use crate::shopify::{Cart, CartApi, CartLineInput, CartLineUpdateInput, FailureKind, ShopifyError};

/// Everything behind the watch channel. Only the snapshot is visible outside.
#[derive(Debug, Default)]
pub(super) struct State {
    pub(super) snapshot: CartSnapshot,
    /// Sequence number of the last `clear`. Mutations issued before it are stale.
    cleared_at: u64,
    in_flight: usize,
}

/// One visitor's cart, mirrored from Shopify.
///
/// Mutations are queued behind a single writer lock, in call order. Each
/// request is stamped with a sequence number when it is issued and each
/// applied cart gets a fresh one as its version:
///
/// - a mutation response is dropped if a `clear` was issued after it;
/// - a `refresh` response is dropped if anything was applied after it was
///   issued.
///
/// Local state is only ever replaced wholesale with the server's cart.
pub struct CartStore<A> {
    api: A,
    writer: Mutex<()>,
    seq: AtomicU64,
    state: watch::Sender<State>,
}

impl<A: CartApi> CartStore<A> {
    /// Create an empty store. Use [`restore`](Self::restore) to adopt a cart
    /// ID remembered by the client.
    #[must_use]
    pub fn new(api: A) -> Self {
        Self {
            api,
            writer: Mutex::new(()),
            seq: AtomicU64::new(0),
            state: watch::Sender::new(State::default()),
        }
    }

    /// The current state.
    #[must_use]
    pub fn snapshot(&self) -> CartSnapshot {
        self.state.borrow().snapshot.clone()
    }

    /// Subscribe to state changes.
    #[must_use]
    pub fn subscribe(&self) -> CartWatch {
        CartWatch::new(self.state.subscribe())
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add an item, creating the cart on first use.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidQuantity` without contacting Shopify if the
    /// quantity is below 1, otherwise the classified API failure.
    #[instrument(skip(self, item), fields(variant_id = %item.variant_id, quantity = item.quantity))]
    pub async fn add(&self, item: CartItemInput) -> Result<CartSnapshot, CartError> {
        let quantity = checked_quantity(item.quantity)?;
        let line = CartLineInput::new(item.variant_id, quantity);

        let outcome = {
            let _loading = self.loading();
            let _writer = self.writer.lock().await;
            let issued = self.next_seq();

            let result = match self.snapshot().cart_id {
                None => self.api.create_cart(vec![line]).await,
                Some(cart_id) => {
                    match self.api.add_cart_lines(&cart_id, vec![line.clone()]).await {
                        Err(e) if e.kind() == FailureKind::NotFound => {
                            info!(cart_id = %cart_id, "Cart no longer exists, creating a new one");
                            self.api.create_cart(vec![line]).await
                        }
                        other => other,
                    }
                }
            };
            self.settle("add", issued, result)
        };

        outcome.map(|()| self.snapshot())
    }

    /// Set the quantity of a line. Does nothing if no cart is held.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidQuantity` without contacting Shopify if the
    /// quantity is below 1, otherwise the classified API failure.
    #[instrument(skip(self, line_id), fields(line_id = %line_id))]
    pub async fn update_quantity(
        &self,
        line_id: &CartLineId,
        quantity: i64,
    ) -> Result<CartSnapshot, CartError> {
        let quantity = checked_quantity(quantity)?;
        let update = CartLineUpdateInput {
            id: line_id.clone(),
            quantity,
        };

        let outcome = {
            let _loading = self.loading();
            let _writer = self.writer.lock().await;
            let issued = self.next_seq();

            match self.snapshot().cart_id {
                None => Ok(()),
                Some(cart_id) => {
                    let result = self.api.update_cart_lines(&cart_id, vec![update]).await;
                    let result = self.recreate_if_missing(&cart_id, result).await;
                    self.settle("update_quantity", issued, result)
                }
            }
        };

        outcome.map(|()| self.snapshot())
    }

    /// Remove a line. Does nothing if no cart is held.
    ///
    /// # Errors
    ///
    /// Returns the classified API failure.
    #[instrument(skip(self, line_id), fields(line_id = %line_id))]
    pub async fn remove(&self, line_id: &CartLineId) -> Result<CartSnapshot, CartError> {
        let outcome = {
            let _loading = self.loading();
            let _writer = self.writer.lock().await;
            let issued = self.next_seq();

            match self.snapshot().cart_id {
                None => Ok(()),
                Some(cart_id) => {
                    let result = self
                        .api
                        .remove_cart_lines(&cart_id, vec![line_id.clone()])
                        .await;
                    let result = self.recreate_if_missing(&cart_id, result).await;
                    self.settle("remove", issued, result)
                }
            }
        };

        outcome.map(|()| self.snapshot())
    }

    /// Drop the current cart and start a new, empty one.
    ///
    /// Local state is emptied before anything else happens, so responses to
    /// requests already in flight are discarded.
    ///
    /// # Errors
    ///
    /// Returns the classified API failure if the new cart cannot be created.
    /// The old cart is forgotten either way.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<CartSnapshot, CartError> {
        self.state.send_modify(|state| {
            let seq = self.next_seq();
            state.cleared_at = seq;
            state.snapshot.version = seq;
            state.snapshot.cart_id = None;
            state.snapshot.cart = None;
        });

        let outcome = {
            let _loading = self.loading();
            let _writer = self.writer.lock().await;
            let issued = self.next_seq();
            let result = self.api.create_cart(vec![]).await;
            self.settle("clear", issued, result)
        };

        outcome.map(|()| self.snapshot())
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Re-read the held cart from Shopify. A cart that no longer exists is
    /// forgotten.
    ///
    /// Does not wait for queued mutations; if one lands first, this
    /// response is discarded.
    ///
    /// # Errors
    ///
    /// Returns the classified API failure; local state is left unchanged.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<CartSnapshot, CartError> {
        let issued = self.next_seq();
        let Some(cart_id) = self.snapshot().cart_id else {
            return Ok(self.snapshot());
        };

        let outcome = {
            let _loading = self.loading();
            match self.api.get_cart(&cart_id).await {
                Ok(cart) => {
                    self.apply_read(issued, Some(cart));
                    Ok(())
                }
                Err(e) if e.kind() == FailureKind::NotFound => {
                    info!(cart_id = %cart_id, "Stored cart no longer exists, forgetting it");
                    self.apply_read(issued, None);
                    Ok(())
                }
                Err(e) => {
                    warn!(cart_id = %cart_id, error = %e, "Failed to refresh cart");
                    Err(CartError::from(e))
                }
            }
        };

        outcome.map(|()| self.snapshot())
    }

    /// Adopt a cart ID remembered by the client (session, local storage) and
    /// load that cart.
    ///
    /// # Errors
    ///
    /// Returns the classified API failure from loading the cart. The ID is
    /// kept so a later refresh can retry.
    #[instrument(skip(self, cart_id), fields(cart_id = %cart_id))]
    pub async fn restore(&self, cart_id: CartId) -> Result<CartSnapshot, CartError> {
        {
            let _writer = self.writer.lock().await;
            self.state.send_if_modified(|state| {
                if state.snapshot.cart_id.as_ref() == Some(&cart_id) {
                    return false;
                }
                state.snapshot.version = self.next_seq();
                state.snapshot.cart_id = Some(cart_id);
                state.snapshot.cart = None;
                true
            });
        }
        self.refresh().await
    }

    // =========================================================================
    // Drawer
    // =========================================================================

    pub fn open(&self) {
        self.set_open(true);
    }

    pub fn close(&self) {
        self.set_open(false);
    }

    pub fn set_open(&self, open: bool) {
        self.state.send_if_modified(|state| {
            let changed = state.snapshot.is_open != open;
            state.snapshot.is_open = open;
            changed
        });
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn next_seq(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Shopify answers `NotFound` once a cart has expired; replace it with a
    /// fresh empty cart.
    async fn recreate_if_missing(
        &self,
        cart_id: &CartId,
        result: Result<Cart, ShopifyError>,
    ) -> Result<Cart, ShopifyError> {
        match result {
            Err(e) if e.kind() == FailureKind::NotFound => {
                info!(cart_id = %cart_id, "Cart no longer exists, creating a new one");
                self.api.create_cart(vec![]).await
            }
            other => other,
        }
    }

    /// Apply a mutation's result, or log and classify its failure.
    fn settle(
        &self,
        operation: &'static str,
        issued: u64,
        result: Result<Cart, ShopifyError>,
    ) -> Result<(), CartError> {
        match result {
            Ok(cart) => {
                let applied = self.state.send_if_modified(|state| {
                    if issued <= state.cleared_at {
                        return false;
                    }
                    state.snapshot.version = self.next_seq();
                    state.snapshot.cart_id = Some(cart.id.clone());
                    state.snapshot.cart = Some(cart);
                    true
                });
                if !applied {
                    debug!(operation, issued, "Discarding cart response issued before clear");
                }
                Ok(())
            }
            Err(e) => {
                let err = CartError::from(e);
                match &err {
                    CartError::Unavailable(_) => {
                        warn!(operation, error = %err, "Cart operation failed");
                    }
                    _ => error!(operation, error = %err, "Cart operation failed"),
                }
                Err(err)
            }
        }
    }

    fn apply_read(&self, issued: u64, cart: Option<Cart>) {
        let applied = self.state.send_if_modified(|state| {
            if issued <= state.snapshot.version {
                return false;
            }
            state.snapshot.version = self.next_seq();
            state.snapshot.cart_id = cart.as_ref().map(|c| c.id.clone());
            state.snapshot.cart = cart;
            true
        });
        if !applied {
            debug!(issued, "Discarding stale cart read");
        }
    }

    fn loading(&self) -> LoadingGuard<'_> {
        self.state.send_modify(|state| {
            state.in_flight += 1;
            state.snapshot.is_loading = true;
        });
        LoadingGuard { state: &self.state }
    }
}

/// Keeps `is_loading` raised while at least one request is in flight.
struct LoadingGuard<'a> {
    state: &'a watch::Sender<State>,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.state.send_modify(|state| {
            state.in_flight = state.in_flight.saturating_sub(1);
            state.snapshot.is_loading = state.in_flight > 0;
        });
    }
}
