//! Read-side view of a cart store.

use scamp_core::{CartId, CurrencyCode, Price};
use tokio::sync::watch;

use super::store::State;
use crate::shopify::{Cart, CartLine};

/// The state of a cart store at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartSnapshot {
    /// Identifier of the server cart, if one is held.
    pub cart_id: Option<CartId>,
    /// The server's last accepted cart.
    pub cart: Option<Cart>,
    /// Whether the cart drawer is open.
    pub is_open: bool,
    /// Whether a cart request is in flight.
    pub is_loading: bool,
    /// Increases every time the cart is replaced.
    pub version: u64,
}

impl CartSnapshot {
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        self.cart.as_ref().map_or(&[], |c| c.lines.as_slice())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines().is_empty()
    }

    /// Item count for the cart badge.
    #[must_use]
    pub fn total_quantity(&self) -> u32 {
        self.cart.as_ref().map_or(0, |c| c.total_quantity)
    }

    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.cart
            .as_ref()
            .map_or_else(|| Price::zero(CurrencyCode::default()), |c| c.subtotal)
    }

    #[must_use]
    pub fn total(&self) -> Price {
        self.cart
            .as_ref()
            .map_or_else(|| Price::zero(CurrencyCode::default()), |c| c.total)
    }

    /// Shopify checkout URL, once the cart has something to check out.
    #[must_use]
    pub fn checkout_url(&self) -> Option<&str> {
        self.cart
            .as_ref()
            .filter(|c| !c.is_empty())
            .map(|c| c.checkout_url.as_str())
    }
}

/// Subscription to a cart store's snapshots.
#[derive(Debug, Clone)]
pub struct CartWatch {
    rx: watch::Receiver<State>,
}

impl CartWatch {
    pub(super) const fn new(rx: watch::Receiver<State>) -> Self {
        Self { rx }
    }

    /// The latest snapshot.
    #[must_use]
    pub fn current(&self) -> CartSnapshot {
        self.rx.borrow().snapshot.clone()
    }

    /// Wait for the next change and return the new snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error once the store has been dropped.
    pub async fn changed(&mut self) -> Result<CartSnapshot, watch::error::RecvError> {
        self.rx.changed().await?;
        Ok(self.rx.borrow_and_update().snapshot.clone())
    }
}
