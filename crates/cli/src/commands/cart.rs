//! Cart commands.
//!
//! The cart ID is kept in a local JSON file between runs, so consecutive
//! commands keep working on the same Shopify cart.
//!
//! # Usage
//!
//! ```bash
//! scamp cart add 44012345678 --quantity 2
//! scamp cart show
//! scamp cart update gid://shopify/CartLine/abc 3
//! scamp cart remove gid://shopify/CartLine/abc
//! scamp cart clear
//! scamp cart checkout
//! ```

use scamp_core::{CartLineId, VariantId};
use scamp_storefront::cart::{CartItemInput, CartSnapshot, CartStore};
use scamp_storefront::config::ShopifyStorefrontConfig;
use scamp_storefront::shopify::StorefrontClient;
use tracing::{info, warn};

use super::CommandError;
use crate::local_storage::LocalStorage;
use crate::render;

/// A cart store bound to the local storage file.
pub struct LocalCart {
    store: CartStore<StorefrontClient>,
    storage: LocalStorage,
}

impl LocalCart {
    /// Load Shopify settings and restore the remembered cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings or the storage file cannot be read.
    pub async fn open(storage: LocalStorage) -> Result<Self, CommandError> {
        let config = ShopifyStorefrontConfig::from_env()?;
        let store = CartStore::new(StorefrontClient::new(&config)?);

        if let Some(cart_id) = storage.cart_id().await? {
            info!(cart_id = %cart_id, "Restoring cart");
            if let Err(e) = store.restore(cart_id).await {
                warn!(error = %e, "Could not refresh the stored cart");
            }
        }

        Ok(Self { store, storage })
    }

    /// Persist the cart ID of `snapshot`.
    async fn remember(&self, snapshot: &CartSnapshot) -> Result<(), CommandError> {
        self.storage.set_cart_id(snapshot.cart_id.as_ref()).await?;
        Ok(())
    }

    /// Print-ready view of the current cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage file cannot be written.
    pub async fn show(&self) -> Result<String, CommandError> {
        let snapshot = self.store.snapshot();
        self.remember(&snapshot).await?;
        Ok(render::cart(&snapshot))
    }

    /// Add a variant.
    ///
    /// # Errors
    ///
    /// Returns an error if the ID or quantity is invalid or Shopify fails.
    pub async fn add(&self, variant_id: &str, quantity: i64) -> Result<String, CommandError> {
        let variant_id = VariantId::parse(variant_id)?;
        let snapshot = self
            .store
            .add(CartItemInput::new(variant_id, quantity))
            .await?;
        self.remember(&snapshot).await?;
        Ok(render::cart(&snapshot))
    }

    /// Set a line's quantity; zero removes the line.
    ///
    /// # Errors
    ///
    /// Returns an error if the ID or quantity is invalid or Shopify fails.
    pub async fn update(&self, line_id: &str, quantity: i64) -> Result<String, CommandError> {
        let line_id = CartLineId::parse(line_id)?;
        let snapshot = if quantity == 0 {
            self.store.remove(&line_id).await?
        } else {
            self.store.update_quantity(&line_id, quantity).await?
        };
        self.remember(&snapshot).await?;
        Ok(render::cart(&snapshot))
    }

    /// Remove a line.
    ///
    /// # Errors
    ///
    /// Returns an error if the ID is invalid or Shopify fails.
    pub async fn remove(&self, line_id: &str) -> Result<String, CommandError> {
        let line_id = CartLineId::parse(line_id)?;
        let snapshot = self.store.remove(&line_id).await?;
        self.remember(&snapshot).await?;
        Ok(render::cart(&snapshot))
    }

    /// Empty the cart and start a new one.
    ///
    /// # Errors
    ///
    /// Returns an error if Shopify cannot create the new cart; the old cart
    /// is forgotten either way.
    pub async fn clear(&self) -> Result<String, CommandError> {
        let result = self.store.clear().await;
        self.remember(&self.store.snapshot()).await?;
        Ok(render::cart(&result?))
    }

    /// The checkout URL, if the cart has anything in it.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage file cannot be written.
    pub async fn checkout(&self) -> Result<String, CommandError> {
        let snapshot = self.store.snapshot();
        self.remember(&snapshot).await?;
        Ok(snapshot.checkout_url().map_or_else(
            || "Your cart is empty.\n".to_string(),
            |url| format!("{url}\n"),
        ))
    }
}
