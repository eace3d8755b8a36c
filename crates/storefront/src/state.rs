//! Application state shared across handlers.

use std::sync::Arc;

use crate::cart::CartSessions;
use crate::catalog::Catalog;
use crate::config::StorefrontConfig;
use crate::shopify::{ShopifyError, StorefrontClient};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// configuration, the catalog and the per-visitor cart stores.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: Catalog<StorefrontClient>,
    carts: CartSessions<StorefrontClient>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the Storefront API client cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self, ShopifyError> {
        let storefront = StorefrontClient::new(&config.shopify)?;
        let catalog = Catalog::new(
            storefront.clone(),
            config.shopify.product_page_size,
            &config.catalog,
        );
        let carts = CartSessions::new(storefront, &config.cart);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog,
                carts,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the product catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog<StorefrontClient> {
        &self.inner.catalog
    }

    /// Get a reference to the per-visitor cart stores.
    #[must_use]
    pub fn carts(&self) -> &CartSessions<StorefrontClient> {
        &self.inner.carts
    }
}
