//! One cart store per visitor.

use std::sync::Arc;

use moka::future::Cache;
use scamp_core::CartId;
use tracing::{debug, warn};

use super::CartStore;
use crate::config::CartConfig;
use crate::shopify::CartApi;

/// Cart stores keyed by visitor ID.
///
/// Stores idle for longer than the configured time are evicted; the cart
/// itself lives on in Shopify and is restored from the visitor's session on
/// their next request.
pub struct CartSessions<A> {
    api: A,
    stores: Cache<String, Arc<CartStore<A>>>,
}

impl<A> CartSessions<A>
where
    A: CartApi + Clone + 'static,
{
    #[must_use]
    pub fn new(api: A, config: &CartConfig) -> Self {
        let stores = Cache::builder()
            .max_capacity(config.session_capacity)
            .time_to_idle(config.session_idle)
            .build();
        Self { api, stores }
    }

    /// The visitor's store. A newly created store adopts `stored_cart_id`
    /// (the ID remembered in the visitor's session) before anyone else can
    /// see it; concurrent requests for the same visitor wait for that.
    pub async fn store(&self, visitor_id: &str, stored_cart_id: Option<CartId>) -> Arc<CartStore<A>> {
        let entry = self
            .stores
            .entry_by_ref(visitor_id)
            .or_insert_with(async {
                let store = CartStore::new(self.api.clone());
                if let Some(cart_id) = stored_cart_id
                    && let Err(e) = store.restore(cart_id).await
                {
                    warn!(visitor_id, error = %e, "Failed to restore cart from session");
                }
                Arc::new(store)
            })
            .await;

        if entry.is_fresh() {
            debug!(visitor_id, "Created cart store");
        }

        entry.into_value()
    }

    /// Number of live stores.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.stores.entry_count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
