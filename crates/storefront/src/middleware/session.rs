//! Session middleware configuration.
//!
//! Sets up in-memory sessions using tower-sessions with a moka-backed store.
//! Sessions only hold the visitor ID and Shopify cart ID, so losing them on
//! restart costs nothing but a fresh cart. The store is bounded by the cart
//! registry capacity and each record is dropped once its expiry passes.

use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_moka_store::MokaStore;

use crate::config::StorefrontConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "scamp_session";

/// Session expiry time in seconds (10 days, Shopify's cart lifetime).
const SESSION_EXPIRY_SECONDS: i64 = 10 * 24 * 60 * 60;

/// Session store holding at most `capacity` records.
#[must_use]
pub fn create_session_store(capacity: u64) -> MokaStore {
    MokaStore::new(Some(capacity))
}

/// Create the session layer with an in-memory store.
#[must_use]
pub fn create_session_layer(config: &StorefrontConfig) -> SessionManagerLayer<MokaStore> {
    SessionManagerLayer::new(create_session_store(config.cart.session_capacity))
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
