//! Visitor cart extractor.
//!
//! Resolves the visitor's [`CartStore`] from the session, creating a visitor
//! ID on first contact and restoring a remembered cart into a fresh store.

use std::sync::Arc;

use axum::{extract::FromRequestParts, http::request::Parts};
use scamp_core::CartId;
use tower_sessions::Session;
use tracing::warn;
use uuid::Uuid;

use crate::cart::{CartSnapshot, CartStore};
use crate::error::AppError;
use crate::models::session_keys;
use crate::shopify::StorefrontClient;
use crate::state::AppState;

/// The requesting visitor's cart store together with their session.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(cart: VisitorCart) -> Result<impl IntoResponse> {
///     let snapshot = cart.store().snapshot();
///     // ...
/// }
/// ```
pub struct VisitorCart {
    session: Session,
    store: Arc<CartStore<StorefrontClient>>,
}

impl VisitorCart {
    /// The visitor's cart store.
    #[must_use]
    pub fn store(&self) -> &CartStore<StorefrontClient> {
        &self.store
    }

    /// Keep the session's cart ID in line with the store, so the cart
    /// survives the store being evicted.
    pub async fn remember(&self, snapshot: &CartSnapshot) {
        let result = match &snapshot.cart_id {
            Some(id) => self.session.insert(session_keys::CART_ID, id).await,
            None => self
                .session
                .remove::<CartId>(session_keys::CART_ID)
                .await
                .map(|_| ()),
        };

        if let Err(e) = result {
            warn!(error = %e, "Failed to store cart ID in session");
        }
    }
}

impl FromRequestParts<AppState> for VisitorCart {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::Internal("session layer missing".to_string()))?;

        let visitor_id = match session.get::<String>(session_keys::VISITOR_ID).await {
            Ok(Some(id)) => id,
            Ok(None) => {
                let id = Uuid::new_v4().to_string();
                session
                    .insert(session_keys::VISITOR_ID, &id)
                    .await
                    .map_err(|e| AppError::Internal(format!("session write failed: {e}")))?;
                id
            }
            Err(e) => return Err(AppError::Internal(format!("session read failed: {e}"))),
        };

        // A value that no longer parses is dropped rather than failing the request.
        let stored_cart_id = session
            .get::<CartId>(session_keys::CART_ID)
            .await
            .ok()
            .flatten();

        let store = state.carts().store(&visitor_id, stored_cart_id).await;
        let visitor = Self { session, store };

        visitor.remember(&visitor.store.snapshot()).await;

        Ok(visitor)
    }
}
