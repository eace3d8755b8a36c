//! Client-side mirror of the Shopify cart.
//!
//! A [`CartStore`] holds one visitor's cart exactly as Shopify last returned
//! it. Mutations go through a single-writer queue and every applied response
//! carries a version, so a slow response can never overwrite a newer cart.
//! [`CartSessions`] keeps one store per visitor.

mod sessions;
mod snapshot;
mod store;

pub use sessions::CartSessions;
pub use snapshot::{CartSnapshot, CartWatch};
pub use store::CartStore;

use scamp_core::VariantId;
use thiserror::Error;

use crate::shopify::{FailureKind, ShopifyError};

/// An item to add to the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItemInput {
    /// Product variant to add.
    pub variant_id: VariantId,
    /// Quantity to add; must be at least 1.
    pub quantity: i64,
}

impl CartItemInput {
    #[must_use]
    pub const fn new(variant_id: VariantId, quantity: i64) -> Self {
        Self {
            variant_id,
            quantity,
        }
    }
}

/// Errors returned by cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// Rejected locally; nothing was sent.
    #[error("quantity must be at least 1, got {0}")]
    InvalidQuantity(i64),

    /// Rejected locally; nothing was sent.
    #[error("quantity must be at most 4294967295, got {0}")]
    QuantityTooLarge(i64),

    /// Shopify could not be reached or kept failing after retries.
    #[error("cart service unavailable: {0}")]
    Unavailable(#[source] ShopifyError),

    /// Shopify refused the request.
    #[error("cart operation rejected: {0}")]
    Rejected(#[source] ShopifyError),
}

impl From<ShopifyError> for CartError {
    fn from(err: ShopifyError) -> Self {
        match err.kind() {
            FailureKind::Transient => Self::Unavailable(err),
            FailureKind::NotFound | FailureKind::Permanent => Self::Rejected(err),
        }
    }
}

/// Convert a requested quantity into the API's unsigned quantity.
fn checked_quantity(quantity: i64) -> Result<u32, CartError> {
    if quantity < 1 {
        return Err(CartError::InvalidQuantity(quantity));
    }
    u32::try_from(quantity).map_err(|_| CartError::QuantityTooLarge(quantity))
}
