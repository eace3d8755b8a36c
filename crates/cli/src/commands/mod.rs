//! CLI command implementations.

pub mod cart;
pub mod products;

use scamp_core::IdError;
use scamp_storefront::cart::CartError;
use scamp_storefront::config::ConfigError;
use scamp_storefront::shopify::ShopifyError;
use thiserror::Error;

use crate::local_storage::StorageError;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Shopify settings are missing or invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Storefront API request failed.
    #[error("Shopify error: {0}")]
    Shopify(#[from] ShopifyError),

    /// Cart operation failed.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Local storage file could not be used.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// An ID argument is malformed.
    #[error("Invalid ID: {0}")]
    InvalidId(#[from] IdError),

    /// The requested product does not exist.
    #[error("Product not found: {0}")]
    ProductNotFound(String),
}
