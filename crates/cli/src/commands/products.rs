//! Catalog commands.
//!
//! # Usage
//!
//! ```bash
//! # List the first page of products
//! scamp products
//!
//! # Show one product (numeric ID or gid)
//! scamp product 8123456789
//! ```

use scamp_core::ProductId;
use scamp_storefront::catalog::{Catalog, Fetched, Origin};
use scamp_storefront::config::{CatalogConfig, ShopifyStorefrontConfig};
use scamp_storefront::shopify::StorefrontClient;
use tracing::warn;

use super::CommandError;
use crate::render;

fn catalog() -> Result<Catalog<StorefrontClient>, CommandError> {
    let config = ShopifyStorefrontConfig::from_env()?;
    let client = StorefrontClient::new(&config)?;
    Ok(Catalog::new(
        client,
        config.product_page_size,
        &CatalogConfig::default(),
    ))
}

fn warn_if_fallback<T>(fetched: &Fetched<T>) {
    if let Origin::Fallback(kind) = fetched.origin {
        warn!(?kind, "Shopify unavailable, showing sample products");
    }
}

/// List the first page of products.
///
/// # Errors
///
/// Returns an error if the Shopify settings cannot be loaded.
pub async fn list() -> Result<String, CommandError> {
    let fetched = catalog()?.products().await?;
    warn_if_fallback(&fetched);
    Ok(render::product_list(&fetched.value))
}

/// Show a single product.
///
/// # Errors
///
/// Returns an error if the ID is malformed or no such product exists.
pub async fn show(id: &str) -> Result<String, CommandError> {
    let product_id = ProductId::parse(id)?;
    let fetched = catalog()?.product(&product_id).await?;
    warn_if_fallback(&fetched);

    fetched
        .value
        .as_ref()
        .map(render::product_detail)
        .ok_or_else(|| CommandError::ProductNotFound(id.to_string()))
}
