//! Operations the cart store and catalog need from the Storefront API.
//!
//! [`StorefrontClient`](super::StorefrontClient) is the production
//! implementation; tests substitute in-memory fakes.

use std::future::Future;

use scamp_core::{CartId, CartLineId, ProductId};

use super::ShopifyError;
use super::types::{Cart, CartLineInput, CartLineUpdateInput, Product};

/// Cart reads and mutations.
///
/// Every method returns the full cart as the server sees it after the
/// operation. A cart that no longer exists is reported as
/// [`ShopifyError::NotFound`].
pub trait CartApi: Send + Sync {
    /// Create a cart, optionally seeded with lines.
    fn create_cart(
        &self,
        lines: Vec<CartLineInput>,
    ) -> impl Future<Output = Result<Cart, ShopifyError>> + Send;

    /// Fetch an existing cart.
    fn get_cart(&self, cart_id: &CartId) -> impl Future<Output = Result<Cart, ShopifyError>> + Send;

    /// Add lines to a cart.
    fn add_cart_lines(
        &self,
        cart_id: &CartId,
        lines: Vec<CartLineInput>,
    ) -> impl Future<Output = Result<Cart, ShopifyError>> + Send;

    /// Change quantities of existing lines.
    fn update_cart_lines(
        &self,
        cart_id: &CartId,
        lines: Vec<CartLineUpdateInput>,
    ) -> impl Future<Output = Result<Cart, ShopifyError>> + Send;

    /// Remove lines from a cart.
    fn remove_cart_lines(
        &self,
        cart_id: &CartId,
        line_ids: Vec<CartLineId>,
    ) -> impl Future<Output = Result<Cart, ShopifyError>> + Send;
}

/// Catalog reads.
pub trait CatalogApi: Send + Sync {
    /// First page of products.
    fn get_products(&self, first: u32)
    -> impl Future<Output = Result<Vec<Product>, ShopifyError>> + Send;

    /// A single product; [`ShopifyError::NotFound`] if it does not exist.
    fn get_product(
        &self,
        id: &ProductId,
    ) -> impl Future<Output = Result<Product, ShopifyError>> + Send;
}
