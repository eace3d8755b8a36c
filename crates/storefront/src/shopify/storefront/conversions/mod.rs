//! Type conversion functions for Shopify Storefront API responses.
//!
//! Raw selections carry IDs and money as strings; converting them validates
//! both, so a malformed payload surfaces as [`ShopifyError::InvalidResponse`]
//! instead of reaching the cart store.

pub mod cart;
pub mod products;

pub use cart::{cart_from_payload, convert_cart};
pub use products::convert_product;

use scamp_core::Price;

use super::queries::{ImageFields, Money};
use crate::shopify::ShopifyError;
use crate::shopify::types::Image;

fn convert_money(money: &Money) -> Result<Price, ShopifyError> {
    Price::parse(&money.amount, &money.currency_code)
        .map_err(|e| ShopifyError::InvalidResponse(e.to_string()))
}

fn convert_image(image: ImageFields) -> Image {
    Image {
        url: image.url,
        alt_text: image.alt_text,
    }
}

fn parse_id<T, E: std::fmt::Display>(result: Result<T, E>) -> Result<T, ShopifyError> {
    result.map_err(|e| ShopifyError::InvalidResponse(e.to_string()))
}
