//! Product type conversion functions.

use scamp_core::{ProductId, VariantId};

use super::super::queries::{ProductFields, VariantFields};
use super::{convert_image, convert_money, parse_id};
use crate::shopify::ShopifyError;
use crate::shopify::types::{Product, ProductVariant};

/// Convert a product selection into the domain product.
///
/// # Errors
///
/// Returns `ShopifyError::InvalidResponse` if an ID or amount is unusable.
pub fn convert_product(product: ProductFields) -> Result<Product, ShopifyError> {
    Ok(Product {
        id: parse_id(ProductId::parse(&product.id))?,
        handle: product.handle,
        title: product.title,
        description: product.description,
        min_price: convert_money(&product.price_range.min_variant_price)?,
        featured_image: product.featured_image.map(convert_image),
        images: product.images.into_nodes().map(convert_image).collect(),
        variants: product
            .variants
            .into_nodes()
            .map(convert_variant)
            .collect::<Result<_, _>>()?,
    })
}

fn convert_variant(variant: VariantFields) -> Result<ProductVariant, ShopifyError> {
    Ok(ProductVariant {
        id: parse_id(VariantId::parse(&variant.id))?,
        title: variant.title,
        available_for_sale: variant.available_for_sale,
        price: convert_money(&variant.price)?,
    })
}
