//! Domain types for the Shopify Storefront API.
//!
//! These types provide a clean, ergonomic API separate from the raw
//! response shapes in `storefront::queries`.

use scamp_core::{CartId, CartLineId, Price, ProductId, VariantId};
use serde::{Deserialize, Serialize};

// =============================================================================
// Image Types
// =============================================================================

/// Product or variant image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    /// Image URL.
    pub url: String,
    /// Alt text for accessibility.
    pub alt_text: Option<String>,
}

// =============================================================================
// Product Types
// =============================================================================

/// A product variant (specific combination of options).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductVariant {
    /// Variant ID (the cart's merchandise ID).
    pub id: VariantId,
    /// Variant title (combination of option values).
    pub title: String,
    /// Whether this variant is available for sale.
    pub available_for_sale: bool,
    /// Current price.
    pub price: Price,
}

/// A product in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Product ID.
    pub id: ProductId,
    /// URL handle.
    pub handle: String,
    /// Product title.
    pub title: String,
    /// Plain text description.
    pub description: String,
    /// Minimum price among all variants.
    pub min_price: Price,
    /// Featured image.
    pub featured_image: Option<Image>,
    /// All product images.
    pub images: Vec<Image>,
    /// Product variants.
    pub variants: Vec<ProductVariant>,
}

// =============================================================================
// Cart Types
// =============================================================================

/// Merchandise in a cart line (simplified product variant info).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartMerchandise {
    /// Variant ID.
    pub id: VariantId,
    /// Variant title.
    pub title: String,
    /// Unit price.
    pub price: Price,
    /// Variant image.
    pub image: Option<Image>,
    /// Parent product title.
    pub product_title: String,
}

/// A line item in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Cart line ID (distinct from the variant ID).
    pub id: CartLineId,
    /// Quantity, always at least 1.
    pub quantity: u32,
    /// Product variant.
    pub merchandise: CartMerchandise,
    /// Line total after discounts.
    pub total: Price,
}

impl CartLine {
    /// Unit price of the line.
    #[must_use]
    pub const fn unit_price(&self) -> Price {
        self.merchandise.price
    }

    /// Title to show for this line (product title).
    #[must_use]
    pub fn display_title(&self) -> &str {
        &self.merchandise.product_title
    }

    /// Variant title, unless it is Shopify's placeholder for single-variant products.
    #[must_use]
    pub fn variant_title(&self) -> Option<&str> {
        (self.merchandise.title != "Default Title").then_some(self.merchandise.title.as_str())
    }

    /// Image URL, if the variant has one.
    #[must_use]
    pub fn image_url(&self) -> Option<&str> {
        self.merchandise.image.as_ref().map(|i| i.url.as_str())
    }
}

/// A shopping cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    /// Cart ID.
    pub id: CartId,
    /// Checkout URL (hands payment off to Shopify).
    pub checkout_url: String,
    /// Total item quantity.
    pub total_quantity: u32,
    /// Subtotal before tax/shipping.
    pub subtotal: Price,
    /// Total amount.
    pub total: Price,
    /// Cart lines, in server order.
    pub lines: Vec<CartLine>,
}

impl Cart {
    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Find a line by ID.
    #[must_use]
    pub fn line(&self, id: &CartLineId) -> Option<&CartLine> {
        self.lines.iter().find(|l| &l.id == id)
    }
}

/// Input for adding a line to cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineInput {
    /// Product variant ID.
    pub merchandise_id: VariantId,
    /// Quantity to add.
    pub quantity: u32,
}

impl CartLineInput {
    /// Create a line input.
    #[must_use]
    pub const fn new(merchandise_id: VariantId, quantity: u32) -> Self {
        Self {
            merchandise_id,
            quantity,
        }
    }
}

/// Input for updating a cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineUpdateInput {
    /// Cart line ID.
    pub id: CartLineId,
    /// New quantity.
    pub quantity: u32,
}

/// User error from cart mutations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartUserError {
    /// Error code.
    pub code: Option<String>,
    /// Field path that caused the error.
    pub field: Option<Vec<String>>,
    /// Human-readable error message.
    pub message: String,
}

impl CartUserError {
    /// Whether the error is about the cart ID itself (the cart is gone).
    #[must_use]
    pub fn concerns_cart_id(&self) -> bool {
        self.field
            .as_ref()
            .and_then(|f| f.first())
            .is_some_and(|f| f == "cartId")
    }
}
