//! Session-related types.
//!
//! The session only remembers who the visitor is and which Shopify cart
//! belongs to them. The cart itself always lives in Shopify.

/// Session keys.
pub mod keys {
    /// Key for the anonymous visitor ID that selects the visitor's cart store.
    pub const VISITOR_ID: &str = "visitor_id";

    /// Key for storing the Shopify cart ID.
    pub const CART_ID: &str = "cart_id";
}
