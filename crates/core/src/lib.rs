//! SCAMP Core - Shared types library.
//!
//! This crate provides common types used across all SCAMP components:
//! - `storefront` - Server-rendered storefront and the cart/catalog library
//! - `cli` - Command-line client for browsing the catalog and managing a cart
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. This keeps it
//! lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Typed Shopify global IDs and prices

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;

// Re-export so dependents do not need a direct `rust_decimal` dependency
pub use rust_decimal::Decimal;
