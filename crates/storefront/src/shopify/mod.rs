//! Shopify Storefront API client.
//!
//! # Architecture
//!
//! - Hand-written GraphQL documents implementing `graphql_client::GraphQLQuery`
//! - Shopify is source of truth - no local sync, direct API calls
//! - In-memory caching via `moka` for product responses (5 minute TTL)
//! - Every failure is classified into a [`FailureKind`] so callers can decide
//!   between retrying, recreating a missing resource, or surfacing the error
//!
//! # Example
//!
//! ```rust,ignore
//! use scamp_storefront::shopify::{CartApi, CatalogApi, StorefrontClient};
//!
//! let client = StorefrontClient::new(&config.shopify)?;
//!
//! let products = client.get_products(10).await?;
//! let cart = client.create_cart(vec![CartLineInput::new(variant_id, 1)]).await?;
//! ```

mod api;
mod retry;
mod storefront;
pub mod types;

pub use api::{CartApi, CatalogApi};
pub use retry::{Idempotency, RetryPolicy};
pub use storefront::StorefrontClient;
pub use types::*;

use thiserror::Error;

/// Errors that can occur when interacting with Shopify APIs.
#[derive(Debug, Error)]
pub enum ShopifyError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// GraphQL query returned errors.
    #[error("GraphQL errors: {}", format_graphql_errors(.0))]
    GraphQL(Vec<GraphQLError>),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The payload parsed but a value in it was unusable.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by Shopify.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// User error from mutation (e.g., invalid input).
    #[error("User error: {0}")]
    UserError(String),
}

/// How a failure should be handled by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Network trouble, throttling, or a server-side fault. Worth retrying.
    Transient,
    /// The addressed resource does not exist (e.g., an expired cart).
    NotFound,
    /// Bad configuration or a request Shopify will never accept.
    Permanent,
}

impl ShopifyError {
    /// Classify this error.
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Http(e) if e.is_decode() || e.is_builder() => FailureKind::Permanent,
            Self::Http(_) | Self::RateLimited(_) => FailureKind::Transient,
            Self::Status { status, .. } if *status >= 500 => FailureKind::Transient,
            Self::GraphQL(errors) if errors.iter().any(GraphQLError::is_throttled) => {
                FailureKind::Transient
            }
            Self::NotFound(_) => FailureKind::NotFound,
            Self::Status { .. }
            | Self::GraphQL(_)
            | Self::Parse(_)
            | Self::InvalidResponse(_)
            | Self::UserError(_) => FailureKind::Permanent,
        }
    }

    /// Whether the request is known to have been turned away before Shopify
    /// acted on it, which makes retrying a non-idempotent mutation safe.
    #[must_use]
    pub fn rejected_before_processing(&self) -> bool {
        match self {
            Self::Http(e) => e.is_connect(),
            Self::RateLimited(_) => true,
            Self::GraphQL(errors) => errors.iter().any(GraphQLError::is_throttled),
            Self::Status { status, .. } => *status == 503,
            _ => false,
        }
    }

    /// Suggested delay before retrying, when Shopify told us.
    #[must_use]
    pub const fn retry_after_secs(&self) -> Option<u64> {
        match self {
            Self::RateLimited(secs) => Some(*secs),
            _ => None,
        }
    }
}

/// A GraphQL error returned by the Shopify API.
#[derive(Debug, Clone)]
pub struct GraphQLError {
    /// Error message.
    pub message: String,
    /// Source locations in the query.
    pub locations: Vec<GraphQLErrorLocation>,
    /// Path to the error in the response.
    pub path: Vec<serde_json::Value>,
    /// `extensions.code`, when present (e.g., `THROTTLED`).
    pub code: Option<String>,
}

impl GraphQLError {
    /// Create an error with only a message.
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            locations: vec![],
            path: vec![],
            code: None,
        }
    }

    /// Shopify's cost-based throttle rejects the query before running it.
    #[must_use]
    pub fn is_throttled(&self) -> bool {
        self.code.as_deref() == Some("THROTTLED")
    }
}

/// Location in a GraphQL query where an error occurred.
#[derive(Debug, Clone)]
pub struct GraphQLErrorLocation {
    /// Line number (1-indexed).
    pub line: i64,
    /// Column number (1-indexed).
    pub column: i64,
}

fn format_graphql_errors(errors: &[GraphQLError]) -> String {
    if errors.is_empty() {
        return "(no error details provided)".to_string();
    }

    errors
        .iter()
        .enumerate()
        .map(|(i, e)| {
            let mut parts = Vec::new();

            if !e.message.is_empty() {
                parts.push(e.message.clone());
            }

            if let Some(code) = &e.code {
                parts.push(format!("[{code}]"));
            }

            if !e.path.is_empty() {
                let path_str = e
                    .path
                    .iter()
                    .map(|p| match p {
                        serde_json::Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(".");
                parts.push(format!("path: {path_str}"));
            }

            if let Some(loc) = e.locations.first() {
                parts.push(format!("at line {}:{}", loc.line, loc.column));
            }

            if parts.is_empty() {
                format!("[error {}]: (no details)", i + 1)
            } else {
                parts.join(" ")
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}
