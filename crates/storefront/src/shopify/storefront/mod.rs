//! Shopify Storefront API client implementation.
//!
//! Uses `graphql_client` request/response envelopes with `reqwest` 0.13 for
//! HTTP. Caches products using `moka` (5-minute TTL). Carts are never cached.

mod cache;
mod conversions;
pub mod queries;

use std::sync::Arc;
use std::time::Duration;

use graphql_client::{GraphQLQuery, Response};
use moka::future::Cache;
use scamp_core::{CartId, CartLineId, ProductId};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, instrument};

use super::api::{CartApi, CatalogApi};
use super::retry::{Idempotency, RetryPolicy};
use crate::config::ShopifyStorefrontConfig;
use crate::shopify::types::{Cart, CartLineInput, CartLineUpdateInput, Product};
use crate::shopify::{GraphQLError, GraphQLErrorLocation, ShopifyError};

use cache::CacheValue;
use conversions::{cart_from_payload, convert_cart, convert_product};
use queries::{
    AddToCart, CreateCart, GetCart, GetProduct, GetProducts, RemoveFromCart, UpdateCartLines,
    add_to_cart, create_cart, get_cart, get_product, get_products, remove_from_cart,
    update_cart_lines,
};

// =============================================================================
// StorefrontClient
// =============================================================================

/// Client for the Shopify Storefront API.
///
/// Cheap to clone. Products are cached for 5 minutes; every cart call goes to
/// Shopify.
#[derive(Clone)]
pub struct StorefrontClient {
    inner: Arc<StorefrontClientInner>,
}

struct StorefrontClientInner {
    client: reqwest::Client,
    endpoint: String,
    token_header: &'static str,
    access_token: SecretString,
    retry: RetryPolicy,
    cache: Cache<String, CacheValue>,
}

impl StorefrontClient {
    /// Create a new Storefront API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &ShopifyStorefrontConfig) -> Result<Self, ShopifyError> {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(StorefrontClientInner {
                client,
                endpoint: config.endpoint(),
                token_header: config.token_kind.header_name(),
                access_token: config.access_token.clone(),
                retry: RetryPolicy::from_config(config),
                cache,
            }),
        })
    }

    /// The GraphQL endpoint this client posts to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.inner.endpoint
    }

    /// Execute a GraphQL operation, retrying transient failures.
    async fn execute<Q: GraphQLQuery>(
        &self,
        idempotency: Idempotency,
        variables: Q::Variables,
    ) -> Result<Q::ResponseData, ShopifyError>
    where
        Q::Variables: Clone,
    {
        let operation = std::any::type_name::<Q>()
            .rsplit("::")
            .next()
            .unwrap_or("graphql");
        self.inner
            .retry
            .run(operation, idempotency, || self.execute_once::<Q>(variables.clone()))
            .await
    }

    /// Execute a GraphQL operation once.
    async fn execute_once<Q: GraphQLQuery>(
        &self,
        variables: Q::Variables,
    ) -> Result<Q::ResponseData, ShopifyError> {
        let request_body = Q::build_query(variables);

        let response = self
            .inner
            .client
            .post(&self.inner.endpoint)
            .header(self.inner.token_header, self.inner.access_token.expose_secret())
            .header("Content-Type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();

        // Check for rate limiting
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ShopifyError::RateLimited(retry_after));
        }

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %response_text.chars().take(500).collect::<String>(),
                "Shopify API returned non-success status"
            );
            return Err(ShopifyError::Status {
                status: status.as_u16(),
                body: response_text.chars().take(200).collect(),
            });
        }

        let response: Response<Q::ResponseData> = match serde_json::from_str(&response_text) {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    body = %response_text.chars().take(500).collect::<String>(),
                    "Failed to parse Shopify GraphQL response"
                );
                return Err(ShopifyError::Parse(e));
            }
        };

        if let Some(errors) = response.errors
            && !errors.is_empty()
        {
            tracing::debug!(errors = ?errors, "GraphQL errors in response");
            return Err(ShopifyError::GraphQL(
                errors.into_iter().map(convert_graphql_error).collect(),
            ));
        }

        response.data.ok_or_else(|| {
            tracing::error!(
                body = %response_text.chars().take(500).collect::<String>(),
                "Shopify GraphQL response has no data and no errors"
            );
            ShopifyError::InvalidResponse("No data in response".to_string())
        })
    }
}

fn convert_graphql_error(e: graphql_client::Error) -> GraphQLError {
    GraphQLError {
        message: e.message,
        locations: e.locations.map_or_else(Vec::new, |locs| {
            locs.into_iter()
                .map(|l| GraphQLErrorLocation {
                    line: i64::from(l.line),
                    column: i64::from(l.column),
                })
                .collect()
        }),
        path: e.path.map_or_else(Vec::new, |p| {
            p.into_iter()
                .map(|fragment| match fragment {
                    graphql_client::PathFragment::Key(s) => serde_json::Value::String(s),
                    graphql_client::PathFragment::Index(i) => serde_json::Value::Number(i.into()),
                })
                .collect()
        }),
        code: e.extensions.and_then(|ext| {
            ext.get("code")
                .and_then(serde_json::Value::as_str)
                .map(String::from)
        }),
    }
}

// =============================================================================
// Product Methods
// =============================================================================

impl CatalogApi for StorefrontClient {
    #[instrument(skip(self))]
    async fn get_products(&self, first: u32) -> Result<Vec<Product>, ShopifyError> {
        let cache_key = format!("products:{first}");

        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let variables = get_products::Variables {
            first: i64::from(first),
        };

        let data = self
            .execute::<GetProducts>(Idempotency::Idempotent, variables)
            .await?;

        let products = data
            .products
            .into_nodes()
            .map(convert_product)
            .collect::<Result<Vec<_>, _>>()?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Products(products.clone()))
            .await;

        Ok(products)
    }

    #[instrument(skip(self), fields(product_id = %id))]
    async fn get_product(&self, id: &ProductId) -> Result<Product, ShopifyError> {
        let cache_key = format!("product:{id}");

        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let variables = get_product::Variables {
            id: id.to_string(),
        };

        let data = self
            .execute::<GetProduct>(Idempotency::Idempotent, variables)
            .await?;

        let product_data = data
            .product
            .ok_or_else(|| ShopifyError::NotFound(format!("Product not found: {id}")))?;

        let product = convert_product(product_data)?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }
}

// =============================================================================
// Cart Methods (not cached - mutable state)
// =============================================================================

impl CartApi for StorefrontClient {
    #[instrument(skip(self, lines), fields(lines = lines.len()))]
    async fn create_cart(&self, lines: Vec<CartLineInput>) -> Result<Cart, ShopifyError> {
        let variables = create_cart::Variables {
            input: create_cart::CartInput { lines },
        };

        let data = self
            .execute::<CreateCart>(Idempotency::NonIdempotent, variables)
            .await?;

        cart_from_payload(data.cart_create, None)
    }

    #[instrument(skip(self), fields(cart_id = %cart_id))]
    async fn get_cart(&self, cart_id: &CartId) -> Result<Cart, ShopifyError> {
        let variables = get_cart::Variables {
            cart_id: cart_id.to_string(),
        };

        let data = self
            .execute::<GetCart>(Idempotency::Idempotent, variables)
            .await?;

        data.cart
            .ok_or_else(|| ShopifyError::NotFound(format!("Cart not found: {cart_id}")))
            .and_then(convert_cart)
    }

    #[instrument(skip(self, lines), fields(cart_id = %cart_id))]
    async fn add_cart_lines(
        &self,
        cart_id: &CartId,
        lines: Vec<CartLineInput>,
    ) -> Result<Cart, ShopifyError> {
        let variables = add_to_cart::Variables {
            cart_id: cart_id.to_string(),
            lines,
        };

        let data = self
            .execute::<AddToCart>(Idempotency::NonIdempotent, variables)
            .await?;

        cart_from_payload(data.cart_lines_add, Some(cart_id))
    }

    #[instrument(skip(self, lines), fields(cart_id = %cart_id))]
    async fn update_cart_lines(
        &self,
        cart_id: &CartId,
        lines: Vec<CartLineUpdateInput>,
    ) -> Result<Cart, ShopifyError> {
        // Setting an absolute quantity is safe to repeat.
        let variables = update_cart_lines::Variables {
            cart_id: cart_id.to_string(),
            lines,
        };

        let data = self
            .execute::<UpdateCartLines>(Idempotency::Idempotent, variables)
            .await?;

        cart_from_payload(data.cart_lines_update, Some(cart_id))
    }

    #[instrument(skip(self, line_ids), fields(cart_id = %cart_id))]
    async fn remove_cart_lines(
        &self,
        cart_id: &CartId,
        line_ids: Vec<CartLineId>,
    ) -> Result<Cart, ShopifyError> {
        let variables = remove_from_cart::Variables {
            cart_id: cart_id.to_string(),
            line_ids: line_ids.into_iter().map(String::from).collect(),
        };

        let data = self
            .execute::<RemoveFromCart>(Idempotency::NonIdempotent, variables)
            .await?;

        cart_from_payload(data.cart_lines_remove, Some(cart_id))
    }
}
