//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront
//! - `SHOPIFY_STORE` - Shopify store domain (e.g., scamp.myshopify.com)
//! - `SHOPIFY_STOREFRONT_TOKEN` - Storefront API access token
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `CART_SESSION_IDLE_SECS` - Idle time before a visitor's cart store is dropped (default: 1800)
//! - `CART_SESSION_CAPACITY` - Maximum number of live cart stores (default: 10000)
//! - `CATALOG_FALLBACK` - Serve sample products when Shopify is unreachable (default: true)
//! - `SHOPIFY_API_VERSION` - API version (default: 2025-01)
//! - `SHOPIFY_STOREFRONT_TOKEN_KIND` - `public` or `private` (default: public)
//! - `SHOPIFY_STOREFRONT_ENDPOINT` - Full GraphQL endpoint override
//! - `SHOPIFY_REQUEST_TIMEOUT_SECS` - Per-request timeout (default: 10)
//! - `SHOPIFY_MAX_RETRIES` - Retries for transient failures (default: 2)
//! - `SHOPIFY_RETRY_BACKOFF_MS` - Base retry backoff (default: 250)
//! - `SHOPIFY_PRODUCT_PAGE_SIZE` - Products per listing page (default: 10)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "your_",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Shopify Storefront API configuration
    pub shopify: ShopifyStorefrontConfig,
    /// Catalog behaviour
    pub catalog: CatalogConfig,
    /// Per-visitor cart store registry
    pub cart: CartConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name (e.g., "production")
    pub sentry_environment: Option<String>,
}

/// Which Storefront API token is configured.
///
/// Public tokens are the ones a browser would embed; private tokens are
/// server-side only and travel in a different header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenKind {
    #[default]
    Public,
    Private,
}

impl TokenKind {
    /// HTTP header that carries this kind of token.
    #[must_use]
    pub const fn header_name(self) -> &'static str {
        match self {
            Self::Public => "X-Shopify-Storefront-Access-Token",
            Self::Private => "Shopify-Storefront-Private-Token",
        }
    }
}

impl FromStr for TokenKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "public" => Ok(Self::Public),
            "private" => Ok(Self::Private),
            other => Err(format!("expected `public` or `private`, got `{other}`")),
        }
    }
}

/// Shopify Storefront API configuration.
///
/// Implements `Debug` manually to redact the access token.
#[derive(Clone)]
pub struct ShopifyStorefrontConfig {
    /// Shopify store domain (e.g., scamp.myshopify.com)
    pub store: String,
    /// Shopify API version (e.g., 2025-01)
    pub api_version: String,
    /// Storefront API access token
    pub access_token: SecretString,
    /// Header the token is sent in
    pub token_kind: TokenKind,
    /// Full endpoint URL, overriding the one derived from `store`
    pub endpoint_override: Option<String>,
    /// Timeout applied to each HTTP request
    pub request_timeout: Duration,
    /// Retries for transient failures (0 disables retrying)
    pub max_retries: u32,
    /// Base backoff between retries (doubled each attempt)
    pub retry_backoff: Duration,
    /// Products fetched per listing page
    pub product_page_size: u32,
}

impl std::fmt::Debug for ShopifyStorefrontConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopifyStorefrontConfig")
            .field("store", &self.store)
            .field("api_version", &self.api_version)
            .field("access_token", &"[REDACTED]")
            .field("token_kind", &self.token_kind)
            .field("endpoint_override", &self.endpoint_override)
            .field("request_timeout", &self.request_timeout)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff", &self.retry_backoff)
            .field("product_page_size", &self.product_page_size)
            .finish()
    }
}

/// Catalog configuration.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Serve the built-in sample products when the API fails
    pub fallback_enabled: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            fallback_enabled: true,
        }
    }
}

/// Cart store registry configuration.
#[derive(Debug, Clone)]
pub struct CartConfig {
    /// Idle time after which a visitor's cart store is evicted
    pub session_idle: Duration,
    /// Maximum number of cart stores kept in memory
    pub session_capacity: u64,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            session_idle: Duration::from_secs(30 * 60),
            session_capacity: 10_000,
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the access token fails validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_parsed_env("STOREFRONT_HOST", "127.0.0.1")?;
        let port = get_parsed_env("STOREFRONT_PORT", "3000")?;
        let base_url = get_required_env("STOREFRONT_BASE_URL")?;
        url::Url::parse(&base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("STOREFRONT_BASE_URL".to_string(), e.to_string())
        })?;

        let shopify = ShopifyStorefrontConfig::from_env()?;
        let catalog = CatalogConfig {
            fallback_enabled: get_parsed_env("CATALOG_FALLBACK", "true")?,
        };
        let cart = CartConfig {
            session_idle: Duration::from_secs(get_parsed_env("CART_SESSION_IDLE_SECS", "1800")?),
            session_capacity: get_parsed_env("CART_SESSION_CAPACITY", "10000")?,
        };

        Ok(Self {
            host,
            port,
            base_url,
            shopify,
            catalog,
            cart,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the storefront is served over HTTPS (drives secure cookies).
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl ShopifyStorefrontConfig {
    /// Load the Shopify settings on their own (used by the CLI).
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let endpoint_override = get_optional_env("SHOPIFY_STOREFRONT_ENDPOINT");
        if let Some(endpoint) = &endpoint_override {
            url::Url::parse(endpoint).map_err(|e| {
                ConfigError::InvalidEnvVar("SHOPIFY_STOREFRONT_ENDPOINT".to_string(), e.to_string())
            })?;
        }

        let product_page_size: u32 = get_parsed_env("SHOPIFY_PRODUCT_PAGE_SIZE", "10")?;
        if !(1..=250).contains(&product_page_size) {
            return Err(ConfigError::InvalidEnvVar(
                "SHOPIFY_PRODUCT_PAGE_SIZE".to_string(),
                "must be between 1 and 250".to_string(),
            ));
        }

        Ok(Self {
            store: get_required_env("SHOPIFY_STORE")?,
            api_version: get_env_or_default("SHOPIFY_API_VERSION", "2025-01"),
            access_token: get_validated_secret("SHOPIFY_STOREFRONT_TOKEN")?,
            token_kind: get_parsed_env("SHOPIFY_STOREFRONT_TOKEN_KIND", "public")?,
            endpoint_override,
            request_timeout: Duration::from_secs(get_parsed_env(
                "SHOPIFY_REQUEST_TIMEOUT_SECS",
                "10",
            )?),
            max_retries: get_parsed_env("SHOPIFY_MAX_RETRIES", "2")?,
            retry_backoff: Duration::from_millis(get_parsed_env("SHOPIFY_RETRY_BACKOFF_MS", "250")?),
            product_page_size,
        })
    }

    /// The GraphQL endpoint requests are posted to.
    #[must_use]
    pub fn endpoint(&self) -> String {
        self.endpoint_override.clone().unwrap_or_else(|| {
            format!(
                "https://{}/api/{}/graphql.json",
                self.store, self.api_version
            )
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get an environment variable (or its default) parsed into `T`.
fn get_parsed_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Real Storefront tokens are 32 hex chars, comfortably above this bound.
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1})"
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn shopify_config() -> ShopifyStorefrontConfig {
        ShopifyStorefrontConfig {
            store: "scamp.myshopify.com".to_string(),
            api_version: "2025-01".to_string(),
            access_token: SecretString::from("e01d5c460eac1f4f6257b8b621710c83"),
            token_kind: TokenKind::Public,
            endpoint_override: None,
            request_timeout: Duration::from_secs(10),
            max_retries: 2,
            retry_backoff: Duration::from_millis(250),
            product_page_size: 10,
        }
    }

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-storefront-access-token", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_hex_token() {
        let result = validate_secret_strength("e01d5c460eac1f4f6257b8b621710c83", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_token_kind_parse_and_header() {
        assert_eq!("Private".parse::<TokenKind>().unwrap(), TokenKind::Private);
        assert_eq!(
            TokenKind::Public.header_name(),
            "X-Shopify-Storefront-Access-Token"
        );
        assert!("secret".parse::<TokenKind>().is_err());
    }

    #[test]
    fn test_endpoint_derived_from_store() {
        let config = shopify_config();
        assert_eq!(
            config.endpoint(),
            "https://scamp.myshopify.com/api/2025-01/graphql.json"
        );
    }

    #[test]
    fn test_endpoint_override_wins() {
        let config = ShopifyStorefrontConfig {
            endpoint_override: Some("http://127.0.0.1:9999/graphql".to_string()),
            ..shopify_config()
        };
        assert_eq!(config.endpoint(), "http://127.0.0.1:9999/graphql");
    }

    #[test]
    fn test_socket_addr() {
        let config = StorefrontConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            shopify: shopify_config(),
            catalog: CatalogConfig::default(),
            cart: CartConfig::default(),
            sentry_dsn: None,
            sentry_environment: None,
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
        assert!(!config.is_secure());
    }

    #[test]
    fn test_shopify_config_debug_redacts_token() {
        let debug_output = format!("{:?}", shopify_config());

        assert!(debug_output.contains("scamp.myshopify.com"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("e01d5c460eac1f4f6257b8b621710c83"));
    }
}
