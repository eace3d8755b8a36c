//! Product catalog with a mock fallback.
//!
//! Products are flattened into [`ProductRecord`]s for display. When Shopify
//! cannot be reached the catalog serves three sample products instead, and
//! says so through [`Origin::Fallback`] so a misconfigured store does not
//! silently look like a working one.

use std::sync::LazyLock;

use scamp_core::{CurrencyCode, Decimal, Price, ProductId, VariantId};
use serde::Serialize;
use tracing::{error, instrument, warn};

use crate::config::CatalogConfig;
use crate::shopify::{CatalogApi, FailureKind, Product, ShopifyError};

/// A product flattened for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductRecord {
    pub id: ProductId,
    pub title: String,
    pub description: String,
    /// Lowest variant price.
    pub price: Price,
    /// Featured image URL.
    pub image: Option<String>,
    pub images: Vec<String>,
    pub variants: Vec<VariantRecord>,
}

impl ProductRecord {
    /// Identifier used in storefront URLs (`/products/{id}`).
    #[must_use]
    pub fn path_id(&self) -> &str {
        self.id.local_part()
    }

    /// The variant added by a plain "Add to cart": the first one for sale.
    #[must_use]
    pub fn default_variant(&self) -> Option<&VariantRecord> {
        self.variants.iter().find(|v| v.available)
    }
}

impl From<Product> for ProductRecord {
    fn from(product: Product) -> Self {
        let images: Vec<String> = product.images.into_iter().map(|i| i.url).collect();
        Self {
            id: product.id,
            title: product.title,
            description: product.description,
            price: product.min_price,
            image: product
                .featured_image
                .map(|i| i.url)
                .or_else(|| images.first().cloned()),
            images,
            variants: product
                .variants
                .into_iter()
                .map(|v| VariantRecord {
                    id: v.id,
                    title: v.title,
                    price: v.price,
                    available: v.available_for_sale,
                })
                .collect(),
        }
    }
}

/// A purchasable variant of a [`ProductRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantRecord {
    pub id: VariantId,
    pub title: String,
    pub price: Price,
    pub available: bool,
}

/// Where a catalog result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Live,
    /// Sample data served because the live fetch failed.
    Fallback(FailureKind),
}

/// A catalog result together with its [`Origin`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fetched<T> {
    pub value: T,
    pub origin: Origin,
}

impl<T> Fetched<T> {
    const fn live(value: T) -> Self {
        Self {
            value,
            origin: Origin::Live,
        }
    }

    /// Whether this is sample data.
    #[must_use]
    pub const fn is_fallback(&self) -> bool {
        matches!(self.origin, Origin::Fallback(_))
    }
}

static SAMPLE_PRODUCTS: LazyLock<Vec<ProductRecord>> = LazyLock::new(|| {
    [
        (
            1,
            "Sample Product 1",
            "This is a sample product description. It would contain details about the product features and benefits.",
            1999,
        ),
        (
            2,
            "Sample Product 2",
            "Another sample product with a detailed description to show how the content would appear on the product page.",
            2999,
        ),
        (
            3,
            "Sample Product 3",
            "A third sample product with details about what makes it special and why customers should buy it.",
            3999,
        ),
    ]
    .into_iter()
    .filter_map(|(n, title, description, cents)| {
        let image = format!("https://placehold.co/500x500/e2e8f0/1e293b?text=Product+{n}");
        Some(ProductRecord {
            id: ProductId::parse(&n.to_string()).ok()?,
            title: title.to_string(),
            description: description.to_string(),
            price: Price::new(Decimal::new(cents, 2), CurrencyCode::USD),
            image: Some(image.clone()),
            images: vec![image],
            variants: vec![],
        })
    })
    .collect()
});

/// The sample products served when Shopify is unavailable.
#[must_use]
pub fn sample_products() -> &'static [ProductRecord] {
    &SAMPLE_PRODUCTS
}

/// Catalog reads over a [`CatalogApi`].
#[derive(Debug, Clone)]
pub struct Catalog<A> {
    api: A,
    page_size: u32,
    fallback_enabled: bool,
}

impl<A: CatalogApi> Catalog<A> {
    /// Create a catalog reading `page_size` products per listing.
    #[must_use]
    pub const fn new(api: A, page_size: u32, config: &CatalogConfig) -> Self {
        Self {
            api,
            page_size,
            fallback_enabled: config.fallback_enabled,
        }
    }

    /// The underlying API.
    pub const fn api(&self) -> &A {
        &self.api
    }

    /// First page of products.
    ///
    /// # Errors
    ///
    /// Returns the API error only when fallback is disabled.
    #[instrument(skip(self))]
    pub async fn products(&self) -> Result<Fetched<Vec<ProductRecord>>, ShopifyError> {
        match self.api.get_products(self.page_size).await {
            Ok(products) => Ok(Fetched::live(
                products.into_iter().map(ProductRecord::from).collect(),
            )),
            Err(e) => self.fall_back(e, || sample_products().to_vec()),
        }
    }

    /// A single product; `None` if Shopify has no such product.
    ///
    /// # Errors
    ///
    /// Returns the API error only when fallback is disabled.
    #[instrument(skip(self, id), fields(product_id = %id))]
    pub async fn product(
        &self,
        id: &ProductId,
    ) -> Result<Fetched<Option<ProductRecord>>, ShopifyError> {
        match self.api.get_product(id).await {
            Ok(product) => Ok(Fetched::live(Some(product.into()))),
            Err(e) if e.kind() == FailureKind::NotFound => Ok(Fetched::live(None)),
            Err(e) => self.fall_back(e, || {
                sample_products().iter().find(|p| &p.id == id).cloned()
            }),
        }
    }

    fn fall_back<T>(
        &self,
        err: ShopifyError,
        sample: impl FnOnce() -> T,
    ) -> Result<Fetched<T>, ShopifyError> {
        if !self.fallback_enabled {
            return Err(err);
        }

        let kind = err.kind();
        if kind == FailureKind::Permanent {
            error!(error = %err, "Catalog request failed permanently, serving sample products");
        } else {
            warn!(error = %err, "Catalog request failed, serving sample products");
        }

        Ok(Fetched {
            value: sample(),
            origin: Origin::Fallback(kind),
        })
    }
}
