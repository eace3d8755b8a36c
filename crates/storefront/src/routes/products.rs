//! Product route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use scamp_core::ProductId;
use tracing::instrument;

use crate::catalog::{Origin, ProductRecord};
use crate::error::{AppError, Result};
use crate::filters;
use crate::shopify::FailureKind;
use crate::state::AppState;

/// Product display data for templates.
#[derive(Clone)]
pub struct ProductView {
    pub id: String,
    pub title: String,
    pub description: String,
    pub price: String,
    pub image: Option<String>,
    pub images: Vec<String>,
    pub variants: Vec<VariantView>,
    /// Variant added by the plain "Add to cart" button.
    pub default_variant_id: Option<String>,
}

/// Variant display data for templates.
#[derive(Clone)]
pub struct VariantView {
    pub id: String,
    pub title: String,
    pub price: String,
    pub available: bool,
}

impl From<&ProductRecord> for ProductView {
    fn from(product: &ProductRecord) -> Self {
        Self {
            id: product.path_id().to_string(),
            title: product.title.clone(),
            description: product.description.clone(),
            price: product.price.display(),
            image: product.image.clone(),
            images: product.images.clone(),
            variants: product
                .variants
                .iter()
                .map(|v| VariantView {
                    id: v.id.to_string(),
                    title: v.title.clone(),
                    price: v.price.display(),
                    available: v.available,
                })
                .collect(),
            default_variant_id: product.default_variant().map(|v| v.id.to_string()),
        }
    }
}

/// Banner shown when sample products stand in for the live catalog.
#[derive(Clone)]
pub struct FallbackNotice {
    pub message: &'static str,
}

impl FallbackNotice {
    pub(crate) const fn from_origin(origin: Origin) -> Option<Self> {
        match origin {
            Origin::Live => None,
            Origin::Fallback(FailureKind::Permanent) => Some(Self {
                message: "The store is not configured correctly. Showing sample products.",
            }),
            Origin::Fallback(_) => Some(Self {
                message: "The store is temporarily unavailable. Showing sample products.",
            }),
        }
    }
}

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub products: Vec<ProductView>,
    pub notice: Option<FallbackNotice>,
    pub cart_count: u32,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub product: ProductView,
    pub notice: Option<FallbackNotice>,
    pub cart_count: u32,
}

/// Display product listing page.
#[instrument(skip(state, cart))]
pub async fn index(
    State(state): State<AppState>,
    cart: crate::middleware::VisitorCart,
) -> Result<impl IntoResponse> {
    let fetched = state.catalog().products().await?;

    Ok(ProductsIndexTemplate {
        products: fetched.value.iter().map(ProductView::from).collect(),
        notice: FallbackNotice::from_origin(fetched.origin),
        cart_count: cart.store().snapshot().total_quantity(),
    })
}

/// Display product detail page.
///
/// Accepts either the numeric product ID or the full `gid://` form.
#[instrument(skip(state, cart))]
pub async fn show(
    State(state): State<AppState>,
    cart: crate::middleware::VisitorCart,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let product_id =
        ProductId::parse(&id).map_err(|_| AppError::NotFound(format!("product {id}")))?;

    let fetched = state.catalog().product(&product_id).await?;
    let notice = FallbackNotice::from_origin(fetched.origin);
    let product = fetched
        .value
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    Ok(ProductShowTemplate {
        product: ProductView::from(&product),
        notice,
        cart_count: cart.store().snapshot().total_quantity(),
    })
}
