//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::{error, instrument};

use super::products::{FallbackNotice, ProductView};
use crate::filters;
use crate::middleware::VisitorCart;
use crate::state::AppState;

/// Products shown in the featured grid.
const FEATURED_PRODUCTS: usize = 4;

#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub featured_products: Vec<ProductView>,
    pub notice: Option<FallbackNotice>,
    pub cart_count: u32,
}

/// Home page: featured products and the cart badge.
///
/// The page always renders; if the catalog cannot be read at all the grid is
/// left empty.
#[instrument(skip(state, cart))]
pub async fn home(State(state): State<AppState>, cart: VisitorCart) -> impl IntoResponse {
    let (featured_products, notice) = state.catalog().products().await.map_or_else(
        |e| {
            error!("Failed to fetch featured products: {e}");
            (Vec::new(), None)
        },
        |fetched| {
            (
                fetched
                    .value
                    .iter()
                    .take(FEATURED_PRODUCTS)
                    .map(ProductView::from)
                    .collect(),
                FallbackNotice::from_origin(fetched.origin),
            )
        },
    );

    HomeTemplate {
        featured_products,
        notice,
        cart_count: cart.store().snapshot().total_quantity(),
    }
}
