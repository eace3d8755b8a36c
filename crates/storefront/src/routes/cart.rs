//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! Every handler works on the visitor's [`CartStore`](crate::cart::CartStore)
//! and writes the resulting cart ID back to the session.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use scamp_core::{CartLineId, VariantId};
use serde::Deserialize;
use tracing::{instrument, warn};

use crate::cart::{CartItemInput, CartSnapshot};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::VisitorCart;
use crate::shopify::CartLine;

/// HTMX event fired after every cart change so badges and drawers reload.
const CART_UPDATED: (&str, &str) = ("HX-Trigger", "cart-updated");

/// Cart item display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub id: String,
    pub title: String,
    pub variant_title: Option<String>,
    pub quantity: u32,
    pub price: String,
    pub line_price: String,
    pub image: Option<String>,
}

impl From<&CartLine> for CartItemView {
    fn from(line: &CartLine) -> Self {
        Self {
            id: line.id.to_string(),
            title: line.display_title().to_string(),
            variant_title: line.variant_title().map(String::from),
            quantity: line.quantity,
            price: line.unit_price().display(),
            line_price: line.total.display(),
            image: line.image_url().map(String::from),
        }
    }
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub total: String,
    pub item_count: u32,
    pub has_checkout: bool,
    pub is_open: bool,
}

impl From<&CartSnapshot> for CartView {
    fn from(snapshot: &CartSnapshot) -> Self {
        Self {
            items: snapshot.lines().iter().map(CartItemView::from).collect(),
            subtotal: snapshot.subtotal().display(),
            total: snapshot.total().display(),
            item_count: snapshot.total_quantity(),
            has_checkout: snapshot.checkout_url().is_some(),
            is_open: snapshot.is_open,
        }
    }
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub variant_id: String,
    pub quantity: Option<i64>,
    /// "Buy now": add, then open the drawer.
    #[serde(default)]
    pub open: bool,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub line_id: String,
    pub quantity: i64,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub line_id: String,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub cart: CartView,
    pub cart_count: u32,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart drawer fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_drawer.html")]
pub struct CartDrawerTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

fn parse_line_id(raw: &str) -> Result<CartLineId> {
    CartLineId::parse(raw).map_err(|e| AppError::BadRequest(format!("line_id: {e}")))
}

/// Render the cart items fragment after a mutation.
fn items_fragment(snapshot: &CartSnapshot) -> Response {
    (
        AppendHeaders([CART_UPDATED]),
        CartItemsTemplate {
            cart: CartView::from(snapshot),
        },
    )
        .into_response()
}

/// Display cart page.
///
/// Re-reads the cart from Shopify first; if that fails the last known cart
/// is shown.
#[instrument(skip(cart))]
pub async fn show(cart: VisitorCart) -> impl IntoResponse {
    let snapshot = match cart.store().refresh().await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            warn!(error = %e, "Failed to refresh cart, showing last known state");
            cart.store().snapshot()
        }
    };
    cart.remember(&snapshot).await;

    CartShowTemplate {
        cart: CartView::from(&snapshot),
        cart_count: snapshot.total_quantity(),
    }
}

/// Get cart count badge (HTMX).
#[instrument(skip(cart))]
pub async fn count(cart: VisitorCart) -> impl IntoResponse {
    CartCountTemplate {
        count: cart.store().snapshot().total_quantity(),
    }
}

/// Add item to cart (HTMX).
///
/// Creates the cart on first use. Returns the updated count badge with an
/// HTMX trigger so other cart elements reload.
#[instrument(skip(cart))]
pub async fn add(cart: VisitorCart, Form(form): Form<AddToCartForm>) -> Result<Response> {
    let variant_id = VariantId::parse(&form.variant_id)
        .map_err(|e| AppError::BadRequest(format!("variant_id: {e}")))?;
    let quantity = form.quantity.unwrap_or(1);

    add_breadcrumb(
        "cart",
        "Added to cart",
        Some(&[("variant_id", variant_id.as_str())]),
    );

    let mut snapshot = cart
        .store()
        .add(CartItemInput::new(variant_id, quantity))
        .await?;
    if form.open {
        cart.store().open();
        snapshot = cart.store().snapshot();
    }
    cart.remember(&snapshot).await;

    Ok((
        AppendHeaders([CART_UPDATED]),
        CartCountTemplate {
            count: snapshot.total_quantity(),
        },
    )
        .into_response())
}

/// Update cart item quantity (HTMX). A quantity of zero removes the line.
#[instrument(skip(cart))]
pub async fn update(cart: VisitorCart, Form(form): Form<UpdateCartForm>) -> Result<Response> {
    let line_id = parse_line_id(&form.line_id)?;

    let snapshot = if form.quantity == 0 {
        cart.store().remove(&line_id).await?
    } else {
        cart.store().update_quantity(&line_id, form.quantity).await?
    };
    cart.remember(&snapshot).await;

    Ok(items_fragment(&snapshot))
}

/// Remove item from cart (HTMX).
#[instrument(skip(cart))]
pub async fn remove(cart: VisitorCart, Form(form): Form<RemoveFromCartForm>) -> Result<Response> {
    let line_id = parse_line_id(&form.line_id)?;

    let snapshot = cart.store().remove(&line_id).await?;
    cart.remember(&snapshot).await;

    Ok(items_fragment(&snapshot))
}

/// Empty the cart (HTMX).
///
/// The old cart is forgotten even if Shopify cannot create a new one.
#[instrument(skip(cart))]
pub async fn clear(cart: VisitorCart) -> Result<Response> {
    add_breadcrumb("cart", "Cleared cart", None);

    let result = cart.store().clear().await;
    cart.remember(&cart.store().snapshot()).await;

    Ok(items_fragment(&result?))
}

/// Open the cart drawer (HTMX).
#[instrument(skip(cart))]
pub async fn open(cart: VisitorCart) -> impl IntoResponse {
    cart.store().open();
    CartDrawerTemplate {
        cart: CartView::from(&cart.store().snapshot()),
    }
}

/// Close the cart drawer (HTMX).
#[instrument(skip(cart))]
pub async fn close(cart: VisitorCart) -> impl IntoResponse {
    cart.store().close();
    CartDrawerTemplate {
        cart: CartView::from(&cart.store().snapshot()),
    }
}

/// Redirect to Shopify checkout.
///
/// Goes back to the cart page when there is nothing to check out.
#[instrument(skip(cart))]
pub async fn checkout(cart: VisitorCart) -> Response {
    let snapshot = match cart.store().refresh().await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            warn!(error = %e, "Failed to refresh cart before checkout");
            cart.store().snapshot()
        }
    };
    cart.remember(&snapshot).await;

    match snapshot.checkout_url() {
        Some(url) => Redirect::to(url).into_response(),
        None => Redirect::to("/cart").into_response(),
    }
}
