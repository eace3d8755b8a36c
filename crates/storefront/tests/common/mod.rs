//! Fake Shopify Storefront API for integration tests.
//!
//! Serves the storefront's GraphQL operations from memory on an ephemeral
//! port, records every operation by name and can be told to fail.

#![allow(dead_code, clippy::unwrap_used, clippy::missing_panics_doc)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
};
use scamp_storefront::config::{
    CartConfig, CatalogConfig, ShopifyStorefrontConfig, StorefrontConfig, TokenKind,
};
use secrecy::SecretString;
use serde_json::{Value, json};

pub const STORE: &str = "scamp-test.myshopify.com";

/// A failure the fake answers with instead of running an operation.
#[derive(Debug, Clone)]
pub enum Failure {
    Status(u16),
    RateLimited { retry_after: u64 },
    Throttled,
}

#[derive(Debug, Clone)]
struct FakeLine {
    id: String,
    variant_id: String,
    quantity: i64,
}

#[derive(Default)]
struct ShopState {
    carts: HashMap<String, Vec<FakeLine>>,
    operations: Vec<String>,
    token_headers: Vec<String>,
    failures: HashMap<String, (Failure, usize)>,
    next_id: u64,
}

type Shared = Arc<Mutex<ShopState>>;

/// A running fake Storefront API.
pub struct FakeShop {
    addr: SocketAddr,
    state: Shared,
}

impl FakeShop {
    pub async fn start() -> Self {
        let state = Shared::default();
        let app = Router::new()
            .route("/graphql", post(graphql))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    pub fn endpoint(&self) -> String {
        format!("http://{}/graphql", self.addr)
    }

    /// Shopify settings pointing at this fake.
    pub fn shopify_config(&self) -> ShopifyStorefrontConfig {
        ShopifyStorefrontConfig {
            store: STORE.to_string(),
            api_version: "2025-01".to_string(),
            access_token: SecretString::from("e01d5c460eac1f4f6257b8b621710c83"),
            token_kind: TokenKind::Public,
            endpoint_override: Some(self.endpoint()),
            request_timeout: Duration::from_secs(5),
            max_retries: 1,
            retry_backoff: Duration::from_millis(10),
            product_page_size: 10,
        }
    }

    /// Full storefront settings pointing at this fake.
    pub fn config(&self) -> StorefrontConfig {
        StorefrontConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 0,
            base_url: "http://localhost:3000".to_string(),
            shopify: self.shopify_config(),
            catalog: CatalogConfig::default(),
            cart: CartConfig::default(),
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    /// Operation names received, in order.
    pub fn operations(&self) -> Vec<String> {
        self.state.lock().unwrap().operations.clone()
    }

    pub fn count(&self, operation: &str) -> usize {
        self.operations().iter().filter(|o| *o == operation).count()
    }

    /// Names of the token headers seen, one per request.
    pub fn token_headers(&self) -> Vec<String> {
        self.state.lock().unwrap().token_headers.clone()
    }

    /// Fail the next `times` calls of `operation`.
    pub fn fail(&self, operation: &str, failure: Failure, times: usize) {
        self.state
            .lock()
            .unwrap()
            .failures
            .insert(operation.to_string(), (failure, times));
    }

    /// Fail every call of `operation`.
    pub fn fail_always(&self, operation: &str, failure: Failure) {
        self.fail(operation, failure, usize::MAX);
    }

    /// Forget every cart, as Shopify does once carts expire.
    pub fn expire_carts(&self) {
        self.state.lock().unwrap().carts.clear();
    }

    pub fn cart_ids(&self) -> Vec<String> {
        self.state.lock().unwrap().carts.keys().cloned().collect()
    }
}

// =============================================================================
// Catalog
// =============================================================================

struct FakeProduct {
    id: u64,
    title: &'static str,
    price: &'static str,
}

const PRODUCTS: &[FakeProduct] = &[
    FakeProduct {
        id: 101,
        title: "Linen Shirt",
        price: "48.00",
    },
    FakeProduct {
        id: 102,
        title: "Canvas Tote",
        price: "22.50",
    },
];

fn product_json(p: &FakeProduct) -> Value {
    let money = json!({"amount": p.price, "currencyCode": "USD"});
    let image = json!({"url": format!("https://cdn.example/{}.png", p.id), "altText": p.title});
    json!({
        "id": format!("gid://shopify/Product/{}", p.id),
        "handle": p.title.to_lowercase().replace(' ', "-"),
        "title": p.title,
        "description": format!("{} description.", p.title),
        "priceRange": {"minVariantPrice": money},
        "featuredImage": image,
        "images": {"edges": [{"node": image}]},
        "variants": {"edges": [{"node": {
            "id": format!("gid://shopify/ProductVariant/{}1", p.id),
            "title": "Default Title",
            "availableForSale": true,
            "price": money,
        }}]},
    })
}

fn variant_product(variant_id: &str) -> Option<&'static FakeProduct> {
    PRODUCTS
        .iter()
        .find(|p| variant_id == format!("gid://shopify/ProductVariant/{}1", p.id))
}

// =============================================================================
// Carts
// =============================================================================

fn cents(amount: &str) -> i64 {
    let (whole, frac) = amount.split_once('.').unwrap_or((amount, "0"));
    whole.parse::<i64>().unwrap() * 100 + format!("{frac:0<2}").parse::<i64>().unwrap()
}

fn money(cents: i64) -> Value {
    json!({"amount": format!("{}.{:02}", cents / 100, cents % 100), "currencyCode": "USD"})
}

fn cart_json(id: &str, lines: &[FakeLine]) -> Value {
    let mut subtotal = 0;
    let mut quantity = 0;
    let edges: Vec<Value> = lines
        .iter()
        .map(|line| {
            let product = variant_product(&line.variant_id);
            let unit = product.map_or(1000, |p| cents(p.price));
            subtotal += unit * line.quantity;
            quantity += line.quantity;
            json!({"node": {
                "id": line.id,
                "quantity": line.quantity,
                "cost": {"totalAmount": money(unit * line.quantity)},
                "merchandise": {
                    "id": line.variant_id,
                    "title": "Default Title",
                    "image": null,
                    "price": money(unit),
                    "product": {"title": product.map_or("Unknown", |p| p.title)},
                },
            }})
        })
        .collect();

    let token = id.rsplit('/').next().unwrap_or_default();
    json!({
        "id": id,
        "checkoutUrl": format!("https://{STORE}/cart/c/{token}"),
        "totalQuantity": quantity,
        "cost": {"subtotalAmount": money(subtotal), "totalAmount": money(subtotal)},
        "lines": {"edges": edges},
    })
}

fn missing_cart(field: &str) -> Value {
    json!({field: {
        "cart": null,
        "userErrors": [{
            "code": "INVALID",
            "field": ["cartId"],
            "message": "The specified cart does not exist.",
        }],
    }})
}

fn add_lines(state: &mut ShopState, cart_id: &str, lines: &Value) {
    let inputs = lines.as_array().cloned().unwrap_or_default();
    for input in inputs {
        let variant_id = input["merchandiseId"].as_str().unwrap().to_string();
        let quantity = input["quantity"].as_i64().unwrap();
        state.next_id += 1;
        let line_id = format!("gid://shopify/CartLine/line-{}", state.next_id);
        let cart = state.carts.get_mut(cart_id).unwrap();
        if let Some(line) = cart.iter_mut().find(|l| l.variant_id == variant_id) {
            line.quantity += quantity;
        } else {
            cart.push(FakeLine {
                id: line_id,
                variant_id,
                quantity,
            });
        }
    }
}

// =============================================================================
// Handler
// =============================================================================

async fn graphql(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let operation = body["operationName"].as_str().unwrap_or_default().to_string();
    let vars = &body["variables"];
    let mut state = state.lock().unwrap();
    state.operations.push(operation.clone());

    let token_header = ["X-Shopify-Storefront-Access-Token", "Shopify-Storefront-Private-Token"]
        .into_iter()
        .find(|h| headers.contains_key(*h));
    let Some(token_header) = token_header else {
        return (StatusCode::UNAUTHORIZED, "missing token").into_response();
    };
    state.token_headers.push(token_header.to_string());

    if let Some((failure, times)) = state.failures.get_mut(&operation)
        && *times > 0
    {
        *times -= 1;
        return match failure.clone() {
            Failure::Status(status) => {
                (StatusCode::from_u16(status).unwrap(), "upstream failure").into_response()
            }
            Failure::RateLimited { retry_after } => (
                StatusCode::TOO_MANY_REQUESTS,
                [("Retry-After", retry_after.to_string())],
                "slow down",
            )
                .into_response(),
            Failure::Throttled => Json(json!({
                "errors": [{"message": "Throttled", "extensions": {"code": "THROTTLED"}}],
            }))
            .into_response(),
        };
    }

    let data = match operation.as_str() {
        "GetProducts" => {
            let first = usize::try_from(vars["first"].as_i64().unwrap()).unwrap();
            let edges: Vec<Value> = PRODUCTS
                .iter()
                .take(first)
                .map(|p| json!({"node": product_json(p)}))
                .collect();
            json!({"products": {"edges": edges}})
        }
        "GetProduct" => {
            let id = vars["id"].as_str().unwrap();
            let product = PRODUCTS
                .iter()
                .find(|p| id == format!("gid://shopify/Product/{}", p.id))
                .map(product_json);
            json!({"product": product})
        }
        "CreateCart" => {
            state.next_id += 1;
            let id = format!("gid://shopify/Cart/c{}", state.next_id);
            state.carts.insert(id.clone(), Vec::new());
            add_lines(&mut state, &id, &vars["input"]["lines"]);
            json!({"cartCreate": {"cart": cart_json(&id, &state.carts[&id]), "userErrors": []}})
        }
        "GetCart" => {
            let id = vars["cartId"].as_str().unwrap();
            json!({"cart": state.carts.get(id).map(|lines| cart_json(id, lines))})
        }
        "AddToCart" => {
            let id = vars["cartId"].as_str().unwrap().to_string();
            if state.carts.contains_key(&id) {
                add_lines(&mut state, &id, &vars["lines"]);
                json!({"cartLinesAdd": {"cart": cart_json(&id, &state.carts[&id]), "userErrors": []}})
            } else {
                missing_cart("cartLinesAdd")
            }
        }
        "UpdateCartLines" => {
            let id = vars["cartId"].as_str().unwrap();
            match state.carts.get_mut(id) {
                Some(lines) => {
                    for update in vars["lines"].as_array().unwrap() {
                        let line_id = update["id"].as_str().unwrap();
                        let quantity = update["quantity"].as_i64().unwrap();
                        if let Some(line) = lines.iter_mut().find(|l| l.id == line_id) {
                            line.quantity = quantity;
                        }
                    }
                    lines.retain(|l| l.quantity > 0);
                    json!({"cartLinesUpdate": {"cart": cart_json(id, lines), "userErrors": []}})
                }
                None => missing_cart("cartLinesUpdate"),
            }
        }
        "RemoveFromCart" => {
            let id = vars["cartId"].as_str().unwrap();
            match state.carts.get_mut(id) {
                Some(lines) => {
                    let removed: Vec<&str> = vars["lineIds"]
                        .as_array()
                        .unwrap()
                        .iter()
                        .filter_map(Value::as_str)
                        .collect();
                    lines.retain(|l| !removed.contains(&l.id.as_str()));
                    json!({"cartLinesRemove": {"cart": cart_json(id, lines), "userErrors": []}})
                }
                None => missing_cart("cartLinesRemove"),
            }
        }
        other => {
            return Json(json!({
                "errors": [{"message": format!("Unknown operation {other}")}],
            }))
            .into_response();
        }
    };

    Json(json!({"data": data})).into_response()
}
