//! Storefront API client tests against a fake Storefront API.

#![allow(clippy::unwrap_used)]

mod common;

use common::{Failure, FakeShop};
use scamp_core::{CartLineId, ProductId, VariantId};
use scamp_storefront::config::TokenKind;
use scamp_storefront::shopify::{
    CartApi, CartLineInput, CartLineUpdateInput, CatalogApi, FailureKind, ShopifyError,
    StorefrontClient,
};

fn variant(raw: &str) -> VariantId {
    VariantId::parse(raw).unwrap()
}

// =============================================================================
// Catalog
// =============================================================================

#[tokio::test]
async fn test_products_are_converted() {
    let shop = FakeShop::start().await;
    let client = StorefrontClient::new(&shop.shopify_config()).unwrap();

    let products = client.get_products(10).await.unwrap();
    assert_eq!(products.len(), 2);

    let shirt = &products[0];
    assert_eq!(shirt.id.as_str(), "gid://shopify/Product/101");
    assert_eq!(shirt.title, "Linen Shirt");
    assert_eq!(shirt.min_price.display(), "$48.00");
    assert_eq!(shirt.variants[0].id, variant("1011"));
    assert!(shirt.variants[0].available_for_sale);
}

#[tokio::test]
async fn test_product_reads_are_cached() {
    let shop = FakeShop::start().await;
    let client = StorefrontClient::new(&shop.shopify_config()).unwrap();

    client.get_products(10).await.unwrap();
    client.get_products(10).await.unwrap();
    assert_eq!(shop.count("GetProducts"), 1);

    let id = ProductId::parse("102").unwrap();
    client.get_product(&id).await.unwrap();
    client.get_product(&id).await.unwrap();
    assert_eq!(shop.count("GetProduct"), 1);
}

#[tokio::test]
async fn test_missing_product_is_not_found() {
    let shop = FakeShop::start().await;
    let client = StorefrontClient::new(&shop.shopify_config()).unwrap();

    let err = client
        .get_product(&ProductId::parse("999").unwrap())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), FailureKind::NotFound);
}

// =============================================================================
// Transport and classification
// =============================================================================

#[tokio::test]
async fn test_token_header_follows_token_kind() {
    let shop = FakeShop::start().await;

    let public = StorefrontClient::new(&shop.shopify_config()).unwrap();
    public.get_products(1).await.unwrap();

    let private = StorefrontClient::new(&scamp_storefront::config::ShopifyStorefrontConfig {
        token_kind: TokenKind::Private,
        ..shop.shopify_config()
    })
    .unwrap();
    private.get_products(1).await.unwrap();

    assert_eq!(
        shop.token_headers(),
        vec![
            "X-Shopify-Storefront-Access-Token".to_string(),
            "Shopify-Storefront-Private-Token".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_rate_limit_reports_retry_after() {
    let shop = FakeShop::start().await;
    shop.fail_always("GetProducts", Failure::RateLimited { retry_after: 7 });
    let client = StorefrontClient::new(&scamp_storefront::config::ShopifyStorefrontConfig {
        max_retries: 0,
        ..shop.shopify_config()
    })
    .unwrap();

    let err = client.get_products(10).await.unwrap_err();
    assert!(matches!(err, ShopifyError::RateLimited(7)));
    assert_eq!(err.kind(), FailureKind::Transient);
}

#[tokio::test]
async fn test_transient_read_failure_is_retried() {
    let shop = FakeShop::start().await;
    shop.fail("GetProducts", Failure::Status(502), 1);
    let client = StorefrontClient::new(&shop.shopify_config()).unwrap();

    let products = client.get_products(10).await.unwrap();
    assert_eq!(products.len(), 2);
    assert_eq!(shop.count("GetProducts"), 2);
}

#[tokio::test]
async fn test_permanent_failure_is_not_retried() {
    let shop = FakeShop::start().await;
    shop.fail_always("GetProducts", Failure::Status(401));
    let client = StorefrontClient::new(&shop.shopify_config()).unwrap();

    let err = client.get_products(10).await.unwrap_err();
    assert_eq!(err.kind(), FailureKind::Permanent);
    assert_eq!(shop.count("GetProducts"), 1);
}

#[tokio::test]
async fn test_throttled_mutation_is_retried() {
    let shop = FakeShop::start().await;
    shop.fail("CreateCart", Failure::Throttled, 1);
    let client = StorefrontClient::new(&shop.shopify_config()).unwrap();

    let cart = client
        .create_cart(vec![CartLineInput::new(variant("1021"), 1)])
        .await
        .unwrap();
    assert_eq!(cart.total_quantity, 1);
    assert_eq!(shop.count("CreateCart"), 2);
}

// =============================================================================
// Carts
// =============================================================================

#[tokio::test]
async fn test_cart_lifecycle() {
    let shop = FakeShop::start().await;
    let client = StorefrontClient::new(&shop.shopify_config()).unwrap();

    let cart = client
        .create_cart(vec![CartLineInput::new(variant("1011"), 2)])
        .await
        .unwrap();
    assert_eq!(cart.total_quantity, 2);
    assert_eq!(cart.subtotal.display(), "$96.00");
    assert!(cart.checkout_url.starts_with("https://scamp-test.myshopify.com/cart/c/"));

    let cart = client
        .add_cart_lines(&cart.id, vec![CartLineInput::new(variant("1021"), 1)])
        .await
        .unwrap();
    assert_eq!(cart.lines.len(), 2);
    assert_eq!(cart.lines[1].display_title(), "Canvas Tote");

    let tote_line: CartLineId = cart.lines[1].id.clone();
    let cart = client
        .update_cart_lines(
            &cart.id,
            vec![CartLineUpdateInput {
                id: tote_line.clone(),
                quantity: 4,
            }],
        )
        .await
        .unwrap();
    assert_eq!(cart.total_quantity, 6);
    assert_eq!(cart.line(&tote_line).unwrap().total.display(), "$90.00");

    let cart = client
        .remove_cart_lines(&cart.id, vec![tote_line])
        .await
        .unwrap();
    assert_eq!(cart.total_quantity, 2);

    let fetched = client.get_cart(&cart.id).await.unwrap();
    assert_eq!(fetched, cart);
}

#[tokio::test]
async fn test_missing_cart_is_not_found() {
    let shop = FakeShop::start().await;
    let client = StorefrontClient::new(&shop.shopify_config()).unwrap();

    let cart = client.create_cart(vec![]).await.unwrap();
    shop.expire_carts();

    let err = client.get_cart(&cart.id).await.unwrap_err();
    assert_eq!(err.kind(), FailureKind::NotFound);

    let err = client
        .add_cart_lines(&cart.id, vec![CartLineInput::new(variant("1021"), 1)])
        .await
        .unwrap_err();
    assert_eq!(err.kind(), FailureKind::NotFound);
    // Not-found is never retried.
    assert_eq!(shop.count("AddToCart"), 1);
}
