//! Cart type conversion functions.

use scamp_core::{CartId, CartLineId, VariantId};

use super::super::queries::{CartFields, CartLineFields, CartPayload, CartUserErrorFields};
use super::{convert_image, convert_money, parse_id};
use crate::shopify::ShopifyError;
use crate::shopify::types::{Cart, CartLine, CartMerchandise, CartUserError};

/// Convert a cart selection into the domain cart.
///
/// # Errors
///
/// Returns `ShopifyError::InvalidResponse` if an ID, amount, or quantity is
/// unusable.
pub fn convert_cart(cart: CartFields) -> Result<Cart, ShopifyError> {
    let lines = cart
        .lines
        .into_nodes()
        .map(convert_line)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Cart {
        id: parse_id(CartId::parse(&cart.id))?,
        checkout_url: cart.checkout_url,
        total_quantity: convert_quantity(cart.total_quantity)?,
        subtotal: convert_money(&cart.cost.subtotal_amount)?,
        total: convert_money(&cart.cost.total_amount)?,
        lines,
    })
}

fn convert_line(line: CartLineFields) -> Result<CartLine, ShopifyError> {
    let merchandise = line.merchandise;
    Ok(CartLine {
        id: parse_id(CartLineId::parse(&line.id))?,
        quantity: convert_quantity(line.quantity)?,
        total: convert_money(&line.cost.total_amount)?,
        merchandise: CartMerchandise {
            id: parse_id(VariantId::parse(&merchandise.id))?,
            title: merchandise.title,
            price: convert_money(&merchandise.price)?,
            image: merchandise.image.map(convert_image),
            product_title: merchandise.product.title,
        },
    })
}

fn convert_quantity(quantity: i64) -> Result<u32, ShopifyError> {
    u32::try_from(quantity)
        .map_err(|_| ShopifyError::InvalidResponse(format!("invalid quantity: {quantity}")))
}

fn convert_user_error(e: CartUserErrorFields) -> CartUserError {
    CartUserError {
        code: e.code,
        field: e.field,
        message: e.message,
    }
}

/// Unwrap a cart mutation payload.
///
/// `cart_id` is the cart the mutation addressed, or `None` for `cartCreate`.
/// A user error on the `cartId` field, or a missing cart for an addressed
/// mutation, means the cart no longer exists and maps to
/// `ShopifyError::NotFound`.
///
/// # Errors
///
/// Returns `NotFound`, `UserError`, or `InvalidResponse` as described above.
pub fn cart_from_payload(
    payload: Option<CartPayload>,
    cart_id: Option<&CartId>,
) -> Result<Cart, ShopifyError> {
    let not_found = |id: &CartId| ShopifyError::NotFound(format!("Cart not found: {id}"));

    let Some(payload) = payload else {
        return Err(cart_id.map_or_else(
            || ShopifyError::InvalidResponse("cartCreate returned no payload".to_string()),
            not_found,
        ));
    };

    let user_errors: Vec<CartUserError> =
        payload.user_errors.into_iter().map(convert_user_error).collect();

    if let Some(id) = cart_id
        && user_errors.iter().any(CartUserError::concerns_cart_id)
    {
        return Err(not_found(id));
    }

    if !user_errors.is_empty() {
        return Err(ShopifyError::UserError(
            user_errors
                .into_iter()
                .map(|e| e.message)
                .collect::<Vec<_>>()
                .join("; "),
        ));
    }

    match (payload.cart, cart_id) {
        (Some(cart), _) => convert_cart(cart),
        (None, Some(id)) => Err(not_found(id)),
        (None, None) => Err(ShopifyError::InvalidResponse(
            "cartCreate returned no cart".to_string(),
        )),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn cart_json() -> serde_json::Value {
        json!({
            "id": "gid://shopify/Cart/c1?key=abc",
            "checkoutUrl": "https://shop.example/cart/c/c1",
            "totalQuantity": 2,
            "cost": {
                "subtotalAmount": { "amount": "39.98", "currencyCode": "USD" },
                "totalAmount": { "amount": "39.98", "currencyCode": "USD" }
            },
            "lines": { "edges": [{ "node": {
                "id": "gid://shopify/CartLine/l1",
                "quantity": 2,
                "cost": { "totalAmount": { "amount": "39.98", "currencyCode": "USD" } },
                "merchandise": {
                    "id": "gid://shopify/ProductVariant/11",
                    "title": "Default Title",
                    "image": null,
                    "price": { "amount": "19.99", "currencyCode": "USD" },
                    "product": { "title": "Sample Product 1" }
                }
            }}]}
        })
    }

    fn payload(cart: serde_json::Value, user_errors: serde_json::Value) -> CartPayload {
        serde_json::from_value(json!({ "cart": cart, "userErrors": user_errors })).unwrap()
    }

    #[test]
    fn test_convert_cart() {
        let cart = convert_cart(serde_json::from_value(cart_json()).unwrap()).unwrap();
        assert_eq!(cart.id.as_str(), "gid://shopify/Cart/c1?key=abc");
        assert_eq!(cart.total_quantity, 2);
        assert_eq!(cart.total.display(), "$39.98");
        assert_eq!(cart.lines.len(), 1);

        let line = &cart.lines[0];
        assert_eq!(line.merchandise.id.numeric(), Some(11));
        assert_eq!(line.unit_price().display(), "$19.99");
        assert_eq!(line.display_title(), "Sample Product 1");
        assert_eq!(line.variant_title(), None);
    }

    #[test]
    fn test_bad_amount_is_invalid_response() {
        let mut raw = cart_json();
        raw["cost"]["totalAmount"]["amount"] = json!("lots");
        let err = convert_cart(serde_json::from_value(raw).unwrap()).unwrap_err();
        assert!(matches!(err, ShopifyError::InvalidResponse(_)));
    }

    #[test]
    fn test_cart_id_user_error_is_not_found() {
        let id = CartId::parse("gid://shopify/Cart/gone").unwrap();
        let err = cart_from_payload(
            Some(payload(
                json!(null),
                json!([{ "code": "INVALID", "field": ["cartId"], "message": "The specified cart does not exist." }]),
            )),
            Some(&id),
        )
        .unwrap_err();
        assert!(matches!(err, ShopifyError::NotFound(_)));
    }

    #[test]
    fn test_missing_cart_on_mutation_is_not_found() {
        let id = CartId::parse("gid://shopify/Cart/gone").unwrap();
        let err = cart_from_payload(Some(payload(json!(null), json!([]))), Some(&id)).unwrap_err();
        assert!(matches!(err, ShopifyError::NotFound(_)));
    }

    #[test]
    fn test_other_user_errors_are_joined() {
        let err = cart_from_payload(
            Some(payload(
                json!(null),
                json!([
                    { "code": "INVALID", "field": ["lines", "0", "merchandiseId"], "message": "Bad variant" },
                    { "code": null, "field": null, "message": "Try again" }
                ]),
            )),
            None,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "User error: Bad variant; Try again");
    }

    #[test]
    fn test_create_without_cart_is_invalid_response() {
        let err = cart_from_payload(Some(payload(json!(null), json!([]))), None).unwrap_err();
        assert!(matches!(err, ShopifyError::InvalidResponse(_)));
    }
}
