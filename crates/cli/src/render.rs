//! Plain-text rendering of catalog and cart data.

use std::fmt::Write;

use scamp_storefront::cart::CartSnapshot;
use scamp_storefront::catalog::ProductRecord;

/// One line per product: ID, price, title.
pub fn product_list(products: &[ProductRecord]) -> String {
    let mut out = String::new();
    for product in products {
        let _ = writeln!(
            out,
            "{:<16} {:>10}  {}",
            product.path_id(),
            product.price.display(),
            product.title
        );
    }
    out
}

/// Full product detail including purchasable variants.
pub fn product_detail(product: &ProductRecord) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", product.title, product.price.display());
    let _ = writeln!(out, "id: {}", product.id);
    if let Some(image) = &product.image {
        let _ = writeln!(out, "image: {image}");
    }
    if !product.description.is_empty() {
        let _ = writeln!(out, "\n{}", product.description);
    }
    if !product.variants.is_empty() {
        let _ = writeln!(out, "\nvariants:");
        for variant in &product.variants {
            let availability = if variant.available { "" } else { "  (sold out)" };
            let _ = writeln!(
                out,
                "  {}  {}  {}{availability}",
                variant.id,
                variant.price.display(),
                variant.title
            );
        }
    }
    out
}

/// Cart lines with line IDs (needed for `update` and `remove`) and totals.
pub fn cart(snapshot: &CartSnapshot) -> String {
    if snapshot.is_empty() {
        return "Your cart is empty.\n".to_string();
    }

    let mut out = String::new();
    for line in snapshot.lines() {
        let title = line.variant_title().map_or_else(
            || line.display_title().to_string(),
            |variant| format!("{} - {variant}", line.display_title()),
        );
        let _ = writeln!(
            out,
            "{:>3} x {title}  {}  [{}]",
            line.quantity,
            line.total.display(),
            line.id
        );
    }
    let _ = writeln!(out, "\nitems:    {}", snapshot.total_quantity());
    let _ = writeln!(out, "subtotal: {}", snapshot.subtotal().display());
    let _ = writeln!(out, "total:    {}", snapshot.total().display());
    out
}
