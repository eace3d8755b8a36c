//! In-memory fakes of the Storefront API for unit tests.
#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use scamp_core::{CartId, CartLineId, CurrencyCode, Decimal, Price, ProductId, VariantId};
use tokio::sync::Notify;

use crate::shopify::{
    Cart, CartApi, CartLine, CartLineInput, CartLineUpdateInput, CartMerchandise, CatalogApi,
    Image, Product, ProductVariant, ShopifyError,
};

pub fn usd(amount: &str) -> Price {
    Price::parse(amount, "USD").unwrap()
}

pub fn variant_id(n: u64) -> VariantId {
    VariantId::parse(&n.to_string()).unwrap()
}

pub fn product(n: u64, price: &str) -> Product {
    Product {
        id: ProductId::parse(&n.to_string()).unwrap(),
        handle: format!("product-{n}"),
        title: format!("Product {n}"),
        description: format!("Description of product {n}."),
        min_price: usd(price),
        featured_image: Some(Image {
            url: format!("https://cdn.example/{n}.png"),
            alt_text: None,
        }),
        images: vec![Image {
            url: format!("https://cdn.example/{n}.png"),
            alt_text: None,
        }],
        variants: vec![ProductVariant {
            id: variant_id(n * 10),
            title: "Default Title".to_string(),
            available_for_sale: true,
            price: usd(price),
        }],
    }
}

/// A recorded call against [`FakeCartApi`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Create(Vec<CartLineInput>),
    Get(CartId),
    Add(CartId, Vec<CartLineInput>),
    Update(CartId, Vec<CartLineUpdateInput>),
    Remove(CartId, Vec<CartLineId>),
}

#[derive(Default)]
struct FakeState {
    carts: HashMap<CartId, Cart>,
    calls: Vec<Call>,
    failures: VecDeque<ShopifyError>,
    next_id: u64,
    read_gate: Option<Arc<Notify>>,
    write_gate: Option<Arc<Notify>>,
}

/// A Storefront cart backend that keeps carts in memory.
#[derive(Clone, Default)]
pub struct FakeCartApi {
    state: Arc<Mutex<FakeState>>,
}

impl FakeCartApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn create_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Create(_)))
            .count()
    }

    /// Make the next call fail with `err` (after it is recorded).
    pub fn fail_next(&self, err: ShopifyError) {
        self.state.lock().unwrap().failures.push_back(err);
    }

    /// Forget a cart, as Shopify does once a cart expires.
    pub fn expire(&self, id: &CartId) {
        self.state.lock().unwrap().carts.remove(id);
    }

    pub fn cart(&self, id: &CartId) -> Option<Cart> {
        self.state.lock().unwrap().carts.get(id).cloned()
    }

    /// Hold `get_cart` responses until the returned gate is notified. The
    /// cart is read before waiting, so the response describes the cart as it
    /// was when the request arrived.
    pub fn hold_reads(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.state.lock().unwrap().read_gate = Some(Arc::clone(&gate));
        gate
    }

    /// Hold the next line mutation response (add, update or remove) until the
    /// returned gate is notified. The change is made to the cart before waiting.
    pub fn hold_writes(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.state.lock().unwrap().write_gate = Some(Arc::clone(&gate));
        gate
    }

    async fn released(&self, result: Result<Cart, ShopifyError>) -> Result<Cart, ShopifyError> {
        let gate = self.state.lock().unwrap().write_gate.take();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        result
    }

    fn record(&self, call: Call) -> Result<(), ShopifyError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        state.failures.pop_front().map_or(Ok(()), Err)
    }

    fn with_cart(
        &self,
        id: &CartId,
        f: impl FnOnce(&mut Cart, &mut u64),
    ) -> Result<Cart, ShopifyError> {
        let mut state = self.state.lock().unwrap();
        let FakeState { carts, next_id, .. } = &mut *state;
        let cart = carts
            .get_mut(id)
            .ok_or_else(|| ShopifyError::NotFound(format!("Cart not found: {id}")))?;
        f(cart, next_id);
        recompute(cart);
        Ok(cart.clone())
    }
}

fn line_for(input: &CartLineInput, next_id: &mut u64) -> CartLine {
    *next_id += 1;
    let n = input.merchandise_id.numeric().unwrap_or_default();
    CartLine {
        id: CartLineId::parse(&format!("gid://shopify/CartLine/line-{next_id}")).unwrap(),
        quantity: input.quantity,
        merchandise: CartMerchandise {
            id: input.merchandise_id.clone(),
            title: "Default Title".to_string(),
            price: usd("10.00"),
            image: None,
            product_title: format!("Product {}", n / 10),
        },
        total: usd("0"),
    }
}

fn merge_lines(cart: &mut Cart, lines: &[CartLineInput], next_id: &mut u64) {
    for input in lines {
        if let Some(line) = cart
            .lines
            .iter_mut()
            .find(|l| l.merchandise.id == input.merchandise_id)
        {
            line.quantity += input.quantity;
        } else {
            cart.lines.push(line_for(input, next_id));
        }
    }
}

fn recompute(cart: &mut Cart) {
    let mut subtotal = Price::zero(CurrencyCode::USD);
    for line in &mut cart.lines {
        line.total = Price::new(
            line.merchandise.price.amount * Decimal::from(line.quantity),
            CurrencyCode::USD,
        );
        subtotal.amount += line.total.amount;
    }
    cart.total_quantity = cart.lines.iter().map(|l| l.quantity).sum();
    cart.subtotal = subtotal;
    cart.total = subtotal;
}

impl CartApi for FakeCartApi {
    async fn create_cart(&self, lines: Vec<CartLineInput>) -> Result<Cart, ShopifyError> {
        self.record(Call::Create(lines.clone()))?;
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = CartId::parse(&format!("gid://shopify/Cart/fake-{}", state.next_id)).unwrap();
        let mut cart = Cart {
            id: id.clone(),
            checkout_url: format!("https://shop.example/cart/c/fake-{}", state.next_id),
            total_quantity: 0,
            subtotal: Price::zero(CurrencyCode::USD),
            total: Price::zero(CurrencyCode::USD),
            lines: vec![],
        };
        merge_lines(&mut cart, &lines, &mut state.next_id);
        recompute(&mut cart);
        state.carts.insert(id, cart.clone());
        Ok(cart)
    }

    async fn get_cart(&self, cart_id: &CartId) -> Result<Cart, ShopifyError> {
        self.record(Call::Get(cart_id.clone()))?;
        let (cart, gate) = {
            let state = self.state.lock().unwrap();
            (state.carts.get(cart_id).cloned(), state.read_gate.clone())
        };
        if let Some(gate) = gate {
            gate.notified().await;
        }
        cart.ok_or_else(|| ShopifyError::NotFound(format!("Cart not found: {cart_id}")))
    }

    async fn add_cart_lines(
        &self,
        cart_id: &CartId,
        lines: Vec<CartLineInput>,
    ) -> Result<Cart, ShopifyError> {
        self.record(Call::Add(cart_id.clone(), lines.clone()))?;
        let result = self.with_cart(cart_id, |cart, next_id| merge_lines(cart, &lines, next_id));
        self.released(result).await
    }

    async fn update_cart_lines(
        &self,
        cart_id: &CartId,
        lines: Vec<CartLineUpdateInput>,
    ) -> Result<Cart, ShopifyError> {
        self.record(Call::Update(cart_id.clone(), lines.clone()))?;
        let result = self.with_cart(cart_id, |cart, _| {
            for update in &lines {
                if let Some(line) = cart.lines.iter_mut().find(|l| l.id == update.id) {
                    line.quantity = update.quantity;
                }
            }
            cart.lines.retain(|l| l.quantity > 0);
        });
        self.released(result).await
    }

    async fn remove_cart_lines(
        &self,
        cart_id: &CartId,
        line_ids: Vec<CartLineId>,
    ) -> Result<Cart, ShopifyError> {
        self.record(Call::Remove(cart_id.clone(), line_ids.clone()))?;
        let result = self.with_cart(cart_id, |cart, _| {
            cart.lines.retain(|l| !line_ids.contains(&l.id));
        });
        self.released(result).await
    }
}

/// A catalog backend returning fixed products, or a fixed failure.
pub struct FakeCatalogApi {
    products: Vec<Product>,
    failure: Option<fn() -> ShopifyError>,
}

impl FakeCatalogApi {
    pub const fn with_products(products: Vec<Product>) -> Self {
        Self {
            products,
            failure: None,
        }
    }

    pub const fn failing(failure: fn() -> ShopifyError) -> Self {
        Self {
            products: vec![],
            failure: Some(failure),
        }
    }
}

impl CatalogApi for FakeCatalogApi {
    async fn get_products(&self, first: u32) -> Result<Vec<Product>, ShopifyError> {
        if let Some(failure) = self.failure {
            return Err(failure());
        }
        Ok(self
            .products
            .iter()
            .take(first as usize)
            .cloned()
            .collect())
    }

    async fn get_product(&self, id: &ProductId) -> Result<Product, ShopifyError> {
        if let Some(failure) = self.failure {
            return Err(failure());
        }
        self.products
            .iter()
            .find(|p| &p.id == id)
            .cloned()
            .ok_or_else(|| ShopifyError::NotFound(format!("Product not found: {id}")))
    }
}
