//! Session cart
//!
//! The cart lives in a [`KeyValueStore`] entry holding the JSON array of line
//! items. Every mutating call runs inside [`KeyValueStore::update`]: it decodes
//! the entry, applies the change through the [`Cart`] aggregate and writes the
//! full list back, so concurrent requests on one session never drop a change.

use std::sync::Arc;
use tracing::debug;

use crate::store::{scoped_key, KeyValueStore};
use crate::{Cart, Money, Product, Result};

pub const CART_KEY: &str = "cart";

#[derive(Clone)]
pub struct CartStore {
    kv: Arc<dyn KeyValueStore>,
    key: String,
}

impl CartStore {
    pub fn for_session(kv: Arc<dyn KeyValueStore>, session: &str) -> Self {
        Self { kv, key: scoped_key(session, CART_KEY) }
    }

    pub async fn load(&self) -> Result<Cart> { decode(self.kv.get(&self.key).await?.as_deref()) }

    async fn mutate<'a>(&self, change: impl FnOnce(&mut Cart) -> bool + Send + 'a) -> Result<Cart> {
        let stored = self
            .kv
            .update(
                &self.key,
                Box::new(move |raw: Option<&str>| -> Result<Option<String>> {
                    let mut cart = decode(raw)?;
                    if !change(&mut cart) {
                        return Ok(None);
                    }
                    Ok(Some(serde_json::to_string(&cart)?))
                }),
            )
            .await?;
        let cart = decode(stored.as_deref())?;
        debug!(key = %self.key, lines = cart.line_count(), "Cart updated");
        Ok(cart)
    }

    pub async fn add_item(&self, product: &Product, qty: u32) -> Result<Cart> {
        self.mutate(|cart| cart.add_item(product, qty)).await
    }

    pub async fn update_quantity(&self, product_id: &str, quantity: u32) -> Result<Cart> {
        self.mutate(|cart| cart.update_quantity(product_id, quantity)).await
    }

    pub async fn remove_item(&self, product_id: &str) -> Result<Cart> {
        self.mutate(|cart| cart.remove_item(product_id)).await
    }

    pub async fn clear(&self) -> Result<Cart> {
        self.mutate(|cart| { cart.clear(); true }).await
    }

    pub async fn total_items(&self) -> Result<u32> { Ok(self.load().await?.total_items()) }

    pub async fn total_price(&self) -> Result<Money> { Ok(self.load().await?.total_price()) }
}

/// A missing entry is an empty cart.
fn decode(raw: Option<&str>) -> Result<Cart> {
    match raw {
        Some(raw) => Ok(serde_json::from_str(raw)?),
        None => Ok(Cart::new()),
    }
}

/// Confirmation shown after adding to the cart.
pub fn added_message(product_name: &str, qty: u32) -> String {
    if qty == 1 {
        format!("1 unidad de {} agregada al carrito", product_name)
    } else {
        format!("{} unidades de {} agregadas al carrito", qty, product_name)
    }
}
