//! Cart Aggregate

use serde::{Deserialize, Serialize};
use crate::domain::aggregates::Product;
use crate::domain::value_objects::{Money, Quantity};

/// Ordered list of line items. Serializes as a bare JSON array, which is
/// the persisted form.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

/// One product in the cart. Name, price and image are snapshots taken when
/// the product was first added.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: String,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "precio")]
    pub price: Money,
    #[serde(rename = "imagen", default)]
    pub image: String,
    pub quantity: Quantity,
}

impl CartItem {
    pub fn line_total(&self) -> Money { self.price.multiply(self.quantity.value()) }
}

impl Cart {
    pub fn new() -> Self { Self::default() }

    pub fn items(&self) -> &[CartItem] { &self.items }
    pub fn is_empty(&self) -> bool { self.items.is_empty() }
    /// Distinct line items, not units.
    pub fn line_count(&self) -> usize { self.items.len() }

    /// Merges into an existing line for the same product, otherwise appends.
    /// A zero quantity is ignored.
    pub fn add_item(&mut self, product: &Product, qty: u32) -> bool {
        let Some(qty) = Quantity::new(qty) else { return false };
        if let Some(existing) = self.items.iter_mut().find(|i| i.id == product.id) {
            existing.quantity = existing.quantity.add(qty);
        } else {
            self.items.push(CartItem {
                id: product.id.clone(),
                name: product.name.clone(),
                price: product.price,
                image: product.image.clone(),
                quantity: qty,
            });
        }
        true
    }

    /// Replaces the quantity of a line. Values below one leave the cart untouched.
    pub fn update_quantity(&mut self, product_id: &str, quantity: u32) -> bool {
        let Some(quantity) = Quantity::new(quantity) else { return false };
        match self.items.iter_mut().find(|i| i.id == product_id) {
            Some(item) => { item.quantity = quantity; true }
            None => false,
        }
    }

    pub fn remove_item(&mut self, product_id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.id != product_id);
        self.items.len() != before
    }

    pub fn clear(&mut self) { self.items.clear(); }

    pub fn total_items(&self) -> u32 { self.items.iter().map(|i| i.quantity.value()).sum() }

    pub fn total_price(&self) -> Money { self.items.iter().map(CartItem::line_total).sum() }
}
