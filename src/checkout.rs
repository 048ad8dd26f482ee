//! WhatsApp checkout
//!
//! Turns the cart into a plain-text order and a `https://{host}/{recipient}?text=...`
//! deep link. Nothing is sent from here; the caller opens the link.

use serde::Serialize;

use crate::{Cart, CartItem, Money, Result, StorefrontError};

const GREETING: &str = "Hola! Quiero realizar el siguiente pedido:";

#[derive(Clone, Debug, Serialize)]
pub struct CheckoutLink {
    pub message: String,
    pub url: String,
}

#[derive(Clone, Debug)]
pub struct WhatsAppCheckout {
    host: String,
    recipient: String,
}

impl WhatsAppCheckout {
    pub fn new(host: impl Into<String>, recipient: impl Into<String>) -> Self {
        Self { host: host.into(), recipient: recipient.into() }
    }

    pub fn link(&self, message: &str) -> String {
        format!("https://{}/{}?text={}", self.host, self.recipient, urlencoding::encode(message))
    }

    pub fn checkout(&self, cart: &Cart) -> Result<CheckoutLink> {
        let message = compose_message(cart.items())?;
        let url = self.link(&message);
        tracing::info!(lines = cart.line_count(), "Checkout link composed");
        Ok(CheckoutLink { message, url })
    }
}

/// Builds the order text. An empty cart is rejected.
pub fn compose_message(items: &[CartItem]) -> Result<String> {
    if items.is_empty() {
        return Err(StorefrontError::EmptyCart);
    }
    let mut message = format!("{}\n\n", GREETING);
    for item in items {
        message.push_str(&format!("• {}x {} - ${}\n", item.quantity, item.name, item.line_total()));
    }
    let total: Money = items.iter().map(CartItem::line_total).sum();
    message.push_str(&format!("\nTotal: ${}", total));
    Ok(message)
}
