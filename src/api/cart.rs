use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::cart::added_message;
use crate::checkout::CheckoutLink;
use crate::store::{get_as, Collection};
use crate::{Cart, CartItem, Money, Product, Result, StorefrontError};

#[derive(Debug, Serialize)]
pub struct CartView {
    pub items: Vec<CartItem>,
    pub line_count: usize,
    pub total_items: u32,
    pub total_price: Money,
}

impl From<Cart> for CartView {
    fn from(cart: Cart) -> Self {
        Self {
            line_count: cart.line_count(),
            total_items: cart.total_items(),
            total_price: cart.total_price(),
            items: cart.items().to_vec(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AddedToCart {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub cart: CartView,
}

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product_id: String,
    #[serde(default = "one")]
    pub quantity: u32,
}

fn one() -> u32 { 1 }

#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub quantity: u32,
}

pub async fn get_cart(State(s): State<AppState>, Path(session): Path<String>) -> Result<Json<CartView>> {
    Ok(Json(s.cart(&session).load().await?.into()))
}

pub async fn add_item(
    State(s): State<AppState>, Path(session): Path<String>, Json(r): Json<AddItemRequest>,
) -> Result<(StatusCode, Json<AddedToCart>)> {
    let product: Product = get_as(s.documents.as_ref(), Collection::Products, &r.product_id)
        .await?
        .ok_or_else(|| StorefrontError::NotFound(format!("Product {}", r.product_id)))?;
    let cart = s.cart(&session).add_item(&product, r.quantity).await?;
    let message = (r.quantity > 0).then(|| added_message(&product.name, r.quantity));
    Ok((StatusCode::CREATED, Json(AddedToCart { message, cart: cart.into() })))
}

pub async fn update_item(
    State(s): State<AppState>, Path((session, id)): Path<(String, String)>, Json(r): Json<UpdateItemRequest>,
) -> Result<Json<CartView>> {
    Ok(Json(s.cart(&session).update_quantity(&id, r.quantity).await?.into()))
}

pub async fn remove_item(State(s): State<AppState>, Path((session, id)): Path<(String, String)>) -> Result<Json<CartView>> {
    Ok(Json(s.cart(&session).remove_item(&id).await?.into()))
}

pub async fn clear_cart(State(s): State<AppState>, Path(session): Path<String>) -> Result<StatusCode> {
    s.cart(&session).clear().await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn checkout(State(s): State<AppState>, Path(session): Path<String>) -> Result<Json<CheckoutLink>> {
    let cart = s.cart(&session).load().await?;
    Ok(Json(s.checkout.checkout(&cart)?))
}
