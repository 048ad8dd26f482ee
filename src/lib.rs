//! Estilo Storefront
//!
//! Storefront and back-office for a small clothing shop.
//!
//! ## Features
//! - Catalog browsing with multi-category and text filtering
//! - Session cart with WhatsApp checkout links
//! - Admin CRUD for products, categories and testimonials with image uploads
//! - Sales viewer and dashboard
//! - Pluggable document, blob and key-value stores (memory, Postgres, S3)

pub mod admin;
pub mod api;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod domain;
pub mod store;

use thiserror::Error;

pub use domain::aggregates::{Cart, CartItem, Category, Product, Sale, SaleLine, Testimonial};
pub use domain::value_objects::{Money, Quantity};

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum StorefrontError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("El carrito está vacío")]
    EmptyCart,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Blob storage error: {0}")]
    Blob(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StorefrontError>;
