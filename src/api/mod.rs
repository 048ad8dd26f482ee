//! HTTP surface
//!
//! Storefront routes are open; everything under `/api/v1/admin` except login
//! and logout requires an `x-session-id` header whose session holds an admin
//! marker. Admin create and update routes accept multipart bodies up to
//! [`AppState::upload_limit`] bytes. Without S3, uploaded images are served
//! from `/blobs/{key}`.

mod admin;
mod cart;
mod storefront;

use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::admin::{AdminEntity, AdminSessions, EntityService, SalesViewer};
use crate::cart::CartStore;
use crate::checkout::WhatsAppCheckout;
use crate::store::{BlobStore, DocumentStore, KeyValueStore, MemoryBlobStore};
use crate::{Category, Product, StorefrontError, Testimonial};

pub const SESSION_HEADER: &str = "x-session-id";

#[derive(Clone)]
pub struct AppState {
    pub documents: Arc<dyn DocumentStore>,
    pub blobs: Arc<dyn BlobStore>,
    /// Same store as `blobs` when images are kept in memory.
    pub local_blobs: Option<Arc<MemoryBlobStore>>,
    pub sessions: Arc<dyn KeyValueStore>,
    pub checkout: WhatsAppCheckout,
    pub admin: AdminSessions,
    pub upload_limit: usize,
}

impl AppState {
    pub fn cart(&self, session: &str) -> CartStore { CartStore::for_session(self.sessions.clone(), session) }
    pub fn entities<E: AdminEntity>(&self) -> EntityService<E> { EntityService::new(self.documents.clone(), self.blobs.clone()) }
    pub fn sales(&self) -> SalesViewer { SalesViewer::new(self.documents.clone()) }
}

pub fn router(state: AppState) -> Router {
    let upload = DefaultBodyLimit::max(state.upload_limit);
    let admin_routes = Router::new()
        .route("/products", get(admin::list_entities::<Product>).post(admin::create_entity::<Product>).layer(upload))
        .route("/products/:id", put(admin::update_entity::<Product>).delete(admin::delete_entity::<Product>).layer(upload))
        .route("/categories", get(admin::list_categories).post(admin::create_entity::<Category>).layer(upload))
        .route("/categories/:id", put(admin::update_entity::<Category>).delete(admin::delete_entity::<Category>).layer(upload))
        .route(
            "/testimonials",
            get(admin::list_entities::<Testimonial>).post(admin::create_entity::<Testimonial>).layer(upload),
        )
        .route(
            "/testimonials/:id",
            put(admin::update_entity::<Testimonial>).delete(admin::delete_entity::<Testimonial>).layer(upload),
        )
        .route("/sales", get(admin::list_sales))
        .route("/sales/:id", get(admin::get_sale).delete(admin::delete_sale))
        .route("/dashboard", get(admin::dashboard))
        .route_layer(middleware::from_fn_with_state(state.clone(), admin::require_admin))
        .route("/login", post(admin::login))
        .route("/logout", post(admin::logout));

    Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "estilo-storefront"})) }))
        .route("/api/v1/home", get(storefront::home))
        .route("/api/v1/products", get(storefront::list_products))
        .route("/api/v1/products/:id", get(storefront::get_product))
        .route("/api/v1/categories", get(storefront::list_categories))
        .route("/api/v1/testimonials", get(storefront::list_testimonials))
        .route("/api/v1/cart/:session", get(cart::get_cart).delete(cart::clear_cart))
        .route("/api/v1/cart/:session/items", post(cart::add_item))
        .route("/api/v1/cart/:session/items/:id", put(cart::update_item).delete(cart::remove_item))
        .route("/api/v1/cart/:session/checkout", post(cart::checkout))
        .route("/blobs/*key", get(storefront::serve_blob))
        .nest("/api/v1/admin", admin_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// =============================================================================
// Error responses
// =============================================================================

#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    message: String,
}

impl IntoResponse for StorefrontError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            StorefrontError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            StorefrontError::EmptyCart => (StatusCode::BAD_REQUEST, self.to_string()),
            StorefrontError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            StorefrontError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            StorefrontError::Blob(msg) => {
                tracing::error!("Blob storage error: {}", msg);
                (StatusCode::BAD_GATEWAY, "Error al subir la imagen".to_string())
            }
            StorefrontError::Store(_)
            | StorefrontError::Config(_)
            | StorefrontError::Database(_)
            | StorefrontError::Serialization(_) => {
                tracing::error!("{}", self);
                (StatusCode::INTERNAL_SERVER_ERROR, "Error interno del servidor".to_string())
            }
        };
        (status, Json(ErrorBody { success: false, message })).into_response()
    }
}
