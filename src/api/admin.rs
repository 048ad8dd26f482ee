use axum::{
    extract::{Multipart, Path, Query, Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{AppState, SESSION_HEADER};
use crate::admin::{
    dashboard, product_counts, AdminEntity, AdminSession, DashboardSummary, FormFields, FormMode, ImageUpload,
};
use crate::store::{list_as, Collection};
use crate::{Category, Product, Result, Sale, StorefrontError};

const IMAGE_FIELD: &str = "imagen";

// =============================================================================
// Session
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub session: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LogoutRequest {
    pub session: String,
}

pub async fn login(State(s): State<AppState>, Json(r): Json<LoginRequest>) -> Result<Json<AdminSession>> {
    Ok(Json(s.admin.login(&r.session, &r.email, &r.password).await?))
}

pub async fn logout(State(s): State<AppState>, Json(r): Json<LogoutRequest>) -> Result<StatusCode> {
    s.admin.logout(&r.session).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn require_admin(State(s): State<AppState>, request: Request, next: Next) -> Result<Response> {
    let session = request
        .headers()
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    if session.is_empty() || !s.admin.is_admin(&session).await? {
        return Err(StorefrontError::Unauthorized("Acceso restringido a administradores".to_string()));
    }
    Ok(next.run(request).await)
}

// =============================================================================
// Editable collections
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub search: Option<String>,
}

impl SearchParams {
    fn term(&self) -> &str { self.search.as_deref().map(str::trim).unwrap_or_default() }
}

pub async fn list_entities<E: AdminEntity>(State(s): State<AppState>, Query(q): Query<SearchParams>) -> Result<Json<Vec<E>>> {
    let mut items = s.entities::<E>().list().await?;
    if !q.term().is_empty() {
        items.retain(|e| e.matches_search(q.term()));
    }
    Ok(Json(items))
}

#[derive(Debug, Serialize)]
pub struct CategoryRow {
    #[serde(flatten)]
    pub category: Category,
    pub product_count: usize,
}

pub async fn list_categories(State(s): State<AppState>, Query(q): Query<SearchParams>) -> Result<Json<Vec<CategoryRow>>> {
    let categories = s.entities::<Category>().list().await?;
    let products: Vec<Product> = list_as(s.documents.as_ref(), Collection::Products).await?;
    let counts = product_counts(&categories, &products);
    Ok(Json(
        categories
            .into_iter()
            .filter(|c| q.term().is_empty() || c.matches_search(q.term()))
            .map(|c| CategoryRow { product_count: counts.get(&c.id).copied().unwrap_or(0), category: c })
            .collect(),
    ))
}

pub async fn create_entity<E: AdminEntity>(State(s): State<AppState>, multipart: Multipart) -> Result<(StatusCode, Json<E>)> {
    let (fields, image) = read_submission(multipart).await?;
    let created = s.entities::<E>().create(&E::form_from_fields(&fields, FormMode::Create), image).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Replaces the record's fields. A product submitted without `stock` is saved
/// out of stock, matching an unchecked HTML checkbox.
pub async fn update_entity<E: AdminEntity>(
    State(s): State<AppState>, Path(id): Path<String>, multipart: Multipart,
) -> Result<Json<E>> {
    let (fields, image) = read_submission(multipart).await?;
    Ok(Json(s.entities::<E>().update_by_id(&id, &E::form_from_fields(&fields, FormMode::Update), image).await?))
}

pub async fn delete_entity<E: AdminEntity>(State(s): State<AppState>, Path(id): Path<String>) -> Result<StatusCode> {
    s.entities::<E>().delete_by_id(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Text parts become form fields; a non-empty `imagen` file part becomes the upload.
async fn read_submission(mut multipart: Multipart) -> Result<(FormFields, Option<ImageUpload>)> {
    let mut fields = FormFields::new();
    let mut image = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| StorefrontError::Validation(format!("Failed to read multipart data: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == IMAGE_FIELD && field.file_name().is_some() {
            let content_type = field.content_type().unwrap_or("application/octet-stream").to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| StorefrontError::Validation(format!("Failed to read image data: {}", e)))?;
            if !data.is_empty() {
                image = Some(ImageUpload { data: data.to_vec(), content_type });
            }
            continue;
        }
        let value = field
            .text()
            .await
            .map_err(|e| StorefrontError::Validation(format!("Failed to read field '{}': {}", name, e)))?;
        debug!("Form field {}", name);
        fields.push((name, value));
    }
    Ok((fields, image))
}

// =============================================================================
// Sales and dashboard
// =============================================================================

pub async fn list_sales(State(s): State<AppState>, Query(q): Query<SearchParams>) -> Result<Json<Vec<Sale>>> {
    Ok(Json(s.sales().search(q.term()).await?))
}

pub async fn get_sale(State(s): State<AppState>, Path(id): Path<String>) -> Result<Json<Sale>> {
    Ok(Json(s.sales().detail(&id).await?))
}

pub async fn delete_sale(State(s): State<AppState>, Path(id): Path<String>) -> Result<StatusCode> {
    s.sales().delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn dashboard(State(s): State<AppState>) -> Result<Json<DashboardSummary>> {
    Ok(Json(dashboard::load(s.documents.clone()).await?))
}
