use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::Deserialize;
use std::collections::HashSet;

use super::AppState;
use crate::catalog::{self, Catalog, CatalogFilter, HomeView};
use crate::store::{list_as, Collection};
use crate::{Category, Product, Result, StorefrontError, Testimonial};

#[derive(Debug, Default, Deserialize)]
pub struct ProductParams {
    /// Comma-separated category ids.
    pub categorias: Option<String>,
    /// Single category deep link.
    pub categoria: Option<String>,
    pub search: Option<String>,
}

impl ProductParams {
    fn filter(&self) -> CatalogFilter {
        let mut categories: HashSet<String> = self
            .categorias
            .iter()
            .flat_map(|raw| raw.split(','))
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(String::from)
            .collect();
        categories.extend(self.categoria.iter().filter(|id| !id.is_empty()).cloned());
        CatalogFilter { categories, search: self.search.clone().unwrap_or_default() }
    }
}

pub async fn home(State(s): State<AppState>) -> Result<Json<HomeView>> {
    Ok(Json(catalog::home(s.documents.as_ref()).await?))
}

pub async fn list_products(State(s): State<AppState>, Query(p): Query<ProductParams>) -> Result<Json<Vec<Product>>> {
    let catalog = Catalog::load(s.documents.as_ref()).await?;
    Ok(Json(catalog.filter(&p.filter()).into_iter().cloned().collect()))
}

/// Unknown ids send the shopper back to the listing.
pub async fn get_product(State(s): State<AppState>, Path(id): Path<String>) -> Result<Response> {
    match catalog::product_detail(s.documents.as_ref(), &id).await {
        Ok(detail) => Ok(Json(detail).into_response()),
        Err(StorefrontError::NotFound(_)) => Ok(Redirect::to("/api/v1/products").into_response()),
        Err(e) => Err(e),
    }
}

pub async fn list_categories(State(s): State<AppState>) -> Result<Json<Vec<Category>>> {
    Ok(Json(list_as(s.documents.as_ref(), Collection::Categories).await?))
}

pub async fn list_testimonials(State(s): State<AppState>) -> Result<Json<Vec<Testimonial>>> {
    let mut testimonials: Vec<Testimonial> = list_as(s.documents.as_ref(), Collection::Testimonials).await?;
    testimonials.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(Json(testimonials))
}

/// Objects of the in-memory blob store, at the URLs it hands out.
pub async fn serve_blob(State(s): State<AppState>, Path(key): Path<String>) -> Result<Response> {
    let object = match &s.local_blobs {
        Some(blobs) => blobs.get(&key).await,
        None => None,
    };
    let (data, content_type) = object.ok_or_else(|| StorefrontError::NotFound(format!("Blob {}", key)))?;
    Ok(([(header::CONTENT_TYPE, content_type)], data).into_response())
}
