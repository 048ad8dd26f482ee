//! Catalog queries
//!
//! Products and categories are fetched whole and filtered in process. Results
//! keep the order the store returned them in.

use serde::Serialize;
use std::collections::HashSet;
use tracing::info;

use crate::store::{get_as, list_as, Collection, DocumentStore};
use crate::{Category, Product, Result, StorefrontError, Testimonial};

pub const FEATURED_CATEGORIES: usize = 3;
pub const FEATURED_PRODUCTS: usize = 4;
pub const LATEST_TESTIMONIALS: usize = 3;

#[derive(Clone, Debug, Default)]
pub struct CatalogFilter {
    pub categories: HashSet<String>,
    pub search: String,
}

impl CatalogFilter {
    /// Filter pre-selected from a category deep link.
    pub fn for_category(category_id: impl Into<String>) -> Self {
        Self { categories: HashSet::from([category_id.into()]), search: String::new() }
    }

    pub fn toggle_category(&mut self, category_id: &str) {
        if !self.categories.remove(category_id) {
            self.categories.insert(category_id.to_string());
        }
    }

    pub fn matches(&self, product: &Product) -> bool {
        product.matches_categories(&self.categories) && product.matches_search(&self.search)
    }
}

#[derive(Clone, Debug, Default)]
pub struct Catalog {
    products: Vec<Product>,
    categories: Vec<Category>,
}

impl Catalog {
    pub fn new(products: Vec<Product>, categories: Vec<Category>) -> Self { Self { products, categories } }

    pub async fn load(store: &dyn DocumentStore) -> Result<Self> {
        let products: Vec<Product> = list_as(store, Collection::Products).await?;
        let categories: Vec<Category> = list_as(store, Collection::Categories).await?;
        info!(products = products.len(), categories = categories.len(), "Catalog loaded");
        Ok(Self { products, categories })
    }

    pub fn products(&self) -> &[Product] { &self.products }
    pub fn categories(&self) -> &[Category] { &self.categories }

    pub fn filter(&self, filter: &CatalogFilter) -> Vec<&Product> {
        self.products.iter().filter(|p| filter.matches(p)).collect()
    }

    /// Names of the product's categories. Ids with no matching category are skipped.
    pub fn category_names(&self, product: &Product) -> Vec<String> {
        product
            .categories
            .iter()
            .filter_map(|id| self.categories.iter().find(|c| &c.id == id))
            .map(|c| c.name.clone())
            .collect()
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct ProductDetail {
    pub product: Product,
    pub category_names: Vec<String>,
}

/// `NotFound` when the id does not exist; the storefront sends the shopper
/// back to the catalog in that case.
pub async fn product_detail(store: &dyn DocumentStore, id: &str) -> Result<ProductDetail> {
    let product: Product = get_as(store, Collection::Products, id)
        .await?
        .ok_or_else(|| StorefrontError::NotFound(format!("Product {}", id)))?;
    let categories: Vec<Category> = list_as(store, Collection::Categories).await?;
    let catalog = Catalog::new(Vec::new(), categories);
    let category_names = catalog.category_names(&product);
    Ok(ProductDetail { product, category_names })
}

#[derive(Clone, Debug, Serialize)]
pub struct HomeView {
    pub featured_categories: Vec<Category>,
    pub featured_products: Vec<Product>,
    pub testimonials: Vec<Testimonial>,
}

pub async fn home(store: &dyn DocumentStore) -> Result<HomeView> {
    let mut featured_categories: Vec<Category> = list_as(store, Collection::Categories).await?;
    featured_categories.truncate(FEATURED_CATEGORIES);
    let mut featured_products: Vec<Product> = list_as(store, Collection::Products).await?;
    featured_products.truncate(FEATURED_PRODUCTS);
    let mut testimonials: Vec<Testimonial> = list_as(store, Collection::Testimonials).await?;
    testimonials.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    testimonials.truncate(LATEST_TESTIMONIALS);
    Ok(HomeView { featured_categories, featured_products, testimonials })
}
