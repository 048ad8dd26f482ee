//! Create/update/delete for admin-editable collections
//!
//! Ids for new records are generated here before anything is uploaded, so an
//! image is written once under `{collection}/{id}` and the document is created
//! already pointing at its final URL. Steps are independent calls with no
//! rollback: a failed document write after a successful upload leaves the
//! blob behind.

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use super::entity::{validate_form, AdminEntity};
use crate::store::{blob_key, get_as, list_as, to_fields, BlobStore, DocumentStore};
use crate::{Category, Product, Result, StorefrontError};

/// Image file chosen in an editor form.
#[derive(Clone, Debug)]
pub struct ImageUpload {
    pub data: Vec<u8>,
    pub content_type: String,
}

pub struct EntityService<E> {
    documents: Arc<dyn DocumentStore>,
    blobs: Arc<dyn BlobStore>,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for EntityService<E> {
    fn clone(&self) -> Self {
        Self { documents: self.documents.clone(), blobs: self.blobs.clone(), _entity: PhantomData }
    }
}

impl<E: AdminEntity> EntityService<E> {
    pub fn new(documents: Arc<dyn DocumentStore>, blobs: Arc<dyn BlobStore>) -> Self {
        Self { documents, blobs, _entity: PhantomData }
    }

    pub async fn list(&self) -> Result<Vec<E>> {
        list_as(self.documents.as_ref(), E::COLLECTION).await.map_err(|e| {
            tracing::error!("Failed to list {}: {}", E::COLLECTION, e);
            e
        })
    }

    pub async fn get(&self, id: &str) -> Result<E> {
        get_as(self.documents.as_ref(), E::COLLECTION, id)
            .await?
            .ok_or_else(|| StorefrontError::NotFound(format!("{}/{}", E::COLLECTION, id)))
    }

    pub async fn create(&self, form: &E::Form, image: Option<ImageUpload>) -> Result<E> {
        validate_form::<E>(form)?;
        let id = Uuid::new_v4().simple().to_string();
        let mut record = E::from_form(id.clone(), form, None)?;
        if let Some(image) = image {
            record.set_image(self.upload_image(&id, image).await?);
        }
        self.documents.set(E::COLLECTION, &id, to_fields(&record)?).await?;
        info!("Created {}/{}", E::COLLECTION, id);
        Ok(record)
    }

    pub async fn update(&self, existing: &E, form: &E::Form, image: Option<ImageUpload>) -> Result<E> {
        validate_form::<E>(form)?;
        let id = existing.id().to_string();
        let mut record = E::from_form(id.clone(), form, Some(existing))?;
        match image {
            Some(image) => record.set_image(self.upload_image(&id, image).await?),
            None if E::form_image(form).is_empty() => record.set_image(existing.image().to_string()),
            None => {}
        }
        self.documents.update(E::COLLECTION, &id, to_fields(&record)?).await?;
        info!("Updated {}/{}", E::COLLECTION, id);
        Ok(record)
    }

    pub async fn update_by_id(&self, id: &str, form: &E::Form, image: Option<ImageUpload>) -> Result<E> {
        validate_form::<E>(form)?;
        let existing = self.get(id).await?;
        self.update(&existing, form, image).await
    }

    /// Deletes the document, then makes a best-effort attempt at the image.
    pub async fn delete(&self, entity: &E) -> Result<()> {
        self.documents.delete(E::COLLECTION, entity.id()).await?;
        info!("Deleted {}/{}", E::COLLECTION, entity.id());
        if has_stored_image(entity.image()) {
            let key = blob_key(E::COLLECTION, entity.id());
            if let Err(e) = self.blobs.delete(&key).await {
                warn!("Error deleting image '{}': {}", key, e);
            }
        }
        Ok(())
    }

    pub async fn delete_by_id(&self, id: &str) -> Result<()> {
        let entity = self.get(id).await?;
        self.delete(&entity).await
    }

    async fn upload_image(&self, id: &str, image: ImageUpload) -> Result<String> {
        let key = blob_key(E::COLLECTION, id);
        self.blobs.upload(&key, image.data, &image.content_type).await?;
        self.blobs.download_url(&key).await
    }
}

/// Empty references and placeholder art have no blob behind them.
fn has_stored_image(image: &str) -> bool { !image.is_empty() && !image.contains("placeholder") }

/// Number of products that reference each category.
pub fn product_counts(categories: &[Category], products: &[Product]) -> HashMap<String, usize> {
    categories
        .iter()
        .map(|c| (c.id.clone(), products.iter().filter(|p| p.categories.contains(&c.id)).count()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admin::entity::{CategoryForm, ProductForm, TestimonialForm};
    use crate::store::{Collection, MemoryBlobStore, MemoryDocumentStore};
    use crate::{Money, Testimonial};

    struct Fixture {
        documents: Arc<MemoryDocumentStore>,
        blobs: Arc<MemoryBlobStore>,
    }

    impl Fixture {
        fn new() -> Self {
            Self { documents: Arc::new(MemoryDocumentStore::new()), blobs: Arc::new(MemoryBlobStore::new("https://cdn.test")) }
        }
        fn service<E: AdminEntity>(&self) -> EntityService<E> {
            EntityService::new(self.documents.clone(), self.blobs.clone())
        }
    }

    fn product_form(name: &str, categories: &[&str]) -> ProductForm {
        ProductForm {
            nombre: name.into(), precio: "4500".into(), descripcion: "Vestido largo".into(), imagen: String::new(),
            stock: true, categorias: strings(categories),
        }
    }

    fn strings(categories: &[&str]) -> Vec<String> { categories.iter().map(|c| c.to_string()).collect() }

    fn png() -> Option<ImageUpload> { Some(ImageUpload { data: vec![0x89, 0x50, 0x4e, 0x47], content_type: "image/png".into() }) }

    #[tokio::test]
    async fn test_create_with_image_stores_final_url() {
        let fx = Fixture::new();
        let products = fx.service::<Product>();
        let created = products.create(&product_form("Vestido", &[]), png()).await.unwrap();

        let docs = fx.documents.list(Collection::Products).await.unwrap();
        assert_eq!(docs.len(), 1);
        let expected = format!("https://cdn.test/productos/{}", created.id);
        assert_eq!(docs[0].fields["imagen"], expected.as_str());
        assert!(!created.image.contains("new_"));
        assert_eq!(fx.blobs.keys().await, vec![format!("productos/{}", created.id)]);
    }

    #[tokio::test]
    async fn test_invalid_form_touches_nothing() {
        let fx = Fixture::new();
        let products = fx.service::<Product>();
        let mut form = product_form("Vestido", &[]);
        form.descripcion.clear();
        assert!(matches!(products.create(&form, png()).await, Err(StorefrontError::Validation(_))));
        assert!(fx.documents.list(Collection::Products).await.unwrap().is_empty());
        assert!(fx.blobs.keys().await.is_empty());
    }

    #[tokio::test]
    async fn test_update_keeps_image_without_new_file() {
        let fx = Fixture::new();
        let categories = fx.service::<Category>();
        let created = categories.create(&CategoryForm { nombre: "Vestidos".into(), imagen: String::new() }, png()).await.unwrap();

        let mut form = created.to_form();
        form.nombre = "Vestidos de fiesta".into();
        let updated = categories.update_by_id(&created.id, &form, None).await.unwrap();
        assert_eq!(updated.image, created.image);
        assert_eq!(categories.get(&created.id).await.unwrap().name, "Vestidos de fiesta");
    }

    #[tokio::test]
    async fn test_update_from_bare_form_keeps_stored_image() {
        let fx = Fixture::new();
        let products = fx.service::<Product>();
        let created = products.create(&product_form("Vestido", &[]), png()).await.unwrap();
        let updated = products.update_by_id(&created.id, &product_form("Vestido rojo", &[]), None).await.unwrap();
        assert_eq!(updated.image, created.image);
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let fx = Fixture::new();
        let err = fx.service::<Category>()
            .update_by_id("ghost", &CategoryForm { nombre: "X".into(), imagen: String::new() }, None)
            .await
            .unwrap_err();
        assert!(matches!(err, StorefrontError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_swallows_blob_failure() {
        let fx = Fixture::new();
        let testimonials = fx.service::<Testimonial>();
        let mut t = testimonials
            .create(&TestimonialForm { nombre: "Ana".into(), comentario: "Excelente".into(), imagen: String::new() }, None)
            .await
            .unwrap();
        // Image reference with no blob behind it: cleanup fails quietly.
        t.image = "https://elsewhere/ana.jpg".into();
        testimonials.delete(&t).await.unwrap();
        assert!(testimonials.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_removes_blob() {
        let fx = Fixture::new();
        let products = fx.service::<Product>();
        let created = products.create(&product_form("Vestido", &[]), png()).await.unwrap();
        products.delete_by_id(&created.id).await.unwrap();
        assert!(fx.blobs.keys().await.is_empty());
        assert!(products.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_category_delete_leaves_dangling_reference() {
        let fx = Fixture::new();
        let categories = fx.service::<Category>();
        let products = fx.service::<Product>();
        let cat = categories.create(&CategoryForm { nombre: "Vestidos".into(), imagen: String::new() }, None).await.unwrap();
        let p = products.create(&product_form("Vestido", &[cat.id.as_str()]), None).await.unwrap();

        categories.delete(&cat).await.unwrap();
        let reloaded = products.get(&p.id).await.unwrap();
        assert_eq!(reloaded.categories, vec![cat.id.clone()]);
        assert_eq!(reloaded.price, Money::from_units(4500));
    }

    #[test]
    fn test_product_counts() {
        let cats = vec![
            Category { id: "A".into(), name: "A".into(), image: String::new() },
            Category { id: "B".into(), name: "B".into(), image: String::new() },
        ];
        let mk = |id: &str, c: &[&str]| Product {
            id: id.into(), name: id.into(), price: Money::zero(), description: String::new(), image: String::new(),
            stock: true, categories: strings(c),
        };
        let counts = product_counts(&cats, &[mk("1", &["A"]), mk("2", &["A", "B"]), mk("3", &["Z"])]);
        assert_eq!(counts["A"], 2);
        assert_eq!(counts["B"], 1);
    }
}
