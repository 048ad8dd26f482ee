//! Back-office editor state machine
//!
//! ```text
//! Idle ─list→ Listing ─start_create→ Creating ─┐
//!                     ─start_edit──→ Editing ──┴─submit→ Submitting ─ok→ Listing
//!                                                                   └err→ ErrorRetained ─submit→ Submitting
//! ```
//!
//! A form that fails local validation keeps its state. Successful submits and
//! deletes are reflected into the in-memory listing without a re-fetch.

use tracing::warn;

use super::entity::{validate_form, AdminEntity};
use super::service::{EntityService, ImageUpload};
use crate::{Result, StorefrontError};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EditTarget {
    New,
    Existing(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EditorState {
    Idle,
    Listing,
    Creating,
    Editing { id: String },
    Submitting { target: EditTarget },
    /// The last submit failed; the form is kept so it can be retried.
    ErrorRetained { target: EditTarget, message: String },
}

pub struct EntityEditor<E: AdminEntity> {
    service: EntityService<E>,
    state: EditorState,
    items: Vec<E>,
    form: E::Form,
    preview: Option<String>,
}

impl<E: AdminEntity> EntityEditor<E> {
    pub fn new(service: EntityService<E>) -> Self {
        Self { service, state: EditorState::Idle, items: Vec::new(), form: E::Form::default(), preview: None }
    }

    pub fn state(&self) -> &EditorState { &self.state }
    pub fn items(&self) -> &[E] { &self.items }
    pub fn form(&self) -> &E::Form { &self.form }
    pub fn form_mut(&mut self) -> &mut E::Form { &mut self.form }
    /// Image currently shown next to the form.
    pub fn preview(&self) -> Option<&str> { self.preview.as_deref() }

    pub fn search(&self, term: &str) -> Vec<&E> { self.items.iter().filter(|e| e.matches_search(term)).collect() }

    /// Fetches the collection. On failure the previous listing is kept.
    pub async fn list(&mut self) -> Result<()> {
        let fetched = self.service.list().await;
        self.state = EditorState::Listing;
        match fetched {
            Ok(items) => {
                self.items = items;
                Ok(())
            }
            Err(e) => {
                warn!("Keeping {} cached {} after list failure", self.items.len(), E::COLLECTION);
                Err(e)
            }
        }
    }

    pub fn start_create(&mut self) {
        self.form = E::Form::default();
        self.preview = None;
        self.state = EditorState::Creating;
    }

    pub fn start_edit(&mut self, id: &str) -> Result<()> {
        let entity = self
            .items
            .iter()
            .find(|e| e.id() == id)
            .ok_or_else(|| StorefrontError::NotFound(format!("{}/{}", E::COLLECTION, id)))?;
        self.form = entity.to_form();
        self.preview = Some(entity.image().to_string()).filter(|url| !url.is_empty());
        self.state = EditorState::Editing { id: id.to_string() };
        Ok(())
    }

    pub fn cancel(&mut self) {
        self.form = E::Form::default();
        self.preview = None;
        self.state = EditorState::Listing;
    }

    pub async fn submit(&mut self, image: Option<ImageUpload>) -> Result<E> {
        let target = match &self.state {
            EditorState::Creating => EditTarget::New,
            EditorState::Editing { id } => EditTarget::Existing(id.clone()),
            EditorState::ErrorRetained { target, .. } => target.clone(),
            other => return Err(StorefrontError::Validation(format!("No form is open (state: {:?})", other))),
        };
        validate_form::<E>(&self.form)?;

        self.state = EditorState::Submitting { target: target.clone() };
        let saved = match &target {
            EditTarget::New => self.service.create(&self.form, image).await,
            EditTarget::Existing(id) => match self.items.iter().find(|e| e.id() == id.as_str()) {
                Some(existing) => self.service.update(existing, &self.form, image).await,
                None => self.service.update_by_id(id, &self.form, image).await,
            },
        };

        match saved {
            Ok(entity) => {
                match self.items.iter_mut().find(|e| e.id() == entity.id()) {
                    Some(slot) => *slot = entity.clone(),
                    None => self.items.push(entity.clone()),
                }
                self.form = E::Form::default();
                self.preview = None;
                self.state = EditorState::Listing;
                Ok(entity)
            }
            Err(e) => {
                self.state = EditorState::ErrorRetained { target, message: e.to_string() };
                Err(e)
            }
        }
    }

    pub async fn delete(&mut self, id: &str) -> Result<()> {
        let entity = self
            .items
            .iter()
            .find(|e| e.id() == id)
            .cloned()
            .ok_or_else(|| StorefrontError::NotFound(format!("{}/{}", E::COLLECTION, id)))?;
        self.service.delete(&entity).await?;
        self.items.retain(|e| e.id() != id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{BlobStore, Collection, Document, DocumentStore, Fields, MemoryBlobStore, MemoryDocumentStore};
    use crate::{Category, Product};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    /// Memory store whose writes can be switched off.
    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryDocumentStore,
        failing: AtomicBool,
    }

    impl FlakyStore {
        fn check(&self) -> Result<()> {
            if self.failing.load(Ordering::SeqCst) { Err(StorefrontError::Store("unavailable".into())) } else { Ok(()) }
        }
    }

    #[async_trait]
    impl DocumentStore for FlakyStore {
        async fn list(&self, c: Collection) -> Result<Vec<Document>> { self.check()?; self.inner.list(c).await }
        async fn get(&self, c: Collection, id: &str) -> Result<Option<Document>> { self.check()?; self.inner.get(c, id).await }
        async fn add(&self, c: Collection, f: Fields) -> Result<String> { self.check()?; self.inner.add(c, f).await }
        async fn set(&self, c: Collection, id: &str, f: Fields) -> Result<()> { self.check()?; self.inner.set(c, id, f).await }
        async fn update(&self, c: Collection, id: &str, f: Fields) -> Result<()> { self.check()?; self.inner.update(c, id, f).await }
        async fn delete(&self, c: Collection, id: &str) -> Result<()> { self.check()?; self.inner.delete(c, id).await }
    }

    fn editor<E: AdminEntity>(store: Arc<FlakyStore>) -> EntityEditor<E> {
        let blobs: Arc<dyn BlobStore> = Arc::new(MemoryBlobStore::default());
        EntityEditor::new(EntityService::new(store, blobs))
    }

    #[tokio::test]
    async fn test_create_flow_reflects_into_listing() {
        let store = Arc::new(FlakyStore::default());
        let mut ed = editor::<Category>(store.clone());
        assert_eq!(ed.state(), &EditorState::Idle);
        ed.list().await.unwrap();
        assert_eq!(ed.state(), &EditorState::Listing);

        ed.start_create();
        assert_eq!(ed.state(), &EditorState::Creating);
        ed.form_mut().nombre = "Vestidos".into();
        let created = ed.submit(None).await.unwrap();
        assert_eq!(ed.state(), &EditorState::Listing);
        assert_eq!(ed.items().len(), 1);
        assert_eq!(ed.items()[0].id, created.id);
        assert_eq!(store.inner.list(Collection::Categories).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_validation_failure_keeps_state() {
        let mut ed = editor::<Product>(Arc::new(FlakyStore::default()));
        ed.start_create();
        ed.form_mut().nombre = "Vestido".into();
        let err = ed.submit(None).await.unwrap_err();
        assert!(matches!(err, StorefrontError::Validation(_)));
        assert_eq!(ed.state(), &EditorState::Creating);
        assert_eq!(ed.form().nombre, "Vestido");
    }

    #[tokio::test]
    async fn test_store_failure_retains_form_and_retries() {
        let store = Arc::new(FlakyStore::default());
        let mut ed = editor::<Category>(store.clone());
        ed.start_create();
        ed.form_mut().nombre = "Accesorios".into();
        store.failing.store(true, Ordering::SeqCst);
        assert!(ed.submit(None).await.is_err());
        assert!(matches!(ed.state(), EditorState::ErrorRetained { target: EditTarget::New, .. }));
        assert_eq!(ed.form().nombre, "Accesorios");
        assert!(ed.items().is_empty());

        store.failing.store(false, Ordering::SeqCst);
        ed.submit(None).await.unwrap();
        assert_eq!(ed.state(), &EditorState::Listing);
        assert_eq!(ed.items().len(), 1);
    }

    #[tokio::test]
    async fn test_list_failure_keeps_previous_items() {
        let store = Arc::new(FlakyStore::default());
        let mut ed = editor::<Category>(store.clone());
        ed.start_create();
        ed.form_mut().nombre = "Vestidos".into();
        ed.submit(None).await.unwrap();

        store.failing.store(true, Ordering::SeqCst);
        assert!(ed.list().await.is_err());
        assert_eq!(ed.items().len(), 1);
        assert_eq!(ed.state(), &EditorState::Listing);
    }

    #[tokio::test]
    async fn test_edit_prefills_and_updates_in_place() {
        let store = Arc::new(FlakyStore::default());
        let mut ed = editor::<Category>(store.clone());
        ed.start_create();
        ed.form_mut().nombre = "Vestidos".into();
        let image = ImageUpload { data: vec![1, 2, 3], content_type: "image/jpeg".into() };
        let created = ed.submit(Some(image)).await.unwrap();

        ed.start_edit(&created.id).unwrap();
        assert_eq!(ed.state(), &EditorState::Editing { id: created.id.clone() });
        assert_eq!(ed.form().nombre, "Vestidos");
        assert_eq!(ed.preview(), Some(created.image.as_str()));
        ed.form_mut().nombre = "Vestidos largos".into();
        ed.submit(None).await.unwrap();
        assert_eq!(ed.items().len(), 1);
        assert_eq!(ed.items()[0].name, "Vestidos largos");
        assert_eq!(ed.items()[0].image, created.image);
    }

    #[tokio::test]
    async fn test_delete_and_search() {
        let mut ed = editor::<Category>(Arc::new(FlakyStore::default()));
        for name in ["Vestidos", "Remeras"] {
            ed.start_create();
            ed.form_mut().nombre = name.into();
            ed.submit(None).await.unwrap();
        }
        assert_eq!(ed.search("rem").len(), 1);
        let id = ed.items()[0].id.clone();
        ed.delete(&id).await.unwrap();
        assert_eq!(ed.items().len(), 1);
        assert!(ed.delete("ghost").await.is_err());
        assert!(ed.start_edit("ghost").is_err());
    }

    #[tokio::test]
    async fn test_submit_without_open_form() {
        let mut ed = editor::<Category>(Arc::new(FlakyStore::default()));
        assert!(ed.submit(None).await.is_err());
        assert_eq!(ed.state(), &EditorState::Idle);
    }
}
