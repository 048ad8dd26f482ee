//! In-memory store implementations

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::{BlobStore, Collection, Document, DocumentStore, Fields, KeyValueStore, KvChange};
use crate::{Result, StorefrontError};

/// Document store backed by insertion-ordered vectors.
#[derive(Default)]
pub struct MemoryDocumentStore {
    collections: RwLock<HashMap<Collection, Vec<Document>>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self { Self::default() }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn list(&self, collection: Collection) -> Result<Vec<Document>> {
        Ok(self.collections.read().await.get(&collection).cloned().unwrap_or_default())
    }

    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>> {
        let guard = self.collections.read().await;
        Ok(guard.get(&collection).and_then(|docs| docs.iter().find(|d| d.id == id).cloned()))
    }

    async fn add(&self, collection: Collection, fields: Fields) -> Result<String> {
        let id = Uuid::new_v4().simple().to_string();
        self.collections.write().await.entry(collection).or_default().push(Document { id: id.clone(), fields });
        debug!("Added document {}/{}", collection, id);
        Ok(id)
    }

    async fn set(&self, collection: Collection, id: &str, fields: Fields) -> Result<()> {
        let mut guard = self.collections.write().await;
        let docs = guard.entry(collection).or_default();
        match docs.iter_mut().find(|d| d.id == id) {
            Some(doc) => doc.fields = fields,
            None => docs.push(Document { id: id.to_string(), fields }),
        }
        Ok(())
    }

    async fn update(&self, collection: Collection, id: &str, fields: Fields) -> Result<()> {
        let mut guard = self.collections.write().await;
        let doc = guard
            .get_mut(&collection)
            .and_then(|docs| docs.iter_mut().find(|d| d.id == id))
            .ok_or_else(|| StorefrontError::NotFound(format!("{}/{}", collection, id)))?;
        doc.fields.extend(fields);
        Ok(())
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<()> {
        if let Some(docs) = self.collections.write().await.get_mut(&collection) {
            docs.retain(|d| d.id != id);
        }
        Ok(())
    }
}

/// Blob store that keeps objects in memory and hands out `{base_url}/{key}`
/// URLs.
pub struct MemoryBlobStore {
    base_url: String,
    objects: RwLock<HashMap<String, (Vec<u8>, String)>>,
}

impl MemoryBlobStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into().trim_end_matches('/').to_string(), objects: RwLock::default() }
    }

    pub async fn contains(&self, key: &str) -> bool { self.objects.read().await.contains_key(key) }

    /// Stored bytes and content type.
    pub async fn get(&self, key: &str) -> Option<(Vec<u8>, String)> { self.objects.read().await.get(key).cloned() }

    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }
}

impl Default for MemoryBlobStore {
    fn default() -> Self { Self::new("memory://blobs") }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn upload(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<()> {
        self.objects.write().await.insert(key.to_string(), (data, content_type.to_string()));
        Ok(())
    }

    async fn download_url(&self, key: &str) -> Result<String> {
        if !self.contains(key).await {
            return Err(StorefrontError::Blob(format!("object '{}' does not exist", key)));
        }
        Ok(format!("{}/{}", self.base_url, key))
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.objects
            .write()
            .await
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| StorefrontError::Blob(format!("object '{}' does not exist", key)))
    }
}

#[derive(Default)]
pub struct MemoryKeyValueStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self { Self::default() }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>> { Ok(self.entries.read().await.get(key).cloned()) }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn update(&self, key: &str, change: KvChange<'_>) -> Result<Option<String>> {
        let mut guard = self.entries.write().await;
        match change(guard.get(key).map(String::as_str))? {
            Some(value) => {
                guard.insert(key.to_string(), value.clone());
                Ok(Some(value))
            }
            None => Ok(guard.get(key).cloned()),
        }
    }
}
