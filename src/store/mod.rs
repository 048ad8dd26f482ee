//! Persistence ports
//!
//! Three narrow seams stand between the storefront and its backends:
//! - [`DocumentStore`]: named collections of schemaless records keyed by id
//! - [`BlobStore`]: binary objects (images) keyed by `{collection}/{id}`
//! - [`KeyValueStore`]: small string entries such as the cart and admin marker
//!
//! Each has an in-memory implementation for tests and local runs, and a
//! networked one (Postgres, S3/MinIO) for deployments.

mod memory;
mod postgres;
mod s3;

pub use memory::{MemoryBlobStore, MemoryDocumentStore, MemoryKeyValueStore};
pub use postgres::{PgDocumentStore, PgKeyValueStore};
pub use s3::{S3BlobStore, S3Config};

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::{Result, StorefrontError};

pub type Fields = Map<String, Value>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    Products,
    Categories,
    Testimonials,
    Sales,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Products => "productos",
            Collection::Categories => "categorias",
            Collection::Testimonials => "testimonios",
            Collection::Sales => "ventas",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Key-value entries are scoped per session: `{session}:{name}`.
pub fn scoped_key(session: &str, name: &str) -> String { format!("{}:{}", session, name) }

/// Blob key for an entity's image.
pub fn blob_key(collection: Collection, id: &str) -> String { format!("{}/{}", collection, id) }

#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
}

impl Document {
    /// Decodes into a record type whose `id` field receives the document id.
    pub fn decode<T: DeserializeOwned>(self) -> Result<T> {
        let mut fields = self.fields;
        fields.insert("id".to_string(), Value::String(self.id));
        Ok(serde_json::from_value(Value::Object(fields))?)
    }
}

/// Serializes a record into stored fields. The id is addressing, not data,
/// so it never lands in the field map.
pub fn to_fields<T: Serialize>(record: &T) -> Result<Fields> {
    match serde_json::to_value(record)? {
        Value::Object(mut fields) => {
            fields.remove("id");
            Ok(fields)
        }
        other => Err(StorefrontError::Store(format!("expected an object record, got {}", other))),
    }
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Whole collection in store order.
    async fn list(&self, collection: Collection) -> Result<Vec<Document>>;
    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>>;
    /// Creates a document under a store-generated id and returns it.
    async fn add(&self, collection: Collection, fields: Fields) -> Result<String>;
    /// Creates or replaces the document at `id`.
    async fn set(&self, collection: Collection, id: &str, fields: Fields) -> Result<()>;
    /// Merges `fields` into an existing document; `NotFound` if absent.
    async fn update(&self, collection: Collection, id: &str, fields: Fields) -> Result<()>;
    async fn delete(&self, collection: Collection, id: &str) -> Result<()>;
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn upload(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<()>;
    /// Retrieval URL of an uploaded object.
    async fn download_url(&self, key: &str) -> Result<String>;
    async fn delete(&self, key: &str) -> Result<()>;
}

/// Read-modify-write step for [`KeyValueStore::update`]. Receives the current
/// value; `Some` replaces it, `None` leaves the entry untouched.
pub type KvChange<'a> = Box<dyn FnOnce(Option<&str>) -> Result<Option<String>> + Send + 'a>;

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: String) -> Result<()>;
    async fn remove(&self, key: &str) -> Result<()>;
    /// Applies `change` with no other update to the same key in between and
    /// returns the value stored afterwards.
    async fn update(&self, key: &str, change: KvChange<'_>) -> Result<Option<String>>;
}

pub async fn list_as<T: DeserializeOwned>(store: &dyn DocumentStore, collection: Collection) -> Result<Vec<T>> {
    store.list(collection).await?.into_iter().map(Document::decode).collect()
}

pub async fn get_as<T: DeserializeOwned>(store: &dyn DocumentStore, collection: Collection, id: &str) -> Result<Option<T>> {
    store.get(collection, id).await?.map(Document::decode).transpose()
}
