//! Postgres-backed stores. Every collection shares one JSONB table.

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use super::{Collection, Document, DocumentStore, Fields, KeyValueStore, KvChange};
use crate::{Result, StorefrontError};

#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self { Self { pool } }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn list(&self, collection: Collection) -> Result<Vec<Document>> {
        let rows = sqlx::query_as::<_, (String, Json<Fields>)>(
            "SELECT id, fields FROM documents WHERE collection = $1 ORDER BY seq",
        )
        .bind(collection.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list {}: {:?}", collection, e);
            StorefrontError::Database(e)
        })?;
        Ok(rows.into_iter().map(|(id, Json(fields))| Document { id, fields }).collect())
    }

    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>> {
        let row = sqlx::query_as::<_, (String, Json<Fields>)>(
            "SELECT id, fields FROM documents WHERE collection = $1 AND id = $2",
        )
        .bind(collection.as_str())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|(id, Json(fields))| Document { id, fields }))
    }

    async fn add(&self, collection: Collection, fields: Fields) -> Result<String> {
        let id = Uuid::now_v7().simple().to_string();
        sqlx::query("INSERT INTO documents (collection, id, fields) VALUES ($1, $2, $3)")
            .bind(collection.as_str())
            .bind(&id)
            .bind(Json(fields))
            .execute(&self.pool)
            .await?;
        Ok(id)
    }

    async fn set(&self, collection: Collection, id: &str, fields: Fields) -> Result<()> {
        sqlx::query(
            "INSERT INTO documents (collection, id, fields) VALUES ($1, $2, $3) \
             ON CONFLICT (collection, id) DO UPDATE SET fields = EXCLUDED.fields, updated_at = NOW()",
        )
        .bind(collection.as_str())
        .bind(id)
        .bind(Json(fields))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update(&self, collection: Collection, id: &str, fields: Fields) -> Result<()> {
        let result = sqlx::query(
            "UPDATE documents SET fields = fields || $3, updated_at = NOW() WHERE collection = $1 AND id = $2",
        )
        .bind(collection.as_str())
        .bind(id)
        .bind(Json(fields))
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(StorefrontError::NotFound(format!("{}/{}", collection, id)));
        }
        Ok(())
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<()> {
        sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

/// Server-side replacement for browser local storage.
#[derive(Clone)]
pub struct PgKeyValueStore {
    pool: PgPool,
}

impl PgKeyValueStore {
    pub fn new(pool: PgPool) -> Self { Self { pool } }
}

#[async_trait]
impl KeyValueStore for PgKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM kv_entries WHERE key = $1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|(value,)| value))
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        sqlx::query(
            "INSERT INTO kv_entries (key, value) VALUES ($1, $2) \
             ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        sqlx::query("DELETE FROM kv_entries WHERE key = $1").bind(key).execute(&self.pool).await?;
        Ok(())
    }

    /// Serialized per key with a transaction-scoped advisory lock, which also
    /// covers keys that have no row yet.
    async fn update(&self, key: &str, change: KvChange<'_>) -> Result<Option<String>> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))").bind(key).execute(&mut *tx).await?;
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM kv_entries WHERE key = $1")
            .bind(key)
            .fetch_optional(&mut *tx)
            .await?;
        let current = row.map(|(value,)| value);
        let Some(next) = change(current.as_deref())? else {
            tx.commit().await?;
            return Ok(current);
        };
        sqlx::query(
            "INSERT INTO kv_entries (key, value) VALUES ($1, $2) \
             ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()",
        )
        .bind(key)
        .bind(&next)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(Some(next))
    }
}
