//! Estilo Storefront - catalog, cart and back-office API

use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use estilo_storefront::admin::AdminSessions;
use estilo_storefront::api::{self, AppState};
use estilo_storefront::checkout::WhatsAppCheckout;
use estilo_storefront::config::Config;
use estilo_storefront::store::{
    BlobStore, DocumentStore, KeyValueStore, MemoryBlobStore, MemoryDocumentStore, MemoryKeyValueStore, PgDocumentStore,
    PgKeyValueStore, S3BlobStore,
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())).with(tracing_subscriber::fmt::layer()).init();
    let config = Config::from_env()?;

    let (documents, sessions): (Arc<dyn DocumentStore>, Arc<dyn KeyValueStore>) = match &config.database_url {
        Some(url) => {
            let db = PgPoolOptions::new().max_connections(10).connect(url).await?;
            sqlx::migrate!("./migrations").run(&db).await?;
            (Arc::new(PgDocumentStore::new(db.clone())), Arc::new(PgKeyValueStore::new(db)))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; documents and sessions are kept in memory");
            (Arc::new(MemoryDocumentStore::new()), Arc::new(MemoryKeyValueStore::new()))
        }
    };
    let (blobs, local_blobs): (Arc<dyn BlobStore>, Option<Arc<MemoryBlobStore>>) = match config.s3.clone() {
        Some(s3) => (Arc::new(S3BlobStore::new(s3)?), None),
        None => {
            let memory = Arc::new(MemoryBlobStore::new(config.blob_base_url.clone()));
            (memory.clone(), Some(memory))
        }
    };

    let state = AppState {
        documents,
        blobs,
        local_blobs,
        sessions: sessions.clone(),
        checkout: WhatsAppCheckout::new(config.whatsapp_host.clone(), config.whatsapp_recipient.clone()),
        admin: AdminSessions::new(sessions, config.admin.clone()),
        upload_limit: config.max_upload_bytes,
    };
    let app = api::router(state);

    tracing::info!("🚀 Estilo Storefront listening on 0.0.0.0:{}", config.port);
    axum::serve(tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?, app).await?;
    Ok(())
}
