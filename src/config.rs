//! Service configuration from the environment

use std::env;

use crate::admin::AdminCredentials;
use crate::store::S3Config;
use crate::{Result, StorefrontError};

pub const DEFAULT_PORT: u16 = 8083;
pub const DEFAULT_WHATSAPP_HOST: &str = "wa.me";
pub const DEFAULT_WHATSAPP_RECIPIENT: &str = "3412714029";
pub const DEFAULT_S3_REGION: &str = "us-east-1";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Postgres document and session store; in-memory when unset.
    pub database_url: Option<String>,
    /// S3/MinIO blob store; in-memory when unset.
    pub s3: Option<S3Config>,
    /// Base of the URLs handed out by the in-memory blob store; the service
    /// serves those objects itself under `/blobs`.
    pub blob_base_url: String,
    /// Request body limit for the admin multipart routes.
    pub max_upload_bytes: usize,
    pub whatsapp_host: String,
    pub whatsapp_recipient: String,
    pub admin: AdminCredentials,
}

impl Config {
    /// Reads the process environment. The binary loads `.env` beforehand.
    pub fn from_env() -> Result<Self> {
        let config = Self::from_lookup(|name| env::var(name).ok())?;
        tracing::info!(
            port = config.port,
            postgres = config.database_url.is_some(),
            s3 = config.s3.is_some(),
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Builds the configuration from any variable source. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let port = match get("PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|e| StorefrontError::Config(format!("Invalid PORT '{}': {}", raw, e)))?,
            None => DEFAULT_PORT,
        };

        let max_upload_bytes = match get("MAX_UPLOAD_BYTES") {
            Some(raw) => raw
                .parse::<usize>()
                .map_err(|e| StorefrontError::Config(format!("Invalid MAX_UPLOAD_BYTES '{}': {}", raw, e)))?,
            None => DEFAULT_MAX_UPLOAD_BYTES,
        };

        let s3 = match (get("S3_ENDPOINT"), get("S3_BUCKET"), get("S3_ACCESS_KEY"), get("S3_SECRET_KEY")) {
            (Some(endpoint), Some(bucket), Some(access_key), Some(secret_key)) => Some(S3Config {
                public_endpoint: get("S3_PUBLIC_ENDPOINT").unwrap_or_else(|| endpoint.clone()),
                region: get("S3_REGION").unwrap_or_else(|| DEFAULT_S3_REGION.to_string()),
                endpoint,
                bucket,
                access_key,
                secret_key,
            }),
            (None, None, None, None) => None,
            _ => {
                return Err(StorefrontError::Config(
                    "S3_ENDPOINT, S3_BUCKET, S3_ACCESS_KEY and S3_SECRET_KEY must be set together".to_string(),
                ))
            }
        };

        let admin = AdminCredentials {
            email: get("ADMIN_EMAIL").unwrap_or_default(),
            password: get("ADMIN_PASSWORD").unwrap_or_default(),
        };
        if admin.email.is_empty() {
            tracing::warn!("ADMIN_EMAIL is not set; admin login is disabled");
        }

        Ok(Self {
            port,
            database_url: get("DATABASE_URL"),
            s3,
            blob_base_url: get("BLOB_BASE_URL").unwrap_or_else(|| format!("http://localhost:{}/blobs", port)),
            max_upload_bytes,
            whatsapp_host: get("WHATSAPP_HOST").unwrap_or_else(|| DEFAULT_WHATSAPP_HOST.to_string()),
            whatsapp_recipient: get("WHATSAPP_RECIPIENT").unwrap_or_else(|| DEFAULT_WHATSAPP_RECIPIENT.to_string()),
            admin,
        })
    }
}
