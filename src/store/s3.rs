//! S3/MinIO blob store
//!
//! Objects live at their plain key inside one bucket and are served from the
//! public endpoint as `{public_endpoint}/{bucket}/{key}`. The bucket is
//! expected to allow anonymous reads.

use async_trait::async_trait;
use s3::creds::Credentials;
use s3::{Bucket, Region};
use tracing::{debug, info};

use super::BlobStore;
use crate::{Result, StorefrontError};

#[derive(Debug, Clone)]
pub struct S3Config {
    /// S3/MinIO endpoint URL
    pub endpoint: String,
    /// Endpoint browsers use to fetch images (defaults to `endpoint`)
    pub public_endpoint: String,
    pub bucket: String,
    pub region: String,
    pub access_key: String,
    pub secret_key: String,
}

pub struct S3BlobStore {
    bucket: Box<Bucket>,
    public_endpoint: String,
}

impl S3BlobStore {
    pub fn new(config: S3Config) -> Result<Self> {
        let credentials = Credentials::new(Some(&config.access_key), Some(&config.secret_key), None, None, None)
            .map_err(|e| StorefrontError::Config(format!("Failed to create S3 credentials: {}", e)))?;
        let region = Region::Custom { region: config.region.clone(), endpoint: config.endpoint.clone() };
        let mut bucket = Bucket::new(&config.bucket, region, credentials)
            .map_err(|e| StorefrontError::Config(format!("Failed to open bucket '{}': {}", config.bucket, e)))?;
        // MinIO wants http://endpoint/bucket rather than http://bucket.endpoint
        bucket.set_path_style();

        info!("S3 blob store ready: endpoint={}, bucket={}", config.endpoint, config.bucket);
        Ok(Self { bucket, public_endpoint: config.public_endpoint.trim_end_matches('/').to_string() })
    }

    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{}/{}", self.public_endpoint, self.bucket.name(), key)
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn upload(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<()> {
        let response = self
            .bucket
            .put_object_with_content_type(key, &data, content_type)
            .await
            .map_err(|e| StorefrontError::Blob(format!("Failed to upload '{}': {}", key, e)))?;
        if response.status_code() >= 300 {
            return Err(StorefrontError::Blob(format!("Upload of '{}' returned {}", key, response.status_code())));
        }
        debug!("Uploaded '{}' ({} bytes) to bucket '{}'", key, data.len(), self.bucket.name());
        Ok(())
    }

    async fn download_url(&self, key: &str) -> Result<String> { Ok(self.public_url(key)) }

    async fn delete(&self, key: &str) -> Result<()> {
        let response = self
            .bucket
            .delete_object(key)
            .await
            .map_err(|e| StorefrontError::Blob(format!("Failed to delete '{}': {}", key, e)))?;
        if response.status_code() >= 300 {
            return Err(StorefrontError::Blob(format!("Delete of '{}' returned {}", key, response.status_code())));
        }
        debug!("Deleted '{}' from bucket '{}'", key, self.bucket.name());
        Ok(())
    }
}
