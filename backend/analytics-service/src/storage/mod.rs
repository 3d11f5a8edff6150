//! Cover image resolution.
//!
//! Manga rows store an object key; responses carry a presigned GET URL.
//! Presigning is local SigV4 signing against the configured bucket, no
//! round trip to the object store.

use std::time::Duration;

use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::Client;

use crate::config::StorageConfig;
use crate::error::{AnalyticsError, Result};

#[derive(Clone)]
pub struct CoverStorage {
    client: Client,
    bucket: String,
    expiry: Duration,
}

impl CoverStorage {
    pub async fn from_config(config: &StorageConfig) -> Self {
        use aws_sdk_s3::config::Region;

        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(config.region.clone()));

        // Custom endpoint for S3-compatible storage (MinIO in development)
        if let Some(endpoint) = &config.endpoint {
            loader = loader.endpoint_url(endpoint);
        }

        let sdk_config = loader.load().await;
        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(config.endpoint.is_some())
            .build();

        Self {
            client: Client::from_conf(s3_config),
            bucket: config.bucket.clone(),
            expiry: Duration::from_secs(config.presign_expiry_secs),
        }
    }

    /// Presigned GET URL for an object key.
    pub async fn presigned_get_url(&self, key: &str) -> Result<String> {
        let presigning = PresigningConfig::builder()
            .expires_in(self.expiry)
            .build()
            .map_err(|e| AnalyticsError::CoverStorage(format!("presigning config: {e}")))?;

        let request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presigning)
            .await
            .map_err(|e| AnalyticsError::CoverStorage(format!("presign failed: {e}")))?;

        Ok(request.uri().to_string())
    }
}
