use super::{join_url, validate_object_path, BlobStore};
use crate::types::{AppError, Result};
use async_trait::async_trait;
use axum::body::Bytes;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use tracing::debug;

/// Uploads objects with `PUT {upload_url}/{path}`.
///
/// Works with any endpoint that accepts raw-body PUTs (S3 presigned-style
/// gateways, GCS/Firebase XML API proxies, MinIO behind a gateway).
pub struct HttpBlobStore {
    client: reqwest::Client,
    upload_url: String,
    public_base_url: String,
    bearer_token: Option<String>,
}

impl HttpBlobStore {
    pub fn new(
        upload_url: &str,
        public_base_url: &str,
        bearer_token: Option<String>,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| AppError::Storage(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            upload_url: upload_url.to_string(),
            public_base_url: public_base_url.to_string(),
            bearer_token,
        })
    }
}

#[async_trait]
impl BlobStore for HttpBlobStore {
    async fn store(&self, bytes: Bytes, path: &str, content_type: Option<&str>) -> Result<String> {
        validate_object_path(path)?;

        let size = bytes.len();
        let mut request = self
            .client
            .put(join_url(&self.upload_url, path))
            .header(CONTENT_TYPE, content_type.unwrap_or("application/octet-stream"))
            .body(bytes);

        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }

        let resp = request
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("Upload request failed: {}", e)))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(AppError::Storage(format!(
                "Upload rejected ({}): {}",
                status, body
            )));
        }

        debug!(path = %path, size, "Uploaded object");

        Ok(join_url(&self.public_base_url, path))
    }
}
