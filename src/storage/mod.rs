//! Binary object storage for profile images.
//!
//! Uploads go through the [`BlobStore`] trait so the account service never
//! knows where bytes end up. Three backends are provided:
//!
//! - [`MemoryBlobStore`] - process memory, for tests and throwaway instances
//! - [`LocalBlobStore`] - a directory on disk, optionally served by this server
//! - [`HttpBlobStore`] - `PUT` to an object-storage endpoint
//!
//! The backend is built once at startup from `[storage]` in `accounts.toml`
//! and injected through [`AppState`](crate::AppState).

pub mod http;
pub mod local;
pub mod memory;

pub use http::HttpBlobStore;
pub use local::LocalBlobStore;
pub use memory::MemoryBlobStore;

use crate::types::{AppError, Result};
use crate::utils::toml_config::{AccountsConfig, ConfigError, StorageBackend};
use async_trait::async_trait;
use axum::body::Bytes;
use std::sync::Arc;

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `bytes` under `path` and return the URL it can be fetched from.
    async fn store(&self, bytes: Bytes, path: &str, content_type: Option<&str>) -> Result<String>;
}

/// Rejects empty, absolute and parent-traversing object paths.
pub fn validate_object_path(path: &str) -> Result<()> {
    if path.is_empty()
        || path.starts_with('/')
        || path.contains('\\')
        || path.split('/').any(|segment| segment.is_empty() || segment == "..")
    {
        return Err(AppError::Storage(format!("Invalid object path: '{}'", path)));
    }
    Ok(())
}

/// Joins a base URL and an object path with exactly one slash.
pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// Build the configured blob store
pub fn create_blob_store(config: &AccountsConfig) -> Result<Arc<dyn BlobStore>> {
    match &config.storage.backend {
        StorageBackend::Memory => Ok(Arc::new(MemoryBlobStore::new())),
        StorageBackend::Local {
            root,
            public_base_url,
            ..
        } => Ok(Arc::new(LocalBlobStore::new(root, public_base_url))),
        StorageBackend::Http {
            upload_url,
            public_base_url,
            token_env,
        } => {
            let token = match token_env {
                Some(name) => Some(
                    config
                        .resolve_env(name)
                        .ok_or_else(|| ConfigError::MissingEnvVar(name.clone()))?,
                ),
                None => None,
            };
            Ok(Arc::new(HttpBlobStore::new(upload_url, public_base_url, token)?))
        }
    }
}
