use super::{join_url, validate_object_path, BlobStore};
use crate::types::{AppError, Result};
use async_trait::async_trait;
use axum::body::Bytes;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Writes objects below a root directory and links them under a public base URL.
pub struct LocalBlobStore {
    root: PathBuf,
    public_base_url: String,
}

impl LocalBlobStore {
    pub fn new(root: impl AsRef<Path>, public_base_url: &str) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            public_base_url: public_base_url.to_string(),
        }
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn store(&self, bytes: Bytes, path: &str, _content_type: Option<&str>) -> Result<String> {
        validate_object_path(path)?;

        let target = self.root.join(path);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                AppError::Storage(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }

        tokio::fs::write(&target, &bytes)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to write {}: {}", target.display(), e)))?;

        debug!(path = %path, size = bytes.len(), "Stored object on disk");

        Ok(join_url(&self.public_base_url, path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_writes_file_and_returns_url() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = LocalBlobStore::new(dir.path(), "http://localhost:8000/uploads/");

        let url = store
            .store(Bytes::from_static(b"jpeg-bytes"), "Users/abc", Some("image/jpeg"))
            .await
            .expect("should store");

        assert_eq!(url, "http://localhost:8000/uploads/Users/abc");
        let written = std::fs::read(dir.path().join("Users").join("abc")).expect("file exists");
        assert_eq!(written, b"jpeg-bytes");
    }

    #[tokio::test]
    async fn test_overwrites_existing_object() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = LocalBlobStore::new(dir.path(), "http://localhost/uploads");

        store
            .store(Bytes::from_static(b"first"), "Users/same", None)
            .await
            .unwrap();
        store
            .store(Bytes::from_static(b"second"), "Users/same", None)
            .await
            .unwrap();

        let written = std::fs::read(dir.path().join("Users/same")).unwrap();
        assert_eq!(written, b"second");
    }

    #[tokio::test]
    async fn test_rejects_escape_from_root() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = LocalBlobStore::new(dir.path().join("uploads"), "http://localhost/uploads");

        let result = store
            .store(Bytes::from_static(b"x"), "Users/../../outside", None)
            .await;

        assert!(matches!(result, Err(AppError::Storage(_))));
        assert!(!dir.path().join("outside").exists());
    }
}
