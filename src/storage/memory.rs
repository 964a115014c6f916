use super::{validate_object_path, BlobStore};
use crate::types::Result;
use async_trait::async_trait;
use axum::body::Bytes;
use parking_lot::RwLock;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct StoredObject {
    pub bytes: Bytes,
    pub content_type: Option<String>,
}

/// Blob store that keeps objects in memory. URLs look like `memory://{path}`.
#[derive(Default)]
pub struct MemoryBlobStore {
    objects: RwLock<HashMap<String, StoredObject>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str) -> Option<StoredObject> {
        self.objects.read().get(path).cloned()
    }

    pub fn len(&self) -> usize {
        self.objects.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.read().is_empty()
    }

    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.objects.read().keys().cloned().collect();
        paths.sort();
        paths
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn store(&self, bytes: Bytes, path: &str, content_type: Option<&str>) -> Result<String> {
        validate_object_path(path)?;

        self.objects.write().insert(
            path.to_string(),
            StoredObject {
                bytes,
                content_type: content_type.map(str::to_string),
            },
        );

        Ok(format!("memory://{}", path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_store_and_get() {
        let store = MemoryBlobStore::new();

        let url = store
            .store(Bytes::from_static(b"\x89PNG"), "Users/one", Some("image/png"))
            .await
            .expect("should store");

        assert_eq!(url, "memory://Users/one");
        let object = store.get("Users/one").expect("object should exist");
        assert_eq!(&object.bytes[..], b"\x89PNG");
        assert_eq!(object.content_type.as_deref(), Some("image/png"));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_rejects_traversal() {
        let store = MemoryBlobStore::new();

        let result = store.store(Bytes::new(), "../escape", None).await;

        assert!(result.is_err());
        assert!(store.is_empty());
    }
}
