//! Collaborator fakes for tests.
//!
//! These stand in for the blob store and record store when a test needs a
//! collaborator to fail or to be observed.

use accounts::db::DatabaseClient;
use accounts::storage::BlobStore;
use accounts::types::{AppError, ProfileUpdate, Result, User};
use async_trait::async_trait;
use axum::body::Bytes;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Blob store that rejects every upload and counts the attempts.
#[derive(Default)]
pub struct FailingBlobStore {
    attempts: AtomicUsize,
}

impl FailingBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BlobStore for FailingBlobStore {
    async fn store(&self, _bytes: Bytes, path: &str, _content_type: Option<&str>) -> Result<String> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(AppError::Storage(format!(
            "bucket unavailable while writing {}",
            path
        )))
    }
}

/// Record store whose every call fails with a database error.
pub struct BrokenDatabase;

#[async_trait]
impl DatabaseClient for BrokenDatabase {
    async fn create_user(&self, _user: &User) -> Result<()> {
        Err(broken())
    }

    async fn get_user_by_id(&self, _id: &str) -> Result<Option<User>> {
        Err(broken())
    }

    async fn get_user_by_email(&self, _email: &str) -> Result<Option<User>> {
        Err(broken())
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        Err(broken())
    }

    async fn update_user(&self, _id: &str, _update: &ProfileUpdate) -> Result<bool> {
        Err(broken())
    }

    async fn delete_user(&self, _id: &str) -> Result<bool> {
        Err(broken())
    }
}

fn broken() -> AppError {
    AppError::Database("connection reset by peer at 10.0.0.7:5432".to_string())
}
