//! Shared helpers for integration tests.

#![allow(dead_code)]

pub mod mocks;

use accounts::auth::jwt::TokenService;
use accounts::auth::password::PasswordHasher;
use accounts::db::{DatabaseClient, TursoClient};
use accounts::storage::{BlobStore, MemoryBlobStore};
use accounts::{api::routes::create_app, AccountsConfig, AppState};
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use std::sync::Arc;

pub const TEST_SECRET: &str = "integration-test-secret-0123456789abcdef";

/// In-memory configuration: memory record store, memory blob store.
pub fn test_config() -> AccountsConfig {
    AccountsConfig::from_toml(
        r#"
[database]
provider = "memory"

[storage]
provider = "memory"
"#,
    )
    .expect("test config should parse")
}

pub struct TestApp {
    pub server: TestServer,
    pub tokens: Arc<TokenService>,
    pub db: Arc<dyn DatabaseClient>,
}

/// Build the full application around the given collaborators.
pub fn build_app(
    config: AccountsConfig,
    db: Arc<dyn DatabaseClient>,
    blobs: Arc<dyn BlobStore>,
) -> TestApp {
    let tokens = Arc::new(TokenService::new(TEST_SECRET, config.token_ttl()));
    // Minimal Argon2 cost keeps the suite fast
    let hasher = PasswordHasher::new(1024, 1, 1).expect("valid argon2 params");

    let state = AppState::from_parts(config, db.clone(), blobs, hasher, tokens.clone());
    let server = TestServer::new(create_app(state)).expect("Failed to create test server");

    TestApp { server, tokens, db }
}

/// Full application backed by a fresh in-memory database and blob store.
pub async fn spawn_app() -> (TestApp, Arc<MemoryBlobStore>) {
    let blobs = Arc::new(MemoryBlobStore::new());
    let app = spawn_app_with_blobs(blobs.clone()).await;
    (app, blobs)
}

pub async fn spawn_app_with_blobs(blobs: Arc<dyn BlobStore>) -> TestApp {
    let db: Arc<dyn DatabaseClient> = Arc::new(
        TursoClient::new_memory()
            .await
            .expect("Failed to create in-memory database"),
    );
    build_app(test_config(), db, blobs)
}

/// Registration form with every field valid.
pub fn registration_form(email: &str, password: &str) -> MultipartForm {
    MultipartForm::new()
        .add_text("name", "Test User")
        .add_text("email", email)
        .add_text("password", password)
        .add_text("gender", "Other")
        .add_text("age", "30")
        .add_text("address", "221B Baker Street")
        .add_text("city", "London")
        .add_text("state", "England")
        .add_text("zip", "NW1 6XE")
        .add_part("image", image_part())
}

pub fn image_part() -> Part {
    Part::bytes(b"\x89PNG\r\n\x1a\nfake-image".to_vec())
        .file_name("avatar.png")
        .mime_type("image/png")
}

/// Register a user and return `(user_id, token)`.
pub async fn register(server: &TestServer, email: &str, password: &str) -> (String, String) {
    let response = server
        .post("/api/users/register")
        .multipart(registration_form(email, password))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);

    let body: serde_json::Value = response.json();
    (
        body["_id"].as_str().expect("_id").to_string(),
        body["token"].as_str().expect("token").to_string(),
    )
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}
