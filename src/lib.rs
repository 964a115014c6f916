//! # accounts-server
//!
//! A user-account service built on axum: registration with a profile image,
//! credential verification, bearer-token authorization and profile
//! retrieval, update and deletion.
//!
//! ## Overview
//!
//! The crate can be used in two ways:
//!
//! 1. **As a standalone server** - Run the `accounts-server` binary
//! 2. **As a library** - Embed the router in your own axum application
//!
//! ### Embedding the Router
//!
//! ```rust,ignore
//! use accounts::{api::routes::create_app, AccountsConfig, AppState};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = AccountsConfig::load("accounts.toml")?;
//!     let state = AppState::from_config(config).await?;
//!
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:8000").await?;
//!     axum::serve(listener, create_app(state)).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `turso` | Remote Turso database |
//! | `swagger-ui` | Interactive API docs at `/swagger-ui/` |
//!
//! ## Modules
//!
//! - [`accounts`] - Registration, login and profile workflows
//! - [`api`] - REST API handlers and routes
//! - [`auth`] - Password hashing, JWT issuance and the request gate
//! - [`db`] - Account storage (SQLite, Turso)
//! - [`storage`] - Blob storage for profile images
//! - [`types`] - Common types and error handling
//! - [`utils`] - Configuration loading

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rustdoc::missing_crate_level_docs)]

/// Account workflows.
pub mod accounts;
/// HTTP API handlers and routes.
pub mod api;
/// Password hashing, tokens and the auth gate.
pub mod auth;
/// Command-line interface for the server binary.
pub mod cli;
/// Account record storage.
pub mod db;
/// Blob storage for uploaded images.
pub mod storage;
/// Core types and errors.
pub mod types;
/// Configuration utilities.
pub mod utils;

pub use accounts::AccountService;
pub use db::{DatabaseClient, TursoClient};
pub use types::{AppError, Result};
pub use utils::toml_config::AccountsConfig;

use crate::auth::jwt::TokenService;
use crate::auth::password::PasswordHasher;
use crate::db::DatabaseProvider;
use crate::storage::BlobStore;
use std::sync::Arc;

/// Secrets shorter than this are accepted with a warning.
const RECOMMENDED_SECRET_LEN: usize = 32;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Resolved configuration
    pub config: Arc<AccountsConfig>,
    /// Account record store
    pub db: Arc<dyn DatabaseClient>,
    /// Token issuance and verification
    pub tokens: Arc<TokenService>,
    /// Account workflows
    pub accounts: Arc<AccountService>,
}

impl AppState {
    /// Wire the state from already-built collaborators.
    pub fn from_parts(
        config: AccountsConfig,
        db: Arc<dyn DatabaseClient>,
        blobs: Arc<dyn BlobStore>,
        hasher: PasswordHasher,
        tokens: Arc<TokenService>,
    ) -> Self {
        let accounts = AccountService::new(db.clone(), blobs, hasher, tokens.clone())
            .with_image_folder(config.storage.folder.clone());

        Self {
            config: Arc::new(config),
            db,
            tokens,
            accounts: Arc::new(accounts),
        }
    }

    /// Build every collaborator named by the configuration.
    pub async fn from_config(config: AccountsConfig) -> Result<Self> {
        let secret = config.jwt_secret()?;
        if secret.len() < RECOMMENDED_SECRET_LEN {
            tracing::warn!(
                length = secret.len(),
                "JWT secret is shorter than {} bytes",
                RECOMMENDED_SECRET_LEN
            );
        }
        let tokens = Arc::new(TokenService::new(&secret, config.token_ttl()));

        let hasher = PasswordHasher::from_config(&config.auth.password)?;

        let db: Arc<dyn DatabaseClient> = DatabaseProvider::from_config(&config)?
            .create_client()
            .await?
            .into();

        let blobs = storage::create_blob_store(&config)?;

        tracing::info!(
            database = ?config.database,
            image_folder = %config.storage.folder,
            "Application state initialized"
        );

        Ok(Self::from_parts(config, db, blobs, hasher, tokens))
    }
}
