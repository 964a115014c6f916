//! Database abstraction traits
//!
//! This module provides the `DatabaseClient` trait that abstracts over different
//! database backends (in-memory SQLite, file-based SQLite, remote Turso).
//!
//! # Example
//!
//! ```rust,ignore
//! use accounts::db::{DatabaseClient, DatabaseProvider};
//!
//! // Use in-memory database (default for development/testing)
//! let db = DatabaseProvider::Memory.create_client().await?;
//!
//! // Use file-based SQLite
//! let db = DatabaseProvider::SQLite { path: "data.db".into() }.create_client().await?;
//! ```

use crate::types::{ProfileUpdate, Result, User};
use crate::utils::toml_config::{AccountsConfig, DatabaseConfig};
use async_trait::async_trait;

/// Database provider configuration
#[derive(Debug, Clone, Default)]
pub enum DatabaseProvider {
    /// In-memory SQLite database (ephemeral, lost on restart)
    #[default]
    Memory,
    /// File-based SQLite database
    SQLite {
        /// Path to the SQLite database file
        path: String,
    },
    /// Remote Turso database (requires network access)
    #[cfg(feature = "turso")]
    Turso {
        /// The Turso database URL (e.g., `libsql://your-db.turso.io`)
        url: String,
        /// Authentication token for the Turso database
        auth_token: String,
    },
}

impl DatabaseProvider {
    /// Create a database client from this provider configuration
    pub async fn create_client(&self) -> Result<Box<dyn DatabaseClient>> {
        match self {
            DatabaseProvider::Memory => {
                let client = super::turso::TursoClient::new_memory().await?;
                Ok(Box::new(client))
            }
            DatabaseProvider::SQLite { path } => {
                let client = super::turso::TursoClient::new_local(path).await?;
                Ok(Box::new(client))
            }
            #[cfg(feature = "turso")]
            DatabaseProvider::Turso { url, auth_token } => {
                let client =
                    super::turso::TursoClient::new_remote(url.clone(), auth_token.clone()).await?;
                Ok(Box::new(client))
            }
        }
    }

    /// Resolve the provider named in the configuration
    pub fn from_config(config: &AccountsConfig) -> Result<Self> {
        match &config.database {
            DatabaseConfig::Memory => Ok(DatabaseProvider::Memory),
            DatabaseConfig::Sqlite { path } => Ok(DatabaseProvider::SQLite { path: path.clone() }),
            #[cfg(feature = "turso")]
            DatabaseConfig::Turso { url_env, token_env } => {
                let url = config.resolve_env(url_env).ok_or_else(|| {
                    crate::utils::toml_config::ConfigError::MissingEnvVar(url_env.clone())
                })?;
                let auth_token = config.resolve_env(token_env).ok_or_else(|| {
                    crate::utils::toml_config::ConfigError::MissingEnvVar(token_env.clone())
                })?;
                Ok(DatabaseProvider::Turso { url, auth_token })
            }
            #[cfg(not(feature = "turso"))]
            DatabaseConfig::Turso { .. } => Err(crate::types::AppError::Database(
                "database.provider = \"turso\" requires the `turso` feature".to_string(),
            )),
        }
    }
}

/// Abstract trait for account storage
///
/// Implementations must enforce email uniqueness themselves and report a
/// violation as [`AppError::DuplicateAccount`](crate::types::AppError::DuplicateAccount); callers rely on that rather
/// than on a check-then-insert.
#[async_trait]
pub trait DatabaseClient: Send + Sync {
    /// Insert a new user
    async fn create_user(&self, user: &User) -> Result<()>;

    /// Get a user by ID
    async fn get_user_by_id(&self, id: &str) -> Result<Option<User>>;

    /// Get a user by email
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// List every user, oldest first
    async fn list_users(&self) -> Result<Vec<User>>;

    /// Apply a partial update. Returns `false` if no such user exists.
    async fn update_user(&self, id: &str, update: &ProfileUpdate) -> Result<bool>;

    /// Delete a user. Returns `false` if no such user exists.
    async fn delete_user(&self, id: &str) -> Result<bool>;
}
