//! TOML-based configuration for the accounts server
//!
//! All settings live in `accounts.toml`. Secrets are never written to the file;
//! the file names the environment variables that hold them.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::auth::jwt::{DEFAULT_TOKEN_TTL_SECS, MAX_TOKEN_TTL_SECS};

/// Root configuration structure loaded from accounts.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountsConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub storage: StorageConfig,
}

// ============= Server Configuration =============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Largest accepted request body, multipart uploads included
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_upload_bytes() -> usize {
    5 * 5 * 1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

// ============= Authentication Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Environment variable name containing the JWT secret
    #[serde(default = "default_jwt_secret_env")]
    pub jwt_secret_env: String,

    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: i64,

    #[serde(default)]
    pub password: PasswordConfig,
}

fn default_jwt_secret_env() -> String {
    "JWT_SECRET".to_string()
}

fn default_token_ttl_secs() -> i64 {
    DEFAULT_TOKEN_TTL_SECS
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret_env: default_jwt_secret_env(),
            token_ttl_secs: default_token_ttl_secs(),
            password: PasswordConfig::default(),
        }
    }
}

/// Argon2id work factor. Defaults follow the argon2 crate's recommendations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordConfig {
    #[serde(default = "default_memory_kib")]
    pub memory_kib: u32,

    #[serde(default = "default_iterations")]
    pub iterations: u32,

    #[serde(default = "default_parallelism")]
    pub parallelism: u32,
}

fn default_memory_kib() -> u32 {
    19 * 1024
}

fn default_iterations() -> u32 {
    2
}

fn default_parallelism() -> u32 {
    1
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            memory_kib: default_memory_kib(),
            iterations: default_iterations(),
            parallelism: default_parallelism(),
        }
    }
}

// ============= Database Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum DatabaseConfig {
    /// In-memory SQLite, lost on restart
    Memory,
    /// File-backed SQLite
    Sqlite {
        #[serde(default = "default_database_path")]
        path: String,
    },
    /// Remote Turso database (requires the `turso` feature)
    Turso {
        /// Environment variable for the Turso URL
        url_env: String,
        /// Environment variable for the Turso auth token
        token_env: String,
    },
}

fn default_database_path() -> String {
    "./data/accounts.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        DatabaseConfig::Sqlite {
            path: default_database_path(),
        }
    }
}

// ============= Storage Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(flatten)]
    pub backend: StorageBackend,

    /// Folder (key prefix) that profile images are stored under
    #[serde(default = "default_image_folder")]
    pub folder: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum StorageBackend {
    /// Keep uploads in process memory
    Memory,
    /// Write uploads to a local directory
    Local {
        #[serde(default = "default_storage_root")]
        root: String,

        /// Base URL the stored files are reachable at
        public_base_url: String,

        /// Mount point for serving `root` from this server; unset disables serving
        #[serde(default)]
        serve_at: Option<String>,
    },
    /// PUT uploads to an object-storage endpoint
    Http {
        upload_url: String,
        public_base_url: String,

        /// Environment variable holding a bearer token for the endpoint
        #[serde(default)]
        token_env: Option<String>,
    },
}

fn default_image_folder() -> String {
    "Users".to_string()
}

fn default_storage_root() -> String {
    "./data/uploads".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Local {
                root: default_storage_root(),
                public_base_url: "http://127.0.0.1:8000/uploads".to_string(),
                serve_at: Some("/uploads".to_string()),
            },
            folder: default_image_folder(),
        }
    }
}

// ============= Configuration Loading & Validation =============

/// Errors that can occur during configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Environment variable '{0}' referenced in config is not set")]
    MissingEnvVar(String),
}

impl AccountsConfig {
    /// Load and validate configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: AccountsConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate value ranges. Environment variables are resolved lazily.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.max_upload_bytes == 0 {
            return Err(ConfigError::ValidationError(
                "server.max_upload_bytes must be greater than zero".to_string(),
            ));
        }

        if self.auth.token_ttl_secs <= 0 {
            return Err(ConfigError::ValidationError(
                "auth.token_ttl_secs must be greater than zero".to_string(),
            ));
        }

        if self.auth.token_ttl_secs > MAX_TOKEN_TTL_SECS {
            return Err(ConfigError::ValidationError(format!(
                "auth.token_ttl_secs must be at most {} (10 years)",
                MAX_TOKEN_TTL_SECS
            )));
        }

        if self.auth.jwt_secret_env.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "auth.jwt_secret_env must name an environment variable".to_string(),
            ));
        }

        let password = &self.auth.password;
        if password.iterations == 0 || password.parallelism == 0 {
            return Err(ConfigError::ValidationError(
                "auth.password.iterations and auth.password.parallelism must be at least 1"
                    .to_string(),
            ));
        }
        if password.memory_kib < 8 * password.parallelism {
            return Err(ConfigError::ValidationError(format!(
                "auth.password.memory_kib must be at least {} for parallelism {}",
                8 * password.parallelism,
                password.parallelism
            )));
        }

        if let DatabaseConfig::Sqlite { path } = &self.database {
            if path.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "database.path cannot be empty".to_string(),
                ));
            }
        }

        if self.storage.folder.contains("..") || self.storage.folder.trim_matches('/').is_empty()
        {
            return Err(ConfigError::ValidationError(format!(
                "storage.folder is not a valid folder name: '{}'",
                self.storage.folder
            )));
        }

        match &self.storage.backend {
            StorageBackend::Memory => {}
            StorageBackend::Local {
                root,
                public_base_url,
                serve_at,
            } => {
                if root.trim().is_empty() || public_base_url.trim().is_empty() {
                    return Err(ConfigError::ValidationError(
                        "storage.root and storage.public_base_url are required for local storage"
                            .to_string(),
                    ));
                }
                if let Some(mount) = serve_at {
                    if !mount.starts_with('/') || mount == "/" {
                        return Err(ConfigError::ValidationError(format!(
                            "storage.serve_at must be a sub-path such as /uploads (got '{}')",
                            mount
                        )));
                    }
                }
            }
            StorageBackend::Http {
                upload_url,
                public_base_url,
                ..
            } => {
                if !upload_url.starts_with("http://") && !upload_url.starts_with("https://") {
                    return Err(ConfigError::ValidationError(format!(
                        "storage.upload_url must be an http(s) URL (got '{}')",
                        upload_url
                    )));
                }
                if public_base_url.trim().is_empty() {
                    return Err(ConfigError::ValidationError(
                        "storage.public_base_url is required for http storage".to_string(),
                    ));
                }
            }
        }

        Ok(())
    }

    /// Get a resolved value from an env var reference
    pub fn resolve_env(&self, env_name: &str) -> Option<String> {
        std::env::var(env_name).ok().filter(|value| !value.is_empty())
    }

    /// Get the JWT secret from the environment
    pub fn jwt_secret(&self) -> Result<String, ConfigError> {
        self.resolve_env(&self.auth.jwt_secret_env)
            .ok_or_else(|| ConfigError::MissingEnvVar(self.auth.jwt_secret_env.clone()))
    }

    /// Token lifetime as a duration, capped at [`MAX_TOKEN_TTL_SECS`]
    pub fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.auth.token_ttl_secs.min(MAX_TOKEN_TTL_SECS))
    }
}
