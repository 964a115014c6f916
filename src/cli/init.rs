//! Init command implementation
//!
//! Scaffolds `accounts.toml`, a `.env.example` with a freshly generated JWT
//! secret, the data directories and a `.gitignore`.

use super::output::Output;
use std::fs;
use std::path::{Path, PathBuf};

/// Result of the init operation
pub enum InitResult {
    /// Initialization completed successfully
    Success,
    /// Project already exists (accounts.toml found)
    AlreadyExists,
    /// An error occurred during initialization
    Error(String),
}

/// Configuration for the init command
pub struct InitConfig {
    /// Directory to initialize
    pub path: PathBuf,
    /// Overwrite existing files
    pub force: bool,
    /// Host address for the server
    pub host: String,
    /// Port for the server
    pub port: u16,
}

/// Run the init command
pub fn run(config: InitConfig, output: &Output) -> InitResult {
    output.banner();
    output.header("Initializing accounts-server");

    let base_path = &config.path;

    let config_path = base_path.join("accounts.toml");
    if config_path.exists() && !config.force {
        output.warning("accounts.toml already exists!");
        output.hint("Use --force to overwrite existing files");
        return InitResult::AlreadyExists;
    }

    for dir in ["data", "data/uploads"] {
        let dir_path = base_path.join(dir);
        if dir_path.exists() {
            output.skipped(dir, "already exists");
            continue;
        }
        if let Err(e) = fs::create_dir_all(&dir_path) {
            output.error(&format!("Failed to create {}: {}", dir, e));
            return InitResult::Error(e.to_string());
        }
        output.created("directory", dir);
    }

    let toml_content = generate_accounts_toml(&config);
    if let Err(e) = write_file(&config_path, &toml_content, config.force) {
        output.error(&format!("Failed to create accounts.toml: {}", e));
        return InitResult::Error(e.to_string());
    }
    output.created("config", "accounts.toml");

    let env_example_path = base_path.join(".env.example");
    if let Err(e) = write_file(&env_example_path, &generate_env_example(), config.force) {
        output.error(&format!("Failed to create .env.example: {}", e));
        return InitResult::Error(e.to_string());
    }
    output.created("env", ".env.example");

    let gitignore_path = base_path.join(".gitignore");
    if !gitignore_path.exists() {
        if let Err(e) = write_file(&gitignore_path, GITIGNORE, false) {
            output.warning(&format!("Failed to create .gitignore: {}", e));
        } else {
            output.created("file", ".gitignore");
        }
    }

    output.complete("accounts-server initialized successfully!");

    output.header("Next Steps");
    output.newline();
    output.info("1. Set up environment variables:");
    output.command("cp .env.example .env");
    output.newline();
    output.info("2. Start the server:");
    output.command("accounts-server");

    output.hint(&format!(
        "Server will be available at http://{}:{}",
        config.host, config.port
    ));
    output.hint("OpenAPI document at /api-docs/openapi.json");

    InitResult::Success
}

fn write_file(path: &Path, content: &str, force: bool) -> std::io::Result<()> {
    if path.exists() && !force {
        return Ok(());
    }
    fs::write(path, content)
}

fn generate_accounts_toml(config: &InitConfig) -> String {
    format!(
        r#"# accounts-server configuration
# Secrets are read from the environment variables named here, never from this file.

[server]
host = "{host}"
port = {port}
log_level = "info"
log_format = "pretty"      # or "json"
max_upload_bytes = 26214400

[auth]
jwt_secret_env = "JWT_SECRET"
token_ttl_secs = 2592000   # 30 days

[auth.password]
memory_kib = 19456
iterations = 2
parallelism = 1

[database]
provider = "sqlite"        # "memory" | "sqlite" | "turso"
path = "./data/accounts.db"

[storage]
provider = "local"         # "memory" | "local" | "http"
root = "./data/uploads"
public_base_url = "http://{host}:{port}/uploads"
serve_at = "/uploads"
folder = "Users"
"#,
        host = config.host,
        port = config.port,
    )
}

/// Random 256-bit secret, hex encoded.
fn generate_secret() -> String {
    hex::encode(rand::random::<[u8; 32]>())
}

fn generate_env_example() -> String {
    format!(
        r#"# accounts-server environment variables
# Copy this file to .env and adjust.

# REQUIRED: HS256 signing secret (at least 32 bytes)
JWT_SECRET={secret}

# Optional: logging filter, overrides server.log_level
RUST_LOG=info,accounts=debug

# Optional: Turso cloud database (database.provider = "turso")
# TURSO_URL=libsql://your-db.turso.io
# TURSO_AUTH_TOKEN=your-token

# Optional: bearer token for storage.provider = "http"
# STORAGE_TOKEN=your-token
"#,
        secret = generate_secret()
    )
}

const GITIGNORE: &str = r#"/data/
*.db
*.db-journal

.env
.env.local

/target/
"#;
