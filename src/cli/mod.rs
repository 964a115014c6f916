//! CLI module for accounts-server
//!
//! Provides command-line interface parsing and handling for the accounts-server binary.
//! Uses clap for argument parsing and owo-colors for colored terminal output.

pub mod init;
pub mod output;

use crate::utils::toml_config::{AccountsConfig, DatabaseConfig, StorageBackend};
use clap::{Parser, Subcommand};
use output::Output;
use std::path::PathBuf;

/// accounts-server - user accounts over HTTP
///
/// Registration, login, bearer-token authorization and profile management.
#[derive(Parser, Debug)]
#[command(
    name = "accounts-server",
    version,
    about = "User account service with JWT authentication",
    long_about = "User account service: registration with a profile image, login, bearer-token\n\
                  authorization and profile management over HTTP.\n\n\
                  Run without arguments to start the server, or use 'init' to scaffold a config.",
    after_help = "EXAMPLES:\n    \
                  accounts-server init              # Scaffold accounts.toml and .env.example\n    \
                  accounts-server                   # Start the server (requires accounts.toml)\n    \
                  accounts-server --config my.toml  # Use a custom config file\n    \
                  accounts-server config --validate # Check the configuration"
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "accounts.toml", global = true)]
    pub config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve,

    /// Scaffold accounts.toml and .env.example
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Overwrite existing files
        #[arg(short, long)]
        force: bool,

        /// Host address for the server
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port for the server
        #[arg(long, default_value = "8000")]
        port: u16,
    },

    /// Show configuration information
    Config {
        /// Validate the configuration file, including required env vars
        #[arg(long)]
        validate: bool,
    },
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Output helper honoring `--no-color`
    pub fn output(&self) -> Output {
        if self.no_color {
            Output::no_color()
        } else {
            Output::new()
        }
    }
}

/// Print the resolved configuration. Secrets are shown by env var name only.
pub fn show_config(config: &AccountsConfig, output: &Output) {
    output.header("Server");
    output.kv("host", &config.server.host);
    output.kv("port", &config.server.port.to_string());
    output.kv("log_level", &config.server.log_level);
    output.kv("log_format", &format!("{:?}", config.server.log_format));
    output.kv("max_upload_bytes", &config.server.max_upload_bytes.to_string());

    output.header("Auth");
    let secret_state = match config.resolve_env(&config.auth.jwt_secret_env) {
        Some(_) => "set",
        None => "missing",
    };
    output.kv(
        "jwt_secret_env",
        &format!("{} ({})", config.auth.jwt_secret_env, secret_state),
    );
    output.kv("token_ttl_secs", &config.auth.token_ttl_secs.to_string());
    output.kv(
        "argon2",
        &format!(
            "m={} t={} p={}",
            config.auth.password.memory_kib,
            config.auth.password.iterations,
            config.auth.password.parallelism
        ),
    );

    output.header("Database");
    match &config.database {
        DatabaseConfig::Memory => output.kv("provider", "memory"),
        DatabaseConfig::Sqlite { path } => {
            output.kv("provider", "sqlite");
            output.kv("path", path);
        }
        DatabaseConfig::Turso { url_env, token_env } => {
            output.kv("provider", "turso");
            output.kv("url_env", url_env);
            output.kv("token_env", token_env);
        }
    }

    output.header("Storage");
    match &config.storage.backend {
        StorageBackend::Memory => output.kv("provider", "memory"),
        StorageBackend::Local {
            root,
            public_base_url,
            serve_at,
        } => {
            output.kv("provider", "local");
            output.kv("root", root);
            output.kv("public_base_url", public_base_url);
            output.kv("serve_at", serve_at.as_deref().unwrap_or("(disabled)"));
        }
        StorageBackend::Http {
            upload_url,
            public_base_url,
            token_env,
        } => {
            output.kv("provider", "http");
            output.kv("upload_url", upload_url);
            output.kv("public_base_url", public_base_url);
            output.kv("token_env", token_env.as_deref().unwrap_or("(none)"));
        }
    }
    output.kv("folder", &config.storage.folder);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["accounts-server"]).unwrap();

        assert_eq!(cli.config, PathBuf::from("accounts.toml"));
        assert!(!cli.verbose);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_cli_init_args() {
        let cli = Cli::try_parse_from([
            "accounts-server",
            "init",
            "./svc",
            "--force",
            "--port",
            "9000",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Init {
                path, force, port, ..
            }) => {
                assert_eq!(path, PathBuf::from("./svc"));
                assert!(force);
                assert_eq!(port, 9000);
            }
            other => panic!("expected init, got {:?}", other),
        }
    }

    #[test]
    fn test_cli_global_config_after_subcommand() {
        let cli =
            Cli::try_parse_from(["accounts-server", "config", "--validate", "-c", "other.toml"])
                .unwrap();

        assert_eq!(cli.config, PathBuf::from("other.toml"));
        assert!(matches!(cli.command, Some(Commands::Config { validate: true })));
    }

    #[test]
    fn test_show_config_no_panic() {
        show_config(&AccountsConfig::default(), &Output::no_color());
    }
}
