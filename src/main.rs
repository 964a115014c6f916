use accounts::{
    api::routes::create_app,
    cli::{
        init::{self, InitConfig, InitResult},
        show_config, Cli, Commands,
    },
    utils::toml_config::LogFormat,
    AccountsConfig, AppState,
};
use anyhow::Context;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables from .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse_args();
    let output = cli.output();

    match &cli.command {
        Some(Commands::Init {
            path,
            force,
            host,
            port,
        }) => {
            let config = InitConfig {
                path: path.clone(),
                force: *force,
                host: host.clone(),
                port: *port,
            };
            match init::run(config, &output) {
                InitResult::Success => ExitCode::SUCCESS,
                InitResult::AlreadyExists | InitResult::Error(_) => ExitCode::FAILURE,
            }
        }
        Some(Commands::Config { validate }) => {
            let config = match AccountsConfig::load(&cli.config) {
                Ok(config) => config,
                Err(e) => {
                    output.error(&format!("{}: {}", cli.config.display(), e));
                    return ExitCode::FAILURE;
                }
            };

            if *validate {
                if let Err(e) = config.jwt_secret() {
                    output.error(&e.to_string());
                    return ExitCode::FAILURE;
                }
                output.success("Configuration is valid");
            }

            show_config(&config, &output);
            ExitCode::SUCCESS
        }
        Some(Commands::Serve) | None => match serve(&cli).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                output.error(&format!("{:#}", e));
                ExitCode::FAILURE
            }
        },
    }
}

async fn serve(cli: &Cli) -> anyhow::Result<()> {
    let config = AccountsConfig::load(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;

    init_tracing(&config, cli.verbose);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::from_config(config)
        .await
        .context("failed to initialize application state")?;

    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

fn init_tracing(config: &AccountsConfig, verbose: bool) {
    let default_filter = if verbose {
        "debug".to_string()
    } else {
        format!("{},tower_http=info", config.server.log_level)
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let registry = tracing_subscriber::registry().with(filter);
    match config.server.log_format {
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        // Without a signal handler, run until killed
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
