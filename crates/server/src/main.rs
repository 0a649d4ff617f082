use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use flexorch_core::{load_config, validate_config, Config};
use flexorch_server::api::create_router;
use flexorch_server::cli::{Cli, Commands, LogFormat};
use flexorch_server::state::{build_orchestrator, AppState};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    if let Err(e) = run(cli).await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

/// Logs go to stderr so stdout only carries command output.
fn init_tracing(format: LogFormat) {
    let (text, json) = match format {
        LogFormat::Text => (Some(fmt::layer().with_writer(std::io::stderr)), None),
        LogFormat::Json => (
            None,
            Some(fmt::layer().json().with_writer(std::io::stderr)),
        ),
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info,tower_http=debug".into()))
        .with(text)
        .with(json)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config_path();

    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    validate_config(&config).context("Configuration validation failed")?;
    info!("Database path: {:?}", config.database.path);

    match cli.command {
        Commands::Run { trigger, location } => {
            let trigger = trigger.into_trigger(location).context("Invalid trigger")?;
            let orchestrator = build_orchestrator(&config);
            let outcome = orchestrator.run(&trigger).await?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        Commands::Aggregate { trigger } => {
            let trigger = trigger.into_trigger(None).context("Invalid trigger")?;
            let orchestrator = build_orchestrator(&config);
            let configs = orchestrator.aggregate(&trigger)?;
            println!("{}", serde_json::to_string_pretty(&configs)?);
        }
        Commands::Serve => serve(config).await?,
    }

    Ok(())
}

async fn serve(config: Config) -> Result<()> {
    if config.preprocess.is_none() || config.launcher.is_none() {
        bail!("serve requires both [preprocess] and [launcher] sections");
    }

    let orchestrator = build_orchestrator(&config);
    let addr = SocketAddr::new(config.server.host, config.server.port);
    let state = Arc::new(AppState::new(config, orchestrator));

    let app = create_router(state);

    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
