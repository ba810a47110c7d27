use anyhow::Context;
use clap::Parser;
use disaster_response::{
    api::{build_router, AppState},
    config::Config,
    telemetry::init_tracing,
};
use std::path::PathBuf;

/// Web dashboard and message classifier
#[derive(Parser, Debug)]
#[command(name = "disaster-response", version, about, long_about = None)]
struct Cli {
    /// TOML configuration file (otherwise DRP_CONFIG)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bind address
    #[arg(long)]
    host: Option<String>,

    /// Bind port
    #[arg(short, long)]
    port: Option<u16>,

    /// SQLite database written by process-data
    #[arg(long)]
    database: Option<PathBuf>,

    /// Model file written by train-classifier
    #[arg(long)]
    model: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(database) = cli.database {
        config.storage.database_path = database;
    }
    if let Some(model) = cli.model {
        config.model.model_path = model;
    }

    init_tracing(&config.logging);
    tracing::info!("Starting Disaster Response v{}", env!("CARGO_PKG_VERSION"));

    // Load table and model once; no reload while running
    let state = AppState::load(&config).context("Failed to initialize application state")?;
    tracing::info!(
        messages = state.dataset.len(),
        categories = state.dataset.schema.len(),
        "Application state ready"
    );

    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("HTTP server listening on http://{}", addr);
    tracing::info!("   Dashboard: http://{}/", addr);
    tracing::info!("   Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
