//! scinet-api - article submission ingestion service
//!
//! Startup: parse arguments, load TOML bootstrap config, initialize tracing,
//! resolve the root folder, open the database and raw payload store, then
//! serve until Ctrl+C or SIGTERM.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use scinet_api::{build_router, AppState};
use scinet_common::config::{default_config_path, resolve_root_folder, RootFolder, TomlConfig};

/// Command-line arguments for scinet-api
#[derive(Parser, Debug)]
#[command(name = "scinet-api")]
#[command(about = "Article submission ingestion service")]
#[command(version)]
struct Args {
    /// Root folder holding the database and raw payloads
    #[arg(short, long)]
    root_folder: Option<PathBuf>,

    /// TOML config file
    #[arg(short, long, env = "SCINET_CONFIG")]
    config: Option<PathBuf>,

    /// Interface to bind
    #[arg(long, env = "SCINET_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "SCINET_PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = args.config.clone().or_else(default_config_path);
    let loaded = match &config_path {
        Some(path) => TomlConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => None,
    };
    let config_found = loaded.is_some();
    let config = loaded.unwrap_or_default();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting SciNet ingestion API (scinet-api) v{}", env!("CARGO_PKG_VERSION"));
    match &config_path {
        Some(path) if config_found => info!("Config file: {}", path.display()),
        Some(path) => warn!("No config file at {}, using defaults", path.display()),
        None => warn!("No config directory available, using defaults"),
    }

    let root = RootFolder::new(resolve_root_folder(args.root_folder.as_deref(), &config), &config);
    info!("Root folder: {}", root.root().display());
    info!("Database path: {}", root.database_path().display());
    info!("Raw payload directory: {}", root.raw_payload_path().display());

    let state = AppState::open(&root)
        .await
        .context("Failed to open storage")?
        .with_max_body_bytes(config.max_body_bytes);
    info!("Request body limit: {} bytes", config.max_body_bytes);
    let pool = state.db.clone();

    let app = build_router(state);

    let host = args.host.unwrap_or(config.host);
    let port = args.port.unwrap_or(config.port);
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", host, port))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("scinet-api listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    pool.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
