//! DocRelay Server: document viewing presence and notification relay
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use docrelay_core::config::AppConfig;
use docrelay_core::error::AppError;
use docrelay_database::Stores;
use docrelay_directory::{CachedDirectory, DirectoryLookup, KeycloakDirectory};
use docrelay_realtime::RealtimeEngine;

/// Command-line options.
#[derive(Debug, Parser)]
#[command(name = "docrelay-server", version, about = "Document presence and notification relay")]
struct Cli {
    /// Configuration overlay to apply on top of `default.toml`
    /// (falls back to `DOCRELAY_ENV`, then `development`).
    #[arg(long)]
    env: Option<String>,

    /// Directory holding the TOML configuration files.
    #[arg(long, default_value = "config")]
    config_dir: String,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_configuration(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from files and environment
fn load_configuration(cli: &Cli) -> Result<AppConfig, AppError> {
    let env = cli
        .env
        .clone()
        .or_else(|| std::env::var("DOCRELAY_ENV").ok())
        .unwrap_or_else(|| "development".to_string());

    AppConfig::load_from(&cli.config_dir, &env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    if config.logging.is_json() {
        fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt().pretty().with_env_filter(filter).with_target(true).init();
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting DocRelay v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Stores (PostgreSQL + migrations, or memory) ──────
    let stores = Stores::connect(&config.database).await?;

    // ── Step 2: Identity directory ───────────────────────────────
    let keycloak: Arc<dyn DirectoryLookup> = Arc::new(KeycloakDirectory::new(&config.directory)?);
    let directory: Arc<dyn DirectoryLookup> = Arc::new(CachedDirectory::new(
        keycloak,
        Duration::from_secs(config.directory.admin_cache_ttl_seconds),
    ));
    tracing::info!(
        base_url = %config.directory.base_url,
        realm = %config.directory.realm,
        "Directory configured"
    );

    // ── Step 3: Realtime engine + push dispatcher ────────────────
    let realtime = RealtimeEngine::new(
        config.realtime.clone(),
        &stores,
        directory,
        &config.directory.admin_role,
    );

    // ── Step 4: HTTP server ──────────────────────────────────────
    let addr = config.server.bind_address();
    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    let state = docrelay_api::AppState::new(config, stores.clone(), realtime.clone());
    let app = docrelay_api::build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("DocRelay server listening on {}", addr);

    let (stop_tx, mut stop_rx) = tokio::sync::watch::channel(false);
    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = stop_rx.changed().await;
            })
            .await
    });

    // ── Step 5: Graceful shutdown ────────────────────────────────
    tokio::select! {
        _ = shutdown_signal() => {
            tracing::info!("Shutdown signal received, closing connections...");
        }
        result = &mut server => {
            return match result {
                Ok(Ok(())) => Ok(()),
                Ok(Err(e)) => Err(AppError::internal(format!("Server error: {e}"))),
                Err(e) => Err(AppError::internal(format!("Server task failed: {e}"))),
            };
        }
    }

    // One grace budget: flush queued pushes to open sockets, then close them.
    let deadline = tokio::time::Instant::now() + grace;
    realtime.drain_pushes(grace).await;
    realtime.shutdown();
    let _ = stop_tx.send(true);

    match tokio::time::timeout_at(deadline, server).await {
        Ok(Ok(Ok(()))) => {}
        Ok(Ok(Err(e))) => tracing::error!("Server error during shutdown: {}", e),
        Ok(Err(e)) => tracing::error!("Server task failed: {}", e),
        Err(_) => tracing::warn!(grace_seconds = grace.as_secs(), "Graceful shutdown timed out"),
    }

    stores.close().await;

    tracing::info!("DocRelay server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
