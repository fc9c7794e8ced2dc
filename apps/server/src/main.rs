//! # Loantrack Server
//!
//! ## Usage
//! ```bash
//! # Defaults: 127.0.0.1:8080, database in the platform data dir
//! cargo run -p loantrack-server
//!
//! # Explicit config file
//! cargo run -p loantrack-server -- --config ./loantrack.toml
//!
//! # Verbose logging
//! RUST_LOG=debug cargo run -p loantrack-server
//! ```

use std::path::PathBuf;

use loantrack_db::{Database, DbConfig};
use loantrack_server::{build_app, AppState, ServerConfig};
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "info,loantrack=debug,sqlx=warn";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing, RUST_LOG wins over the default filter
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_target(true)
        .init();

    info!("Starting Loantrack server...");

    let config = ServerConfig::load(config_path_arg())?;
    let db_path = config.database_path();
    info!(
        bind_addr = %config.server.bind_addr,
        db_path = %db_path.display(),
        "Configuration loaded"
    );

    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let db = Database::new(
        DbConfig::new(&db_path).max_connections(config.database.max_connections),
    )
    .await?;

    let state = AppState::new(db.clone(), &config.loans.default_borrower_id);

    // A failed first load is retried on the first dashboard request
    if let Err(e) = state.session().refresh().await {
        warn!(error = %e, "Initial dashboard load failed");
    }

    let app = build_app(state);

    let addr = config.bind_addr()?;
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// `--config <path>` / `-c <path>`
fn config_path_arg() -> Option<PathBuf> {
    let args: Vec<String> = std::env::args().collect();
    args.iter()
        .position(|arg| arg == "--config" || arg == "-c")
        .and_then(|i| args.get(i + 1))
        .map(PathBuf::from)
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
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

    info!("Shutdown signal received, starting graceful shutdown...");
}
