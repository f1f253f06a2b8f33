//! # ScanPOS API Server
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        ScanPOS API Server                               │
//! │                                                                         │
//! │  POS client ───► HTTP (8080) ───► Services ───► SQLite                 │
//! │                                       │                                 │
//! │                                       ├──► payment gateway              │
//! │                                       └──► WhatsApp / email             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use scanpos_api::{build_app, AppConfig, AppState};
use scanpos_db::{Database, DbConfig};
use scanpos_gateway::{NotificationDispatcher, SimulatedGateway, SimulatedGatewayConfig};

const DEFAULT_LOG_FILTER: &str = "scanpos_api=info,scanpos_db=info,tower_http=info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_target(true)
        .init();

    info!("Starting ScanPOS API server...");

    // Load configuration
    let config = AppConfig::load().context("loading configuration")?;
    info!(
        port = config.http_port,
        database = %config.database_path,
        business = %config.business_name,
        "Configuration loaded"
    );

    // Open database (runs migrations)
    let db = Database::new(DbConfig::new(&config.database_path))
        .await
        .context("opening database")?;
    info!("Database ready");

    let gateway = SimulatedGateway::new(SimulatedGatewayConfig {
        key_id: config.payment_key_id.clone(),
        key_secret: config.payment_key_secret.clone(),
        upi_id: config.upi_id.clone(),
        business_name: config.business_name.clone(),
        currency_code: config.currency_code.clone(),
    });
    let dispatcher =
        NotificationDispatcher::logging(config.business_name.clone(), config.currency_symbol.clone())
            .with_send_timeout(config.gateway_timeout());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.http_port).parse()?;
    let state = AppState::new(config, Arc::new(db), Arc::new(gateway), Arc::new(dispatcher));
    let app = build_app(state);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    info!(%addr, "Starting HTTP server");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
