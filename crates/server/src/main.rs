//! crossborder-server: MPI bridge HTTP server binary entrypoint.

use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crossborder_server::AppState;
use crossborder_server::config::Config;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    // Load configuration
    let config = Config::from_env();

    let state = AppState::from_config(&config).expect("Failed to initialise application state");

    // Log startup info
    tracing::info!(mpi = %config.mpi.base_url, "MPI endpoint configured");
    if config.mpi.username.is_some() {
        tracing::info!("MPI basic authentication enabled");
    }
    match config.mpi.timeout {
        Some(timeout) => tracing::info!("MPI request timeout: {}s", timeout.as_secs()),
        None => tracing::warn!("No MPI request timeout configured (MPI_TIMEOUT_SECS)"),
    }
    tracing::info!(
        "Person attribute types: {}",
        config.person_attribute_types.join(", ")
    );
    if config.legacy_null_responses {
        tracing::info!("Facade failures answer null (LEGACY_NULL_RESPONSES)");
    }

    // Build application
    let app = crossborder_server::build_app(state, &config);

    // Start server
    let addr: SocketAddr = config.bind_address.parse().expect("Invalid bind address");
    tracing::info!("Starting cross-border server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();

    tracing::info!("Server shutdown complete");
}

/// Wait for shutdown signal (SIGTERM or SIGINT)
async fn shutdown_signal() {
    use tokio::signal;

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
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
