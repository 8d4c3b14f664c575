//! Catering Dashboard
//!
//! Role-based dashboards for a catering business over an external REST backend.

use catering_dashboard::{api, backend, bus, config, routes};

use anyhow::Result;
use catering_dashboard::config::BackendMode;
use std::net::SocketAddr;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "catering_dashboard=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Starting Catering Dashboard v{} ({})",
        env!("CATERING_VERSION"),
        env!("CATERING_GIT_SHA")
    );

    // Load configuration
    let config = config::load_config()?;
    tracing::info!("Configuration loaded, port: {}", config.port);

    // Create event bus
    let bus = bus::create_bus();
    tracing::info!("Event bus initialized");

    let display = config.display_format();
    let state = match config.backend_mode()? {
        BackendMode::Demo => {
            let demo = backend::DemoBackend::new();
            let accounts = demo.demo_accounts().await;
            tracing::info!(
                "Demo mode: {} seeded accounts, password \"{}\"",
                accounts.len(),
                backend::demo::DEMO_PASSWORD
            );
            api::AppState::new(demo, bus.clone(), display, true).with_demo_accounts(accounts)
        }
        BackendMode::Http { base_url, timeout } => {
            let http = backend::HttpBackend::new(&base_url, timeout)?;
            tracing::info!("Using REST backend at {}", base_url);
            api::AppState::new(http, bus.clone(), display, false)
        }
    };

    let app = routes::build_router(state);

    // Start server with graceful shutdown
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
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
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down..."),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down..."),
    }
}
