//! # Shopfront RS
//!
//! Minimal shop backend: accounts, bearer tokens and a product catalog.
//!
//! ## Usage
//!
//! ```bash
//! # Set environment variables
//! export JWT_SECRET=change-me
//! export LOCAL=true                  # SQLite at ./shop.db
//! # or POSTGRES_USER/PASSWORD/HOST/PORT/DB for PostgreSQL
//!
//! # Run the server
//! shopfront
//! ```

use shop_api::{routes, state::AppConfig, AppState};
use tokio::signal;
use tracing::{error, info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;

    // Initialize logging
    let filter = EnvFilter::builder()
        .with_default_directive(Level::INFO.into())
        .from_env_lossy();
    if config.is_production() {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .init();
    }

    // Print banner
    print_banner();

    let addr = config.socket_addr()?;
    let is_prod = config.is_production();

    info!("Environment: {}", config.environment);
    info!("Configuration: {:?}", config);

    // Initialize application state
    let state = AppState::from_config(config).await?;
    info!("Identity provider: {}", state.identity.provider_name());

    let db = state.db.clone();

    // Create router
    let app = routes::create_router(state);

    // Start server
    info!("🛒 Shopfront starting on http://{}", addr);

    if !is_prod {
        info!("📝 Health: http://{}/health", addr);
        info!("🔑 Login: POST http://{}/login", addr);
        info!("📦 Products: http://{}/products/", addr);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Shopfront stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
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

    info!("Shutdown signal received");
}

fn print_banner() {
    println!(
        r#"
  🛒 Shopfront RS 🛒
  ━━━━━━━━━━━━━━━━━━━
  Minimal shop backend
  Version: {}

"#,
        env!("CARGO_PKG_VERSION")
    );
}
