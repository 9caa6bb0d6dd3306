use anyhow::Result;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tinylink::config::Config;
use tinylink::storage::{MemoryStorage, Storage, Sweeper};
use tinylink::{api, redirect};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!("Loaded configuration");

    // Initialize storage
    let memory = Arc::new(MemoryStorage::new(config.store.clone()));
    info!(
        "In-memory link store ready (default TTL {} min, code length {})",
        config.store.default_ttl_minutes, config.store.code_length
    );

    let sweeper = config.sweep.as_ref().map(|sweep| {
        info!(
            "🧹 Expiry sweep every {}s, retaining expired links for {}s",
            sweep.interval.as_secs(),
            sweep.retention.num_seconds()
        );
        Sweeper::spawn(Arc::clone(&memory), sweep.interval, sweep.retention)
    });

    let storage: Arc<dyn Storage> = memory;

    // Create routers
    let api_router = api::create_api_router(Arc::clone(&storage), config.location_header.clone());
    let redirect_router =
        redirect::create_redirect_router(Arc::clone(&storage), config.location_header.clone());

    // Start API server
    let api_addr = format!("{}:{}", config.api_server.host, config.api_server.port);
    let api_listener = tokio::net::TcpListener::bind(&api_addr).await?;
    info!("🚀 API server listening on http://{}", api_addr);
    info!("   - API endpoints available at http://{}/api/...", api_addr);

    // Start redirect server
    let redirect_addr = format!(
        "{}:{}",
        config.redirect_server.host, config.redirect_server.port
    );
    let redirect_listener = tokio::net::TcpListener::bind(&redirect_addr).await?;
    info!("🚀 Redirect server listening on http://{}", redirect_addr);

    // Run both servers until Ctrl-C
    let result = tokio::try_join!(
        axum::serve(api_listener, api_router).with_graceful_shutdown(shutdown_signal()),
        axum::serve(redirect_listener, redirect_router).with_graceful_shutdown(shutdown_signal()),
    );

    if let Some(sweeper) = sweeper {
        sweeper.shutdown().await;
    }

    result?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
