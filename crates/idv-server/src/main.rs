//! IDV Server — Application entry point.

use std::sync::Arc;

use idv_db::{DbManager, SurrealRecordStore};
use idv_server::ServerConfig;
use idv_verify::{FsBlobStore, VerificationService};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    if let Err(e) = run().await {
        error!(error = %e, "IDV server failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    info!("Starting IDV server...");

    let config = ServerConfig::load()?;

    let manager = DbManager::connect(&config.db).await?;
    idv_db::run_migrations(manager.client()).await?;

    let blobs = FsBlobStore::open(&config.verify.storage_dir).await?;
    let store = SurrealRecordStore::new(manager.clone());
    let service = Arc::new(VerificationService::new(store, blobs, config.verify.clone()));
    let app = idv_server::http::router(service, &config.cors_origins);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!(addr = %config.bind_addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    manager.shutdown();
    info!("IDV server stopped.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }
}
