//! Snapfeed API Server
//!
//! Main entry point for the Snapfeed backend service.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use snapfeed_api::{AppState, create_router};
use snapfeed_core::storage;
use snapfeed_db::{connect_with, migrate};
use snapfeed_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "snapfeed=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let db = connect_with(&config.database).await?;
    info!("Connected to database");

    if config.database.run_migrations {
        migrate(&db).await?;
        info!("Migrations applied");
    }

    let blob_store = storage::from_settings(&config.storage)?;
    info!(provider = blob_store.provider_name(), "Blob store configured");

    let staging_dir = config.upload.staging_dir();
    tokio::fs::create_dir_all(&staging_dir)
        .await
        .with_context(|| format!("Failed to create staging dir {}", staging_dir.display()))?;
    info!(
        staging_dir = %staging_dir.display(),
        folder = %config.upload.folder,
        max_body_bytes = config.upload.max_body_bytes,
        "Upload pipeline configured"
    );

    let state = AppState {
        db: Arc::new(db),
        storage: blob_store,
        upload: Arc::new(config.upload.clone()),
    };

    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
