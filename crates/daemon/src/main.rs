//! Reportflow Daemon - Main Entry Point
//! HTTP facade + SQLite task store + worker queue client

mod config;
mod telemetry;

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use reportflow_api_http::{AppState, HttpServer};
use reportflow_core::port::time_provider::SystemTimeProvider;
use reportflow_infra_fal::FalQueueClient;
use reportflow_infra_sqlite::{
    create_pool_with_max, run_migrations, SqliteAnalysisRepository, SqliteJobRepository,
};

use crate::config::Settings;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize logging (flushes on drop)
    let _log_guard = telemetry::init().context("Failed to initialize logging")?;

    info!("Reportflow daemon v{} starting...", VERSION);

    // 2. Load configuration
    let settings = Settings::load()?;
    info!(
        host = %settings.server.host,
        port = settings.server.port,
        database = %settings.database.url,
        worker = %settings.worker.base_url,
        pdf_app = %settings.worker.pdf_app,
        analysis_app = %settings.worker.analysis_app,
        api_key_set = settings.worker.api_key.is_some(),
        "Configuration loaded"
    );

    // 3. Initialize database
    let pool = create_pool_with_max(&settings.database.url, settings.database.max_connections)
        .await
        .context("DB pool creation failed")?;
    run_migrations(&pool).await.context("Migration failed")?;

    // 4. Setup dependencies (DI wiring)
    let time_provider = Arc::new(SystemTimeProvider);
    let job_repo = Arc::new(SqliteJobRepository::new(pool.clone()));
    let analysis_repo = Arc::new(SqliteAnalysisRepository::new(pool.clone()));
    let worker = Arc::new(
        FalQueueClient::new(settings.fal()).context("Worker client creation failed")?,
    );

    let state = AppState::new(job_repo, analysis_repo, worker, time_provider);

    // 5. Start HTTP server
    let server = HttpServer::new(settings.http_server(), state);
    let listener = server
        .bind()
        .await
        .with_context(|| format!("Failed to bind {}:{}", settings.server.host, settings.server.port))?;

    info!("System ready. Press Ctrl+C to shutdown");

    server.serve(listener, shutdown_signal()).await?;

    // 6. Graceful shutdown
    pool.close().await;
    info!("Shutdown complete.");

    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received. Draining in-flight requests..."),
        Err(e) => tracing::error!(error = %e, "Failed to listen for shutdown signal"),
    }
}
