use anyhow::{Context, Result};
use clap::Parser;

use loan_lifecycle_rs::config::ServerConfig;
use loan_lifecycle_rs::http::{router, AppState};
use loan_lifecycle_rs::lifecycle::LoanLifecycleService;
use loan_lifecycle_rs::store::Stores;
use loan_lifecycle_rs::telemetry::init_tracing;
use loan_lifecycle_rs::{SafeTimeProvider, TimeSource};

#[tokio::main]
async fn main() -> Result<()> {
    let config = ServerConfig::parse();
    init_tracing().context("failed to install tracing subscriber")?;

    let stores = Stores::connect(&config.database_url, config.max_connections)
        .await
        .with_context(|| format!("failed to open {}", config.database_url))?;

    let service = LoanLifecycleService::new(
        stores,
        config.lending_config(),
        SafeTimeProvider::new(TimeSource::System),
    )?;
    let app = router(AppState::new(service));

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    tracing::info!(addr = %config.bind, "lending api listening");

    axum::serve(listener, app).await?;
    Ok(())
}
