use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use trackmybugs_api::auth::HashingParams;
use trackmybugs_api::cli::Cli;
use trackmybugs_api::clock::SystemClock;
use trackmybugs_api::config::AppConfig;
use trackmybugs_api::database::DatabaseManager;
use trackmybugs_api::{app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("trackmybugs_api=info,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = AppConfig::from_env().context("failed to load configuration")?;
    if let Some(host) = cli.host {
        config.api.host = host;
    }
    if let Some(port) = cli.port {
        config.api.port = port;
    }
    tracing::info!("Starting TrackMyBugs API in {:?} mode", config.environment);
    tracing::debug!("Configuration: {}", serde_json::to_string(&config).unwrap_or_default());

    let pool = DatabaseManager::connect(&config.database).context("failed to configure database pool")?;
    let bind_addr = format!("{}:{}", config.api.host, config.api.port);
    let state = AppState::new(pool.clone(), config, Arc::new(SystemClock), HashingParams::default())
        .context("failed to initialise credentials")?;

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("TrackMyBugs API listening on http://{}", bind_addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    pool.close().await;
    tracing::info!("Shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
