//! Storage gateway - JSON front end for cloud object stores
//!
//! A single endpoint selects one of list, delete, upload, mkdir or domain
//! through the `operate` query parameter, forwards it to the configured
//! object store and answers with a uniform JSON envelope.

mod config;
mod envelope;
mod errors;
mod gateway;
mod metrics;
mod routes;
mod server;
mod storage;

use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::gateway::Gateway;
use crate::server::Server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from environment and optional config file
    let config = Config::from_env()?;

    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .context("invalid log level")?;
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    metrics::init_metrics().context("failed to register metrics")?;

    info!(?config, "Starting storage gateway");
    if config.domain.is_empty() {
        warn!("No public domain configured; upload URLs will be bare paths");
    }

    let storage = storage::create_backend(&config.backend)?;
    info!(backend = ?config.backend.backend_type, "Storage backend initialized");

    let gateway = Arc::new(
        Gateway::new(storage, config.domain.clone())
            .with_timeout(Duration::from_secs(config.server.timeout_secs)),
    );
    let server = Server::new(config, gateway);

    // Handle graceful shutdown
    let shutdown_signal = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received shutdown signal"),
            Err(e) => {
                error!(error = %e, "Failed to install CTRL+C signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    if let Err(e) = server.start(shutdown_signal).await {
        error!(error = %e, "Server error");
        return Err(e);
    }

    info!("Server shutdown complete");
    Ok(())
}
