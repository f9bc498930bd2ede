//! HTTP server implementation
//!
//! Sets up the Axum HTTP server with:
//! - The gateway endpoint, health check and metrics
//! - Middleware (request tracing)
//! - Graceful shutdown

use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Config;
use crate::gateway::Gateway;
use crate::routes;

/// HTTP server for the storage gateway
pub struct Server {
    config: Config,
    gateway: Arc<Gateway>,
}

impl Server {
    /// Create a new server instance
    pub fn new(config: Config, gateway: Arc<Gateway>) -> Self {
        Self { config, gateway }
    }

    /// Build the Axum router with all middleware
    ///
    /// Deadlines are enforced per operation by the gateway handler, so a
    /// slow provider still yields a JSON envelope with CORS headers.
    fn build_router(&self) -> Router {
        routes::create_router(self.gateway.clone(), self.config.server.max_upload_size)
            .layer(TraceLayer::new_for_http())
    }

    /// Start the server and run until shutdown signal
    pub async fn start<F>(&self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let app = self.build_router();

        let listener = tokio::net::TcpListener::bind(self.config.server.bind_address).await?;
        info!(address = %listener.local_addr()?, "Server listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        Ok(())
    }
}
