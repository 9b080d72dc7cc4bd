//! Server components for the log dashboard

mod error;
mod rest_api;

pub use error::ApiError;
pub use rest_api::{api_routes, create_router, with_middleware, ApiState, LogsResponse};

use crate::{config::ServerConfig, MonitorError, Result};
use axum::Router;
use logdeck_store::LogService;
use metrics_exporter_prometheus::PrometheusHandle;
use std::net::SocketAddr;

/// Main monitor server
pub struct MonitorServer {
    config: ServerConfig,
    state: ApiState,
}

impl MonitorServer {
    /// Create a server with an empty store sized from `config`
    pub fn new(config: ServerConfig) -> Result<Self> {
        config.validate()?;
        let service = LogService::new(config.store_config())?;
        Ok(Self {
            state: ApiState::new(service),
            config,
        })
    }

    /// Expose a Prometheus recorder at `/metrics`
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.state = self.state.with_metrics(handle);
        self
    }

    pub fn service(&self) -> &LogService {
        &self.state.service
    }

    pub fn router(&self) -> Router {
        create_router(self.state.clone(), self.config.enable_cors)
    }

    /// Start the server and run until Ctrl+C
    pub async fn start(self) -> Result<()> {
        let addr: SocketAddr = self
            .config
            .bind_address()
            .parse()
            .map_err(|e| MonitorError::Server(format!("Invalid address: {}", e)))?;

        tracing::info!(
            %addr,
            capacity = self.config.capacity,
            "Starting log server"
        );

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| MonitorError::Server(e.to_string()))?;
        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| MonitorError::Server(e.to_string()))?;

        tracing::info!("Log server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
