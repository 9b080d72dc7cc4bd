//! # LogDeck Monitor
//!
//! HTTP boundary of the LogDeck log store: clients push batches of events,
//! dashboards poll for everything newer than their cursor.
//!
//! ## Endpoints
//! - `POST /api/logs` - ingest a batch
//! - `GET /api/logs` - filtered, cursor-bounded query with aggregates
//! - `POST /api/logs/clear` - empty the store
//! - `GET /health` - liveness and store size
//! - `GET /metrics` - Prometheus exposition
//! - `GET /` - live dashboard page

pub mod config;
pub mod server;
pub mod telemetry;

// Re-export main types
pub use config::{LogFormat, ServerConfig};
pub use server::{api_routes, create_router, with_middleware, ApiError, ApiState, MonitorServer};

use thiserror::Error;

/// Monitor-specific error types
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Store error: {0}")]
    Store(#[from] logdeck_store::StoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, MonitorError>;
