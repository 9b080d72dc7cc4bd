//! Tracing subscriber and Prometheus recorder setup for the server binary

use crate::config::LogFormat;
use crate::{MonitorError, Result};
use metrics::{describe_counter, describe_gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing_subscriber::{fmt, EnvFilter};

/// Filter used when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Install the global tracing subscriber. `RUST_LOG` overrides the default filter.
pub fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    match format {
        LogFormat::Text => fmt().with_env_filter(filter).init(),
        LogFormat::Json => fmt().json().with_env_filter(filter).init(),
    }
}

/// Install the Prometheus recorder and register metric descriptions
pub fn install_metrics() -> Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| {
            MonitorError::Server(format!("Failed to install Prometheus recorder: {}", e))
        })?;

    describe_metrics();
    Ok(handle)
}

fn describe_metrics() {
    describe_counter!("logdeck_events_ingested_total", "Events admitted through batch ingestion");
    describe_counter!("logdeck_events_appended_total", "Events appended to the store");
    describe_counter!("logdeck_events_evicted_total", "Events dropped by capacity pressure");
    describe_counter!("logdeck_batches_rejected_total", "Ingest batches rejected as malformed");
    describe_counter!("logdeck_store_clears_total", "Explicit store clears");
    describe_gauge!("logdeck_store_size", "Events currently retained");
}
