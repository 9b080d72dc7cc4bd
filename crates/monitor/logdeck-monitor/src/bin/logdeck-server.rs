//! Log server binary

use logdeck_monitor::{telemetry, MonitorServer, ServerConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::load()?;
    telemetry::init_tracing(config.log_format);
    let metrics = telemetry::install_metrics()?;

    info!(
        address = %config.bind_address(),
        capacity = config.capacity,
        "Dashboard: http://{}/ , ingest: POST http://{}/api/logs",
        config.bind_address(),
        config.bind_address()
    );

    let server = MonitorServer::new(config)?.with_metrics(metrics);
    match server.start().await {
        Ok(()) => Ok(()),
        Err(e) => {
            error!("Log server error: {}", e);
            Err(e.into())
        }
    }
}
