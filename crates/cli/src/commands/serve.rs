//! `questline serve` — start the HTTP gateway.

use questline_config::AppConfig;
use tracing::info;

pub async fn run(
    mut config: AppConfig,
    port_override: Option<u16>,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    info!(
        host = %config.gateway.host,
        port = config.gateway.port,
        "Starting Questline gateway"
    );
    questline_gateway::start(config).await
}
