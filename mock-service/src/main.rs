use metrics_exporter_prometheus::PrometheusBuilder;
use mock_service::MockNode;
use std::net::SocketAddr;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    PrometheusBuilder::new()
        .with_http_listener("0.0.0.0:8080".parse::<SocketAddr>()?)
        .install()?;

    tokio::spawn(mock_service::rps_measure_task());

    let addr: SocketAddr = std::env::var("MOCK_NODE_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:8545".to_string())
        .parse()?;
    tracing::info!("Mock node listening on {addr}");
    MockNode::new().serve(addr).await?;
    Ok(())
}
