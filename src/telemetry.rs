use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing_subscriber::EnvFilter;

/// Install the fmt subscriber; `RUST_LOG` wins over the configured level
pub fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("tapper={}", default_level)));

    if tracing_subscriber::fmt().with_env_filter(filter).try_init().is_err() {
        eprintln!("⚠️ A global tracing subscriber was already installed");
    }
}

/// Expose tapper's own counters on `127.0.0.1:<port>/metrics`
pub fn start_metrics_server(port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let addr: SocketAddr = format!("127.0.0.1:{}", port).parse()?;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;

    tracing::info!("Metrics server ready at http://{}/metrics", addr);
    Ok(())
}
