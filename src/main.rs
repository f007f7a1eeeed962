use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tapper::config::TapperConfig;
use tapper::datadog::backend_from_config;
use tapper::{telemetry, ClouderaClient, Forwarder, Pipeline, RoleType};

#[derive(Debug, Parser)]
#[command(name = "tapper", about = "Forward Cloudera Manager metrics to Datadog")]
struct Cli {
    /// Path to a YAML or TOML config file
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Send Hive open-connection gauges for the given roles (all by default)
    Metrics {
        #[arg(long = "role", value_parser = parse_role)]
        roles: Vec<RoleType>,
    },
}

fn parse_role(s: &str) -> std::result::Result<RoleType, String> {
    s.parse()
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = TapperConfig::load(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;

    telemetry::init_logging(&config.get_logging_level());

    if config.metrics_enabled {
        if let Err(e) = telemetry::start_metrics_server(config.metrics_port) {
            tracing::warn!("Metrics server disabled: {}", e);
        }
    }

    let http = reqwest::Client::builder()
        .build()
        .context("failed to build HTTP client")?;

    let client = ClouderaClient::new(http.clone(), &config.cloudera);
    let backend = backend_from_config(&config.datadog, http).await?;
    let forwarder = Forwarder::new(backend, config.datadog.max_concurrent_forwards);
    let pipeline = Pipeline::new(client, forwarder, config.lookback_minutes);

    match cli.command {
        Command::Metrics { roles } => {
            let roles = if roles.is_empty() {
                RoleType::ALL.to_vec()
            } else {
                roles
            };

            for summary in pipeline.run_all(&roles).await {
                tracing::info!(
                    "{}: {} points, {} posted, {} failed",
                    summary.role,
                    summary.points,
                    summary.succeeded,
                    summary.failed
                );
            }
        }
    }

    Ok(())
}
