pub mod dogstatsd;
pub mod http;

pub use dogstatsd::DogstatsdBackend;
pub use http::DatadogHttpBackend;

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

use crate::config::{BackendKind, DatadogConfig};
use crate::utils::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricType {
    Gauge,
}

impl MetricType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricType::Gauge => "gauge",
        }
    }
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single datapoint handed to a backend
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSubmission {
    pub name: String,
    pub value: f64,
    pub host: String,
    pub metric_type: MetricType,
    pub tags: Vec<String>,
}

/// Something that accepts gauge datapoints.
///
/// `Ok(true)` means accepted, `Ok(false)` rejected without further detail,
/// `Err` failed with a reason.
#[async_trait]
pub trait MetricsBackend: Send + Sync {
    async fn post_metric(&self, submission: &MetricSubmission) -> Result<bool>;
}

/// Build the backend selected in the configuration
pub async fn backend_from_config(
    config: &DatadogConfig,
    http: reqwest::Client,
) -> Result<Arc<dyn MetricsBackend>> {
    let backend: Arc<dyn MetricsBackend> = match config.backend {
        BackendKind::Http => Arc::new(DatadogHttpBackend::new(http, config)),
        BackendKind::Dogstatsd => Arc::new(
            DogstatsdBackend::connect(&config.dogstatsd_host, config.dogstatsd_port).await?,
        ),
    };
    tracing::info!("Forwarding to Datadog via {:?} backend", config.backend);
    Ok(backend)
}
