use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info};

use crate::aggregation::Point;
use crate::datadog::{MetricSubmission, MetricType, MetricsBackend};

/// Outcome of forwarding one point
#[derive(Debug, Clone)]
pub struct ForwardResult {
    pub point: Point,
    pub succeeded: bool,
    pub error: Option<String>,
}

/// Pushes aggregated points to a metrics backend, one gauge per point
#[derive(Clone)]
pub struct Forwarder {
    backend: Arc<dyn MetricsBackend>,
    semaphore: Arc<Semaphore>,
}

impl Forwarder {
    pub fn new(backend: Arc<dyn MetricsBackend>, max_concurrency: usize) -> Self {
        Self {
            backend,
            semaphore: Arc::new(Semaphore::new(max_concurrency.max(1))),
        }
    }

    pub fn cluster_tags(point: &Point) -> Vec<String> {
        vec![format!("cluster:{}", point.cluster_name)]
    }

    /// Submit every point and report each outcome.
    ///
    /// Failures are logged and returned per point; they never abort the batch.
    /// Results come back in the same order as `points`.
    pub async fn forward(&self, points: &[Point], metric_name: &str) -> Vec<ForwardResult> {
        let sends = points
            .iter()
            .map(|point| self.forward_one(point, metric_name));
        join_all(sends).await
    }

    async fn forward_one(&self, point: &Point, metric_name: &str) -> ForwardResult {
        let submission = MetricSubmission {
            name: metric_name.to_string(),
            value: point.value,
            host: point.hostname.clone(),
            metric_type: MetricType::Gauge,
            tags: Self::cluster_tags(point),
        };

        let outcome = match self.semaphore.acquire().await {
            Ok(_permit) => self.backend.post_metric(&submission).await,
            Err(_) => Err(crate::utils::error::TapperError::forward("forwarder is shut down")),
        };

        let (succeeded, error) = match outcome {
            Ok(true) => (true, None),
            Ok(false) => (false, Some("backend rejected the datapoint".to_string())),
            Err(e) => (false, Some(e.to_string())),
        };

        if succeeded {
            info!(
                "Metric {} {:.6} posted for cluster {}",
                metric_name, point.value, point.cluster_name
            );
            metrics::counter!("tapper_points_forwarded_total", 1, "metric" => metric_name.to_string());
        } else {
            error!(
                "Metric {} {:.6} not posted for cluster {}: {}",
                metric_name,
                point.value,
                point.cluster_name,
                error.as_deref().unwrap_or("unknown error")
            );
            metrics::counter!("tapper_points_failed_total", 1, "metric" => metric_name.to_string());
        }

        ForwardResult {
            point: point.clone(),
            succeeded,
            error,
        }
    }
}
