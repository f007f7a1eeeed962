use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

use super::{MetricSubmission, MetricsBackend};
use crate::config::DatadogConfig;
use crate::utils::error::{Result, TapperError};

pub const SERIES_ENDPOINT: &str = "api/v1/series";

#[derive(Debug, Serialize)]
struct SeriesPayload<'a> {
    series: Vec<SeriesEntry<'a>>,
}

#[derive(Debug, Serialize)]
struct SeriesEntry<'a> {
    metric: &'a str,
    points: Vec<(i64, f64)>,
    #[serde(rename = "type")]
    metric_type: &'static str,
    host: &'a str,
    tags: &'a [String],
}

/// Posts gauges to the Datadog metrics API, one series request per datapoint
#[derive(Debug, Clone)]
pub struct DatadogHttpBackend {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
    application_key: Option<String>,
    timeout: Duration,
}

impl DatadogHttpBackend {
    pub fn new(http: reqwest::Client, config: &DatadogConfig) -> Self {
        Self {
            http,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            application_key: config.application_key.clone(),
            timeout: config.request_timeout(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn endpoint(&self) -> String {
        format!("{}/{}", self.api_url, SERIES_ENDPOINT)
    }
}

#[async_trait]
impl MetricsBackend for DatadogHttpBackend {
    async fn post_metric(&self, submission: &MetricSubmission) -> Result<bool> {
        let payload = SeriesPayload {
            series: vec![SeriesEntry {
                metric: &submission.name,
                points: vec![(chrono::Utc::now().timestamp(), submission.value)],
                metric_type: submission.metric_type.as_str(),
                host: &submission.host,
                tags: &submission.tags,
            }],
        };

        let mut request = self
            .http
            .post(self.endpoint())
            .header("DD-API-KEY", &self.api_key)
            .timeout(self.timeout)
            .json(&payload);
        if let Some(app_key) = &self.application_key {
            request = request.header("DD-APPLICATION-KEY", app_key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| TapperError::forward(format!("series request failed: {}", e)))?;

        let status = response.status();
        if status.is_success() {
            return Ok(true);
        }

        let body = response.text().await.unwrap_or_default();
        Err(TapperError::forward(format!(
            "Datadog answered with status {}: {}",
            status, body
        )))
    }
}
