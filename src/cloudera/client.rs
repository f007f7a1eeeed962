use bytes::Bytes;
use std::time::Duration;

use super::Query;
use crate::config::ClouderaConfig;
use crate::utils::error::{Result, TapperError};

/// Path of the time-series endpoint under the Cloudera Manager base URL
pub const TIMESERIES_ENDPOINT: &str = "api/v18/timeseries";

/// Authenticated client for the Cloudera Manager time-series API.
///
/// Holds a pooled `reqwest::Client` that is meant to live for the whole
/// process; every request still gets its own deadline.
#[derive(Debug, Clone)]
pub struct ClouderaClient {
    http: reqwest::Client,
    base_url: String,
    username: String,
    password: String,
    timeout: Duration,
}

impl ClouderaClient {
    pub fn new(http: reqwest::Client, config: &ClouderaConfig) -> Self {
        Self {
            http,
            base_url: config.base_url(),
            username: config.username.clone(),
            password: config.password.clone(),
            timeout: config.request_timeout(),
        }
    }

    /// Build a client with its own connection pool
    pub fn from_config(config: &ClouderaConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| TapperError::configuration(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self::new(http, config))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn endpoint(&self) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), TIMESERIES_ENDPOINT)
    }

    /// Run one query and return the raw response body.
    ///
    /// Single attempt. Connection failures, timeouts and non-2xx statuses all
    /// come back as `TapperError::Transport`.
    pub async fn fetch(&self, query: &Query) -> Result<Bytes> {
        let from = query.window.from_param();
        let to = query.window.to_param();

        tracing::debug!(
            "GET {} query='{}' from={} to={}",
            self.endpoint(),
            query.expression,
            from,
            to
        );

        let response = self
            .http
            .get(self.endpoint())
            .basic_auth(&self.username, Some(&self.password))
            .query(&[
                ("query", query.expression.as_str()),
                ("contentType", "application/json"),
                ("from", from.as_str()),
                ("to", to.as_str()),
            ])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| TapperError::transport(format!("request to {} failed: {}", self.endpoint(), e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TapperError::transport(format!(
                "{} answered with status {}",
                self.endpoint(),
                status
            )));
        }

        response
            .bytes()
            .await
            .map_err(|e| TapperError::transport(format!("failed to read response body: {}", e)))
    }
}
