//! Fetch, aggregate and forward for one or more Hive role types.

use futures::future::join_all;
use tracing::{info, warn, Instrument};
use uuid::Uuid;

use crate::aggregation::{aggregate, Point};
use crate::cloudera::{self, ClouderaClient, Query, RoleType, TimeWindow};
use crate::forwarder::{ForwardResult, Forwarder};
use crate::utils::error::Result;

/// Per-role accounting of one pass
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub role: RoleType,
    pub points: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl RunSummary {
    fn from_results(role: RoleType, results: &[ForwardResult]) -> Self {
        let succeeded = results.iter().filter(|r| r.succeeded).count();
        Self {
            role,
            points: results.len(),
            succeeded,
            failed: results.len() - succeeded,
        }
    }
}

#[derive(Clone)]
pub struct Pipeline {
    client: ClouderaClient,
    forwarder: Forwarder,
    lookback_minutes: u32,
}

impl Pipeline {
    pub fn new(client: ClouderaClient, forwarder: Forwarder, lookback_minutes: u32) -> Self {
        Self {
            client,
            forwarder,
            lookback_minutes,
        }
    }

    /// Query and aggregate, propagating transport and decode errors
    pub async fn try_collect(&self, role: RoleType, window: TimeWindow) -> Result<Vec<Point>> {
        let query = Query::open_connections(role, window);
        let body = self.client.fetch(&query).await?;
        let series = cloudera::parse(&body)?;
        Ok(aggregate(&series))
    }

    /// Points for `role` over the configured lookback.
    ///
    /// A failed fetch or an undecodable body yields no points.
    pub async fn collect(&self, role: RoleType) -> Vec<Point> {
        let window = TimeWindow::last_minutes(self.lookback_minutes);
        match self.try_collect(role, window).await {
            Ok(points) => points,
            Err(e) => {
                warn!("No {} points this run: {}", role, e);
                metrics::counter!("tapper_fetch_errors_total", 1, "role" => role.to_string());
                Vec::new()
            }
        }
    }

    pub async fn run(&self, role: RoleType) -> RunSummary {
        let span = tracing::info_span!("pipeline", run_id = %Uuid::new_v4(), role = %role);
        async move {
            let points = self.collect(role).await;
            let results = self.forwarder.forward(&points, role.metric_name()).await;
            let summary = RunSummary::from_results(role, &results);
            info!(
                "Forwarded {}/{} {} points",
                summary.succeeded, summary.points, role
            );
            summary
        }
        .instrument(span)
        .await
    }

    /// Run every role concurrently; summaries follow the order of `roles`
    pub async fn run_all(&self, roles: &[RoleType]) -> Vec<RunSummary> {
        join_all(roles.iter().map(|role| self.run(*role))).await
    }
}
