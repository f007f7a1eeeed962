pub mod client;
pub mod timeseries;
pub mod window;

pub use client::ClouderaClient;
pub use timeseries::{parse, SeriesAttributes, SeriesMetadata, SeriesSamples};
pub use window::TimeWindow;

use std::fmt;
use std::str::FromStr;

/// Hive role types whose open connections are tracked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoleType {
    HiveMetastore,
    HiveServer,
}

impl RoleType {
    pub const ALL: [RoleType; 2] = [RoleType::HiveMetastore, RoleType::HiveServer];

    /// Value Cloudera uses in `roleType=` filters
    pub fn as_cloudera_str(&self) -> &'static str {
        match self {
            RoleType::HiveMetastore => "HIVEMETASTORE",
            RoleType::HiveServer => "HIVESERVER2",
        }
    }

    /// Datadog metric name the aggregated points are sent under
    pub fn metric_name(&self) -> &'static str {
        match self {
            RoleType::HiveMetastore => "cloudera.hive.metastore.openconnections",
            RoleType::HiveServer => "cloudera.hive.server.openconnections",
        }
    }
}

impl fmt::Display for RoleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_cloudera_str())
    }
}

impl FromStr for RoleType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "metastore" | "hivemetastore" => Ok(RoleType::HiveMetastore),
            "server" | "hiveserver" | "hiveserver2" => Ok(RoleType::HiveServer),
            other => Err(format!("unknown role type '{}'", other)),
        }
    }
}

/// One time-series query: expression, role filter and window
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub expression: String,
    pub role: RoleType,
    pub window: TimeWindow,
}

impl Query {
    pub fn open_connections(role: RoleType, window: TimeWindow) -> Self {
        Self {
            expression: format!(
                "select hive_open_connections where roleType={}",
                role.as_cloudera_str()
            ),
            role,
            window,
        }
    }
}
