pub mod aggregation;
pub mod cloudera;
pub mod config;
pub mod datadog;
pub mod forwarder;
pub mod pipeline;
pub mod telemetry;
pub mod utils;

pub use aggregation::{aggregate, Point};
pub use cloudera::{ClouderaClient, Query, RoleType, TimeWindow};
pub use config::TapperConfig;
pub use forwarder::{ForwardResult, Forwarder};
pub use pipeline::{Pipeline, RunSummary};
pub use utils::error::{Result, TapperError};
