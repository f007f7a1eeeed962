use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    ParseError(String),
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Cloudera Manager connection settings
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ClouderaConfig {
    pub host: String,

    #[serde(default = "default_cloudera_port")]
    pub port: u16,

    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: String,

    #[serde(default)]
    pub ssl: bool,

    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl ClouderaConfig {
    /// Scheme, host and port, without a trailing slash
    pub fn base_url(&self) -> String {
        let scheme = if self.ssl { "https" } else { "http" };
        format!("{}://{}:{}", scheme, self.host, self.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for ClouderaConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: default_cloudera_port(),
            username: String::new(),
            password: String::new(),
            ssl: false,
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

/// Which transport carries gauges to Datadog
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Http,
    Dogstatsd,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatadogConfig {
    #[serde(default)]
    pub backend: BackendKind,

    #[serde(default)]
    pub api_key: String,

    #[serde(default)]
    pub application_key: Option<String>,

    #[serde(default = "default_datadog_api_url")]
    pub api_url: String,

    #[serde(default = "default_dogstatsd_host")]
    pub dogstatsd_host: String,

    #[serde(default = "default_dogstatsd_port")]
    pub dogstatsd_port: u16,

    #[serde(default = "default_max_concurrent_forwards")]
    pub max_concurrent_forwards: usize,

    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl DatadogConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for DatadogConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Http,
            api_key: String::new(),
            application_key: None,
            api_url: default_datadog_api_url(),
            dogstatsd_host: default_dogstatsd_host(),
            dogstatsd_port: default_dogstatsd_port(),
            max_concurrent_forwards: default_max_concurrent_forwards(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

// Default value functions for serde
fn default_cloudera_port() -> u16 {
    7180
}

fn default_request_timeout_ms() -> u64 {
    30_000
}

fn default_datadog_api_url() -> String {
    "https://api.datadoghq.com".to_string()
}

fn default_dogstatsd_host() -> String {
    "127.0.0.1".to_string()
}

fn default_dogstatsd_port() -> u16 {
    8125
}

fn default_max_concurrent_forwards() -> usize {
    8
}

fn default_lookback_minutes() -> u32 {
    5
}

fn default_logging_level() -> Option<String> {
    Some("info".to_string())
}

fn default_metrics_port() -> u16 {
    9000
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TapperConfig {
    pub cloudera: ClouderaConfig,

    #[serde(default)]
    pub datadog: DatadogConfig,

    /// How far back each query looks, in minutes
    #[serde(default = "default_lookback_minutes")]
    pub lookback_minutes: u32,

    #[serde(default = "default_logging_level")]
    pub logging_level: Option<String>,

    #[serde(default)]
    pub metrics_enabled: bool,

    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,
}

impl TapperConfig {
    /// Load config from a YAML or TOML file, picked by extension
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml(path),
            _ => Self::from_yaml(path),
        }
    }

    /// Load config from YAML file
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config: TapperConfig = serde_yaml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(format!("YAML parsing error: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from TOML file
    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config: TapperConfig = toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(format!("TOML parsing error: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn defaults() -> Self {
        Self {
            cloudera: ClouderaConfig::default(),
            datadog: DatadogConfig::default(),
            lookback_minutes: default_lookback_minutes(),
            logging_level: default_logging_level(),
            metrics_enabled: false,
            metrics_port: default_metrics_port(),
        }
    }

    /// Get normalized logging level (lowercase)
    pub fn get_logging_level(&self) -> String {
        self.logging_level
            .clone()
            .unwrap_or_else(|| "info".to_string())
            .to_lowercase()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cloudera.host.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "cloudera.host must not be empty".into(),
            ));
        }

        if self.cloudera.port == 0 {
            return Err(ConfigError::ValidationError(
                "cloudera.port cannot be 0".into(),
            ));
        }

        if self.cloudera.request_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "cloudera.request_timeout_ms must be > 0".into(),
            ));
        }

        if self.lookback_minutes == 0 {
            return Err(ConfigError::ValidationError(
                "lookback_minutes must be > 0".into(),
            ));
        }

        if self.datadog.max_concurrent_forwards == 0 {
            return Err(ConfigError::ValidationError(
                "datadog.max_concurrent_forwards must be > 0".into(),
            ));
        }

        if self.datadog.request_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "datadog.request_timeout_ms must be > 0".into(),
            ));
        }

        match self.datadog.backend {
            BackendKind::Http => {
                if self.datadog.api_key.trim().is_empty() {
                    return Err(ConfigError::ValidationError(
                        "datadog.api_key is required for the http backend".into(),
                    ));
                }
            }
            BackendKind::Dogstatsd => {
                if self.datadog.dogstatsd_port == 0 {
                    return Err(ConfigError::ValidationError(
                        "datadog.dogstatsd_port cannot be 0".into(),
                    ));
                }
            }
        }

        if self.metrics_enabled && self.metrics_port == 0 {
            return Err(ConfigError::ValidationError(
                "metrics_port cannot be 0".into(),
            ));
        }

        if let Some(level) = &self.logging_level {
            let level = level.to_lowercase();
            let allowed = ["trace", "debug", "info", "warn", "error"];
            if !allowed.contains(&level.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "invalid logging_level '{}'. Must be one of: {:?}",
                    level, allowed
                )));
            }
        }

        Ok(())
    }
}

impl Default for TapperConfig {
    fn default() -> Self {
        Self::defaults()
    }
}

impl From<ConfigError> for crate::utils::error::TapperError {
    fn from(err: ConfigError) -> Self {
        crate::utils::error::TapperError::Configuration(err.to_string())
    }
}
