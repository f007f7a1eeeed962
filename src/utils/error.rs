use thiserror::Error;

/// Result type alias for tapper operations.
pub type Result<T> = std::result::Result<T, TapperError>;

#[derive(Debug, Error)]
pub enum TapperError {
    /// The monitoring API could not be reached or answered with a failure status.
    /// Authentication failures land here too.
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Decode error: {0}")]
    Decode(String),

    /// The metrics backend refused or failed to accept a submission.
    #[error("Forward error: {0}")]
    Forward(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl TapperError {
    pub fn transport<S: Into<String>>(msg: S) -> Self {
        TapperError::Transport(msg.into())
    }

    pub fn decode<S: Into<String>>(msg: S) -> Self {
        TapperError::Decode(msg.into())
    }

    pub fn forward<S: Into<String>>(msg: S) -> Self {
        TapperError::Forward(msg.into())
    }

    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        TapperError::Configuration(msg.into())
    }

    /// True for failures that mean "no data this round" rather than a broken setup.
    pub fn is_no_data(&self) -> bool {
        matches!(self, TapperError::Transport(_) | TapperError::Decode(_))
    }
}

impl From<serde_json::Error> for TapperError {
    fn from(err: serde_json::Error) -> Self {
        TapperError::Decode(err.to_string())
    }
}

impl From<reqwest::Error> for TapperError {
    fn from(err: reqwest::Error) -> Self {
        TapperError::Transport(err.to_string())
    }
}

impl From<std::io::Error> for TapperError {
    fn from(err: std::io::Error) -> Self {
        TapperError::Forward(err.to_string())
    }
}
