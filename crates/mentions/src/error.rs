use thiserror::Error;

/// Result type for mention detection
pub type Result<T> = std::result::Result<T, MentionError>;

/// Errors raised while setting up mention detection
#[derive(Error, Debug)]
pub enum MentionError {
    /// Detector configuration out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl MentionError {
    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}
