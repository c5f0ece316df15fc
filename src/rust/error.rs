/// Represents the different types of errors that can occur while detecting emotions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DetectorError {
    /// The input was rejected before any work was attempted
    #[error("Validation error: {0}")]
    ValidationError(String),
    /// The prediction endpoint could not be reached or answered badly
    #[error("{0}")]
    NetworkError(String),
    /// The face detector reported a failure
    #[error("Classification error: {0}")]
    ClassificationError(String),
    /// The client or session configuration is unusable
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl DetectorError {
    /// Returns true for failures that happened on the wire.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::NetworkError(_))
    }
}

impl From<reqwest::Error> for DetectorError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            DetectorError::NetworkError(format!("request timed out: {}", err))
        } else if err.is_connect() {
            DetectorError::NetworkError(format!("failed to connect: {}", err))
        } else {
            DetectorError::NetworkError(err.to_string())
        }
    }
}

impl From<toml::de::Error> for DetectorError {
    fn from(err: toml::de::Error) -> Self {
        DetectorError::ConfigError(format!("invalid config file: {}", err))
    }
}
