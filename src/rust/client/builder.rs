use std::time::Duration;

use log::info;
use reqwest::{Client, Url};

use super::client::EmotionClient;
use crate::config::{ClientConfig, DEFAULT_BASE_URL};
use crate::error::DetectorError;

const PREDICT_PATH: &str = "predict";

/// A builder for constructing an EmotionClient with a fluent interface.
#[derive(Debug, Default)]
pub struct EmotionClientBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
}

impl EmotionClientBuilder {
    /// Creates a new builder; without further calls it targets `DEFAULT_BASE_URL`
    pub fn new() -> Self {
        Self {
            base_url: None,
            timeout: None,
        }
    }

    /// Sets the backend root, e.g. `http://127.0.0.1:8000`. A trailing slash is fine.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets a per-request timeout. Without one the HTTP client's default applies.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Copies base URL and timeout from a resolved configuration
    pub fn with_config(mut self, config: &ClientConfig) -> Self {
        self.base_url = Some(config.base_url.clone());
        self.timeout = config.timeout();
        self
    }

    /// Validates the base URL and builds the underlying HTTP client.
    ///
    /// # Returns
    /// * `Err(DetectorError::ConfigError)` if:
    ///   - The base URL is empty or cannot be parsed
    ///   - The base URL is not http or https
    ///   - The HTTP client cannot be constructed
    pub fn build(self) -> Result<EmotionClient, DetectorError> {
        let base_url = self.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let endpoint = Self::predict_endpoint(&base_url)?;

        let mut http = Client::builder();
        if let Some(timeout) = self.timeout {
            http = http.timeout(timeout);
        }
        let http = http
            .build()
            .map_err(|e| DetectorError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        info!("Emotion client ready (endpoint: {})", endpoint);
        Ok(EmotionClient { http, endpoint })
    }

    fn predict_endpoint(base_url: &str) -> Result<String, DetectorError> {
        let trimmed = base_url.trim();
        if trimmed.is_empty() {
            return Err(DetectorError::ConfigError("Base URL cannot be empty".into()));
        }

        // Join against a slash-terminated base so any path prefix is kept
        let base = Url::parse(&format!("{}/", trimmed.trim_end_matches('/')))
            .map_err(|e| DetectorError::ConfigError(format!("Invalid base URL {:?}: {}", trimmed, e)))?;
        if base.scheme() != "http" && base.scheme() != "https" {
            return Err(DetectorError::ConfigError(format!(
                "Unsupported URL scheme {:?}, expected http or https",
                base.scheme()
            )));
        }

        let endpoint = base
            .join(PREDICT_PATH)
            .map_err(|e| DetectorError::ConfigError(format!("Invalid base URL {:?}: {}", trimmed, e)))?;
        Ok(endpoint.to_string())
    }
}

impl EmotionClient {
    /// Builds a client from a resolved configuration
    pub fn from_config(config: &ClientConfig) -> Result<Self, DetectorError> {
        EmotionClientBuilder::new().with_config(config).build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_base_url() {
        let client = EmotionClientBuilder::new().build().unwrap();
        assert_eq!(client.endpoint(), "http://127.0.0.1:8000/predict");
    }

    #[test]
    fn test_path_prefix_is_kept() {
        let client = EmotionClientBuilder::new()
            .base_url("https://api.example.com/v1/emotion")
            .build()
            .unwrap();
        assert_eq!(client.endpoint(), "https://api.example.com/v1/emotion/predict");
    }

    #[test]
    fn test_empty_base_url() {
        let result = EmotionClientBuilder::new().base_url("   ").build();
        assert!(matches!(result, Err(DetectorError::ConfigError(_))));
    }

    #[test]
    fn test_invalid_base_url() {
        let result = EmotionClientBuilder::new().base_url("not a url").build();
        assert!(matches!(result, Err(DetectorError::ConfigError(_))));
    }

    #[test]
    fn test_unsupported_scheme() {
        let result = EmotionClientBuilder::new().base_url("ftp://example.com").build();
        assert!(matches!(result, Err(DetectorError::ConfigError(_))));
    }

    #[test]
    fn test_from_config() {
        let config = ClientConfig {
            base_url: "http://10.0.2.2:8000/".into(),
            timeout_secs: Some(5),
            record_photo_history: false,
        };
        let client = EmotionClient::from_config(&config).unwrap();
        assert_eq!(client.endpoint(), "http://10.0.2.2:8000/predict");
    }
}
