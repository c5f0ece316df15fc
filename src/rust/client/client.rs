use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::Client;

use super::builder::EmotionClientBuilder;
use super::types::{EmotionResponse, TextRequest};
use crate::error::DetectorError;

/// Anything that can turn free text into an emotion label.
///
/// The session holds one of these behind an `Arc`, which lets tests swap the
/// HTTP client for an in-process stub.
#[async_trait]
pub trait EmotionPredictor: Send + Sync {
    async fn predict(&self, text: &str) -> Result<EmotionResponse, DetectorError>;
}

/// HTTP client for the remote `/predict` endpoint.
///
/// Each call is a single POST with no retry:
/// ```rust,no_run
/// # async fn run() -> Result<(), emotion_detector::DetectorError> {
/// use emotion_detector::{EmotionClient, EmotionPredictor};
///
/// let client = EmotionClient::builder()
///     .base_url("http://127.0.0.1:8000")
///     .build()?;
///
/// let response = client.predict("I am great").await?;
/// println!("Detected: {}", response.emotion);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct EmotionClient {
    pub(crate) http: Client,
    pub(crate) endpoint: String,
}

// Compile-time verification of thread-safety
const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn verify_thread_safety() {
        assert_send_sync::<EmotionClient>();
    }
};

impl EmotionClient {
    /// Creates a new EmotionClientBuilder for fluent construction
    pub fn builder() -> EmotionClientBuilder {
        EmotionClientBuilder::new()
    }

    /// Full URL requests are sent to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn send(&self, text: &str) -> Result<EmotionResponse, DetectorError> {
        let request = TextRequest::new(text);
        debug!("POST {} ({} chars)", self.endpoint, text.chars().count());

        let response = self.http.post(&self.endpoint).json(&request).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!("Prediction request failed with status {}", status);
            return Err(DetectorError::NetworkError(format!(
                "HTTP {}: {}",
                status.as_u16(),
                body.trim()
            )));
        }

        serde_json::from_str::<EmotionResponse>(&body)
            .map_err(|e| DetectorError::NetworkError(format!("malformed response: {}", e)))
    }
}

#[async_trait]
impl EmotionPredictor for EmotionClient {
    /// Sends `text` to the backend and returns its label.
    ///
    /// Empty text is rejected locally with a `ValidationError`; no request is made.
    async fn predict(&self, text: &str) -> Result<EmotionResponse, DetectorError> {
        if text.is_empty() {
            return Err(DetectorError::ValidationError("Input text cannot be empty".into()));
        }

        let response = self.send(text).await?;
        info!("Backend classified input as {:?}", response.emotion);
        Ok(response)
    }
}
