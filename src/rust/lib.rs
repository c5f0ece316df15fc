//! Session core for an emotion-detection app.
//!
//! Text is classified by a remote prediction service (`POST {base}/predict`),
//! faces by an external detector whose smile probabilities are mapped to a
//! fixed set of labels. A [`SessionController`] routes input to the right path
//! and keeps the display state together with a bounded history of results.
//!
//! # Basic Usage
//!
//! ```rust,no_run
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! use std::sync::Arc;
//! use emotion_detector::{ClientConfig, EmotionClient, SessionController, SubmitOutcome};
//!
//! let config = ClientConfig::resolve(None)?;
//! let client = EmotionClient::from_config(&config)?;
//! let session = SessionController::new(Arc::new(client));
//!
//! match session.submit_text("I am great").await {
//!     SubmitOutcome::Detected(label) => println!("Detected: {}", label),
//!     other => println!("No label: {:?}", other),
//! }
//!
//! for entry in session.history() {
//!     println!("{}", entry);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Face Labels
//!
//! Only the first detected face counts:
//!
//! ```rust
//! use emotion_detector::{classify_faces, DetectedFace, EmotionLabel};
//!
//! let classification = classify_faces(&[DetectedFace::smiling(0.85)]);
//! assert_eq!(classification.label, EmotionLabel::Happy);
//! assert_eq!(classification.score, 85);
//!
//! let nobody = classify_faces(&[]);
//! assert_eq!(nobody.label, EmotionLabel::NoFaceDetected);
//! assert_eq!(nobody.score, 0);
//! ```

pub mod client;
pub mod config;
mod error;
pub mod history;
pub mod session;
pub mod vision;

pub use client::{EmotionClient, EmotionClientBuilder, EmotionPredictor, EmotionResponse, TextRequest};
pub use config::ClientConfig;
pub use error::DetectorError;
pub use history::{HistoryEntry, HistoryLog, HISTORY_CAPACITY};
pub use session::{CameraFeed, DisplaySnapshot, SessionBuilder, SessionController, SessionOptions, SubmitOutcome};
pub use vision::{
    classify_faces, Classification, DetectedFace, EmotionLabel, FaceDetector, FrameLease, FrameMode,
    FrameOutcome, FramePipeline, ImageFrame, SmileDetectionResult,
};

/// Initializes `env_logger` from `RUST_LOG`
pub fn init_logger() {
    env_logger::init();
}
