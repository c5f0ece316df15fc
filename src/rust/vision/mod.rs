//! Face-based emotion labeling.
//!
//! Face and smile detection itself is an external capability behind
//! [`FaceDetector`]; this module owns the labeling policy applied to its
//! output and the keep-latest pipeline used for live camera frames.

mod frame;
mod label;
mod pipeline;

use async_trait::async_trait;

use crate::error::DetectorError;

pub use frame::{FrameLease, ImageFrame};
pub use label::{
    classify_faces, display_score, Classification, DetectedFace, EmotionLabel, FrameMode,
    FrameOutcome, SmileDetectionResult, HAPPY_THRESHOLD, SLIGHT_SMILE_THRESHOLD,
};
pub use pipeline::FramePipeline;

/// External face detector with smile classification.
///
/// Returns faces in the detector's own order; the list may be empty.
#[async_trait]
pub trait FaceDetector: Send + Sync {
    async fn detect(&self, image: &ImageFrame) -> Result<Vec<DetectedFace>, DetectorError>;
}
