use std::fmt;

use crate::error::DetectorError;

/// Smile probability above which a face counts as happy
pub const HAPPY_THRESHOLD: f32 = 0.7;
/// Smile probability above which a face counts as slightly smiling
pub const SLIGHT_SMILE_THRESHOLD: f32 = 0.3;

/// One face as reported by the detector
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DetectedFace {
    /// Smile confidence in [0, 1]; `None` if the detector did not classify it
    pub smile_probability: Option<f32>,
}

impl DetectedFace {
    /// A face with a known smile probability
    pub fn smiling(probability: f32) -> Self {
        Self {
            smile_probability: Some(probability),
        }
    }

    /// A face the detector found but did not classify
    pub fn unclassified() -> Self {
        Self {
            smile_probability: None,
        }
    }
}

/// A face list reduced to what the labeling policy needs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmileDetectionResult {
    pub face_detected: bool,
    pub smile_probability: f32,
}

impl SmileDetectionResult {
    /// Only the first face is considered; the rest are ignored.
    pub fn from_faces(faces: &[DetectedFace]) -> Self {
        match faces.first() {
            Some(face) => Self {
                face_detected: true,
                smile_probability: face.smile_probability.unwrap_or(0.0),
            },
            None => Self {
                face_detected: false,
                smile_probability: 0.0,
            },
        }
    }
}

/// Discrete labels produced by local face classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmotionLabel {
    Happy,
    SlightSmile,
    Neutral,
    NoFaceDetected,
    DetectionFailed,
}

impl EmotionLabel {
    /// Text shown for this label
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Happy => "😊 Happy",
            Self::SlightSmile => "🙂 Slight Smile",
            Self::Neutral => "😐 Neutral",
            Self::NoFaceDetected => "No face detected",
            Self::DetectionFailed => "Detection failed",
        }
    }

    fn from_probability(p: f32) -> Self {
        if p > HAPPY_THRESHOLD {
            Self::Happy
        } else if p > SLIGHT_SMILE_THRESHOLD {
            Self::SlightSmile
        } else {
            Self::Neutral
        }
    }
}

impl fmt::Display for EmotionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A label plus the 0..=100 score shown next to it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub label: EmotionLabel,
    pub score: u8,
}

impl Classification {
    /// Outcome for an empty face list
    pub fn no_face() -> Self {
        Self {
            label: EmotionLabel::NoFaceDetected,
            score: 0,
        }
    }

    /// Outcome for a detector error
    pub fn detection_failed() -> Self {
        Self {
            label: EmotionLabel::DetectionFailed,
            score: 0,
        }
    }

    /// Applies the threshold policy to a reduced detection result
    pub fn from_smile(result: SmileDetectionResult) -> Self {
        if !result.face_detected {
            return Self::no_face();
        }
        let p = result.smile_probability;
        Self {
            label: EmotionLabel::from_probability(p),
            score: display_score(p),
        }
    }

    /// Maps a detector outcome to a classification; errors become `DetectionFailed`
    pub fn from_detection(result: &Result<Vec<DetectedFace>, DetectorError>) -> Self {
        match result {
            Ok(faces) => classify_faces(faces),
            Err(e) => {
                log::warn!("Face detection failed: {}", e);
                Self::detection_failed()
            }
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}/100)", self.label, self.score)
    }
}

/// Labels a face list. Shared by the still-photo and live-frame paths.
pub fn classify_faces(faces: &[DetectedFace]) -> Classification {
    Classification::from_smile(SmileDetectionResult::from_faces(faces))
}

/// `round(p * 100)` clamped to [1, 100]
pub fn display_score(p: f32) -> u8 {
    let scaled = (p * 100.0).round();
    // NaN saturates to 0 in the cast and is then clamped up to 1
    (scaled as i32).clamp(1, 100) as u8
}

/// What the live camera path reports for each frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameMode {
    /// Smile-based emotion label with score
    #[default]
    Emotion,
    /// Number of faces in view
    Count,
}

/// Result of classifying one live frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Emotion(Classification),
    FaceCount(usize),
    /// Detector error in count mode
    Failed,
}

impl FrameOutcome {
    /// Maps a detector outcome according to `mode`
    pub fn from_detection(mode: FrameMode, result: &Result<Vec<DetectedFace>, DetectorError>) -> Self {
        match mode {
            FrameMode::Emotion => Self::Emotion(Classification::from_detection(result)),
            FrameMode::Count => match result {
                Ok(faces) => Self::FaceCount(faces.len()),
                Err(e) => {
                    log::warn!("Face detection failed: {}", e);
                    Self::Failed
                }
            },
        }
    }

    /// Text shown in the live overlay
    pub fn display_text(&self) -> String {
        match self {
            Self::Emotion(c) => format!("Emotion: {}", c),
            Self::FaceCount(n) => format!("Faces detected: {}", n),
            Self::Failed => EmotionLabel::DetectionFailed.to_string(),
        }
    }
}
