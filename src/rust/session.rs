use std::sync::Arc;

use log::{debug, error, info, warn};
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::client::EmotionPredictor;
use crate::config::ClientConfig;
use crate::error::DetectorError;
use crate::history::{HistoryEntry, HistoryLog};
use crate::vision::{Classification, FaceDetector, FrameLease, FrameMode, FrameOutcome, FramePipeline};

/// Message shown before anything has been submitted
pub const INITIAL_MESSAGE: &str = "Enter text or use voice";
/// Message shown when empty text is submitted
pub const EMPTY_TEXT_MESSAGE: &str = "Please enter some text";

const LIVE_OUTCOME_BUFFER: usize = 4;

/// Behaviour switches for a session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionOptions {
    /// Append still-photo labels to the history log. Off by default: only
    /// text predictions are recorded.
    pub record_photo_history: bool,
}

impl From<&ClientConfig> for SessionOptions {
    fn from(config: &ClientConfig) -> Self {
        Self {
            record_photo_history: config.record_photo_history,
        }
    }
}

/// How a text submission ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The backend's label, now displayed and recorded
    Detected(String),
    /// Empty input; nothing was sent
    Invalid,
    /// The request failed; the error message is displayed
    Failed(String),
    /// A newer submission was made while this one was in flight; its result was discarded
    Superseded,
}

/// Everything the presentation layer needs to render the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplaySnapshot {
    pub message: String,
    /// Score for face-based results; text predictions carry none
    pub score: Option<u8>,
    pub loading: bool,
    pub history: Vec<HistoryEntry>,
    /// Latest live camera reading, if a camera feed has produced one
    pub live: Option<FrameOutcome>,
}

impl DisplaySnapshot {
    /// Live overlay text; reads as "no face" until the first frame is classified
    pub fn live_text(&self) -> String {
        self.live
            .unwrap_or(FrameOutcome::Emotion(Classification::no_face()))
            .display_text()
    }
}

struct SessionState {
    message: String,
    score: Option<u8>,
    loading: bool,
    generation: u64,
    history: HistoryLog,
    live: Option<FrameOutcome>,
}

impl SessionState {
    fn new() -> Self {
        Self {
            message: INITIAL_MESSAGE.to_string(),
            score: None,
            loading: false,
            generation: 0,
            history: HistoryLog::new(),
            live: None,
        }
    }
}

struct Inner {
    predictor: Arc<dyn EmotionPredictor>,
    detector: Option<Arc<dyn FaceDetector>>,
    options: SessionOptions,
    // Never held across an await
    state: Mutex<SessionState>,
}

/// Routes user input to the right classifier and keeps the display state.
///
/// Cloning is cheap and every clone shares the same session. All state changes
/// are made under one lock after the asynchronous work has finished, so
/// concurrent submissions never interleave partial updates.
///
/// ```rust,no_run
/// # async fn run() -> Result<(), emotion_detector::DetectorError> {
/// use std::sync::Arc;
/// use emotion_detector::{EmotionClient, SessionController};
///
/// let client = EmotionClient::builder().base_url("http://127.0.0.1:8000").build()?;
/// let session = SessionController::new(Arc::new(client));
///
/// session.submit_text("I am great").await;
/// println!("{}", session.snapshot().message);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct SessionController {
    inner: Arc<Inner>,
}

impl SessionController {
    /// A text-only session: photo and camera input report `DetectionFailed`
    pub fn new(predictor: Arc<dyn EmotionPredictor>) -> Self {
        Self::from_parts(predictor, None, SessionOptions::default())
    }

    fn from_parts(
        predictor: Arc<dyn EmotionPredictor>,
        detector: Option<Arc<dyn FaceDetector>>,
        options: SessionOptions,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                predictor,
                detector,
                options,
                state: Mutex::new(SessionState::new()),
            }),
        }
    }

    /// Creates a new SessionBuilder for fluent construction
    pub fn builder() -> SessionBuilder {
        SessionBuilder::default()
    }

    /// Submits typed text for prediction
    pub async fn submit_text(&self, text: &str) -> SubmitOutcome {
        if text.is_empty() {
            info!("Empty text submitted, not calling the backend");
            let mut state = self.inner.state.lock();
            state.message = EMPTY_TEXT_MESSAGE.to_string();
            state.score = None;
            return SubmitOutcome::Invalid;
        }

        let generation = {
            let mut state = self.inner.state.lock();
            state.generation += 1;
            state.loading = true;
            state.generation
        };
        info!("Submitting text #{} for prediction", generation);

        // Clears `loading` if this future is dropped before the response arrives
        let pending = PendingSubmission {
            inner: &self.inner,
            generation,
        };
        let result = self.inner.predictor.predict(text).await;
        pending.disarm();

        let mut state = self.inner.state.lock();
        if state.generation != generation {
            debug!(
                "Discarding result of submission #{} (latest is #{})",
                generation, state.generation
            );
            return SubmitOutcome::Superseded;
        }

        state.loading = false;
        match result {
            Ok(response) => {
                state.message = response.emotion.clone();
                state.score = None;
                state.history.append(HistoryEntry::now(response.emotion.clone()));
                SubmitOutcome::Detected(response.emotion)
            }
            Err(e) => {
                warn!("Prediction #{} failed: {}", generation, e);
                let message = format!("Error: {}", e);
                state.message = message.clone();
                state.score = None;
                SubmitOutcome::Failed(message)
            }
        }
    }

    /// Submits a speech-recognizer transcript; handled exactly like typed text
    pub async fn submit_voice_transcript(&self, transcript: &str) -> SubmitOutcome {
        debug!("Voice transcript received ({} chars)", transcript.chars().count());
        self.submit_text(transcript).await
    }

    /// Classifies a still photo and displays the label.
    ///
    /// The frame is released as soon as detection completes.
    pub async fn submit_photo(&self, frame: FrameLease) -> Classification {
        let classification = match &self.inner.detector {
            Some(detector) => {
                let result = detector.detect(frame.image()).await;
                frame.close();
                Classification::from_detection(&result)
            }
            None => {
                error!("Photo submitted but no face detector is configured");
                frame.close();
                Classification::detection_failed()
            }
        };
        info!("Photo classified as {}", classification);

        let mut state = self.inner.state.lock();
        state.message = classification.label.to_string();
        state.score = Some(classification.score);
        if self.inner.options.record_photo_history {
            state.history.append(HistoryEntry::now(classification.label.as_str()));
        }
        classification
    }

    /// Starts classifying live frames; readings show up in [`DisplaySnapshot::live`].
    ///
    /// Must be called from within a tokio runtime.
    pub fn start_camera(&self, mode: FrameMode) -> Result<CameraFeed, DetectorError> {
        let detector = self.inner.detector.clone().ok_or_else(|| {
            DetectorError::ConfigError("Camera requires a face detector".to_string())
        })?;

        let (tx, mut rx) = mpsc::channel(LIVE_OUTCOME_BUFFER);
        let pipeline = FramePipeline::spawn(detector, mode, tx);

        let session = self.clone();
        let forwarder = tokio::spawn(async move {
            while let Some(outcome) = rx.recv().await {
                session.apply_live(outcome);
            }
        });

        Ok(CameraFeed { pipeline, forwarder })
    }

    fn apply_live(&self, outcome: FrameOutcome) {
        self.inner.state.lock().live = Some(outcome);
    }

    /// Current display state
    pub fn snapshot(&self) -> DisplaySnapshot {
        let state = self.inner.state.lock();
        DisplaySnapshot {
            message: state.message.clone(),
            score: state.score,
            loading: state.loading,
            history: state.history.current(),
            live: state.live,
        }
    }

    /// History snapshot, newest first
    pub fn history(&self) -> Vec<HistoryEntry> {
        self.inner.state.lock().history.current()
    }

    /// True while the latest text submission is waiting for the backend
    pub fn is_loading(&self) -> bool {
        self.inner.state.lock().loading
    }

    /// Options the session was built with
    pub fn options(&self) -> &SessionOptions {
        &self.inner.options
    }
}

struct PendingSubmission<'a> {
    inner: &'a Inner,
    generation: u64,
}

impl PendingSubmission<'_> {
    fn disarm(self) {
        std::mem::forget(self);
    }
}

impl Drop for PendingSubmission<'_> {
    fn drop(&mut self) {
        let mut state = self.inner.state.lock();
        if state.generation == self.generation {
            debug!("Submission #{} cancelled before completion", self.generation);
            state.loading = false;
        }
    }
}

/// A builder for constructing a SessionController with a fluent interface.
#[derive(Default)]
pub struct SessionBuilder {
    predictor: Option<Arc<dyn EmotionPredictor>>,
    detector: Option<Arc<dyn FaceDetector>>,
    options: SessionOptions,
}

impl SessionBuilder {
    /// Sets the text prediction backend (required)
    pub fn predictor(mut self, predictor: Arc<dyn EmotionPredictor>) -> Self {
        self.predictor = Some(predictor);
        self
    }

    /// Sets the face detector used for photos and live frames
    pub fn detector(mut self, detector: Arc<dyn FaceDetector>) -> Self {
        self.detector = Some(detector);
        self
    }

    /// Sets behaviour switches; defaults apply otherwise
    pub fn options(mut self, options: SessionOptions) -> Self {
        self.options = options;
        self
    }

    /// # Returns
    /// * `Err(DetectorError::ConfigError)` if no predictor was set
    pub fn build(self) -> Result<SessionController, DetectorError> {
        let predictor = self
            .predictor
            .ok_or_else(|| DetectorError::ConfigError("A session requires a predictor".into()))?;
        Ok(SessionController::from_parts(predictor, self.detector, self.options))
    }
}

/// Handle to a running live-camera classification
pub struct CameraFeed {
    pipeline: FramePipeline,
    forwarder: JoinHandle<()>,
}

impl CameraFeed {
    /// Offers a captured frame; see [`FramePipeline::submit`]
    pub fn submit(&self, frame: FrameLease) -> bool {
        self.pipeline.submit(frame)
    }

    /// Frames replaced before they could be classified
    pub fn dropped_frames(&self) -> u64 {
        self.pipeline.dropped_frames()
    }

    /// Frames that went through the detector
    pub fn classified_frames(&self) -> u64 {
        self.pipeline.classified_frames()
    }

    /// Stops the feed after the in-flight frame (if any) has been applied
    pub async fn shutdown(self) {
        self.pipeline.shutdown().await;
        let _ = self.forwarder.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::EmotionResponse;
    use async_trait::async_trait;

    struct EchoPredictor;

    #[async_trait]
    impl EmotionPredictor for EchoPredictor {
        async fn predict(&self, text: &str) -> Result<EmotionResponse, DetectorError> {
            Ok(EmotionResponse {
                emotion: text.to_uppercase(),
            })
        }
    }

    #[test]
    fn test_builder_requires_predictor() {
        let result = SessionController::builder().build();
        assert!(matches!(result, Err(DetectorError::ConfigError(_))));
    }

    #[test]
    fn test_initial_snapshot() {
        let session = SessionController::new(Arc::new(EchoPredictor));
        let snapshot = session.snapshot();
        assert_eq!(snapshot.message, INITIAL_MESSAGE);
        assert!(!snapshot.loading);
        assert!(snapshot.history.is_empty());
        assert_eq!(snapshot.live_text(), "Emotion: No face detected (0/100)");
    }

    #[test]
    fn test_options_from_config() {
        let config = ClientConfig {
            record_photo_history: true,
            ..ClientConfig::default()
        };
        assert!(SessionOptions::from(&config).record_photo_history);
    }

    #[tokio::test]
    async fn test_photo_without_detector() {
        let session = SessionController::new(Arc::new(EchoPredictor));
        let frame = FrameLease::new(crate::vision::ImageFrame::new(vec![0u8; 4], 2, 2));
        let classification = session.submit_photo(frame).await;
        assert_eq!(classification, Classification::detection_failed());
        assert_eq!(session.snapshot().message, "Detection failed");
        assert!(session.start_camera(FrameMode::Emotion).is_err());
    }

    #[tokio::test]
    async fn test_text_then_snapshot() {
        let session = SessionController::new(Arc::new(EchoPredictor));
        let outcome = session.submit_text("calm").await;
        assert_eq!(outcome, SubmitOutcome::Detected("CALM".into()));
        let snapshot = session.snapshot();
        assert_eq!(snapshot.message, "CALM");
        assert_eq!(snapshot.score, None);
        assert_eq!(snapshot.history.len(), 1);
    }
}
