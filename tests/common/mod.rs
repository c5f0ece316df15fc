#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use parking_lot::Mutex;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinHandle;

use emotion_detector::{
    DetectedFace, DetectorError, EmotionPredictor, EmotionResponse, FaceDetector, FrameLease, ImageFrame,
    TextRequest,
};

/// What the stub `/predict` endpoint answers with
#[derive(Clone)]
pub enum StubReply {
    Emotion(&'static str),
    Status(StatusCode),
    Raw(&'static str),
}

struct BackendState {
    reply: StubReply,
    hits: AtomicUsize,
    last_text: Mutex<Option<String>>,
}

/// An in-process prediction backend bound to an ephemeral port
pub struct StubBackend {
    pub base_url: String,
    state: Arc<BackendState>,
    server: JoinHandle<()>,
}

impl StubBackend {
    pub async fn spawn(reply: StubReply) -> Self {
        let state = Arc::new(BackendState {
            reply,
            hits: AtomicUsize::new(0),
            last_text: Mutex::new(None),
        });
        let app = Router::new()
            .route("/predict", post(predict))
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
            server,
        }
    }

    pub fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }

    pub fn last_text(&self) -> Option<String> {
        self.state.last_text.lock().clone()
    }
}

impl Drop for StubBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

async fn predict(State(state): State<Arc<BackendState>>, Json(request): Json<TextRequest>) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    *state.last_text.lock() = Some(request.text);
    match &state.reply {
        StubReply::Emotion(emotion) => Json(EmotionResponse {
            emotion: emotion.to_string(),
        })
        .into_response(),
        StubReply::Status(status) => (*status, "model unavailable").into_response(),
        StubReply::Raw(body) => {
            (StatusCode::OK, [(header::CONTENT_TYPE, "application/json")], *body).into_response()
        }
    }
}

/// A base URL nothing listens on
pub async fn unreachable_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

/// Predictor answering from a script; each text maps to (delay, label)
pub struct ScriptedPredictor {
    pub calls: AtomicUsize,
    script: Vec<(&'static str, Duration, Result<&'static str, &'static str>)>,
}

impl ScriptedPredictor {
    pub fn new(script: Vec<(&'static str, Duration, Result<&'static str, &'static str>)>) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            script,
        }
    }
}

#[async_trait]
impl EmotionPredictor for ScriptedPredictor {
    async fn predict(&self, text: &str) -> Result<EmotionResponse, DetectorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let (_, delay, reply) = self
            .script
            .iter()
            .find(|(input, _, _)| *input == text)
            .cloned()
            .ok_or_else(|| DetectorError::NetworkError(format!("unexpected input {:?}", text)))?;
        tokio::time::sleep(delay).await;
        match reply {
            Ok(emotion) => Ok(EmotionResponse {
                emotion: emotion.to_string(),
            }),
            Err(message) => Err(DetectorError::NetworkError(message.to_string())),
        }
    }
}

/// Detector returning a fixed answer
pub struct FixedDetector {
    pub calls: AtomicUsize,
    answer: Result<Vec<DetectedFace>, DetectorError>,
}

impl FixedDetector {
    pub fn faces(faces: Vec<DetectedFace>) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            answer: Ok(faces),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            answer: Err(DetectorError::ClassificationError(message.to_string())),
        }
    }
}

#[async_trait]
impl FaceDetector for FixedDetector {
    async fn detect(&self, _image: &ImageFrame) -> Result<Vec<DetectedFace>, DetectorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answer.clone()
    }
}

/// Detector that reports each frame it starts on and then waits for a permit
/// before answering, so tests can hold a classification in flight.
pub struct GatedDetector {
    pub gate: Semaphore,
    started: mpsc::UnboundedSender<i64>,
    classified: Mutex<Vec<i64>>,
    smile: f32,
    fail: bool,
}

impl GatedDetector {
    pub fn new(smile: f32) -> (Arc<Self>, mpsc::UnboundedReceiver<i64>) {
        Self::build(smile, false)
    }

    pub fn failing() -> (Arc<Self>, mpsc::UnboundedReceiver<i64>) {
        Self::build(0.0, true)
    }

    fn build(smile: f32, fail: bool) -> (Arc<Self>, mpsc::UnboundedReceiver<i64>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let detector = Arc::new(Self {
            gate: Semaphore::new(0),
            started: tx,
            classified: Mutex::new(Vec::new()),
            smile,
            fail,
        });
        (detector, rx)
    }

    pub fn classified(&self) -> Vec<i64> {
        self.classified.lock().clone()
    }
}

#[async_trait]
impl FaceDetector for GatedDetector {
    async fn detect(&self, image: &ImageFrame) -> Result<Vec<DetectedFace>, DetectorError> {
        let _ = self.started.send(image.timestamp_millis);
        self.gate.acquire().await.unwrap().forget();
        self.classified.lock().push(image.timestamp_millis);
        if self.fail {
            Err(DetectorError::ClassificationError("detector crashed".into()))
        } else {
            Ok(vec![DetectedFace::smiling(self.smile)])
        }
    }
}

/// Records which frames were released, identified by timestamp
#[derive(Clone, Default)]
pub struct ReleaseLog {
    released: Arc<Mutex<Vec<i64>>>,
}

impl ReleaseLog {
    pub fn lease(&self, id: i64) -> FrameLease {
        let released = Arc::clone(&self.released);
        FrameLease::with_release(ImageFrame::new(vec![0u8; 64], 8, 8).with_timestamp(id), move |image| {
            released.lock().push(image.timestamp_millis);
        })
    }

    pub fn released(&self) -> Vec<i64> {
        self.released.lock().clone()
    }
}

/// Detector that panics on every frame
pub struct PanickingDetector;

#[async_trait]
impl FaceDetector for PanickingDetector {
    async fn detect(&self, image: &ImageFrame) -> Result<Vec<DetectedFace>, DetectorError> {
        panic!("detector crashed on frame @{}ms", image.timestamp_millis);
    }
}
