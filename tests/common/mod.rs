// Shared fakes for integration tests: camera, canvas, speech and a mock
// inference service bound to an ephemeral port.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use image::RgbImage;
use serde_json::{json, Value};

use lifelens::capture::{CameraConstraints, CameraDevice, CameraError, StreamMetadata, VideoFrame};
use lifelens::narration::{SpeechError, SpeechOutput};
use lifelens::overlay::{Canvas2D, SharedCanvas, StrokeStyle, TextStyle};
use lifelens::{
    AnalysisClient, AnalysisClientConfig, FrameCapture, NarrationChannel, Orchestrator,
};

// ============================================================================
// Camera
// ============================================================================

#[derive(Debug, Default)]
pub struct CameraCalls {
    pub requested: Mutex<Vec<CameraConstraints>>,
    pub stops: AtomicUsize,
    pub grabs: AtomicUsize,
}

/// Camera whose outcome is scripted per test
pub struct FakeCamera {
    request_error: Option<CameraError>,
    metadata: Result<StreamMetadata, CameraError>,
    streaming: bool,
    pub calls: Arc<CameraCalls>,
}

impl FakeCamera {
    /// Device that grants the stream at the given size
    pub fn granting(width: u32, height: u32) -> Self {
        Self {
            request_error: None,
            metadata: Ok(StreamMetadata { width, height }),
            streaming: false,
            calls: Arc::new(CameraCalls::default()),
        }
    }

    /// Device that refuses the stream request
    pub fn refusing(error: CameraError) -> Self {
        Self {
            request_error: Some(error),
            ..Self::granting(0, 0)
        }
    }

    /// Device that grants the stream but never reports usable metadata
    pub fn without_metadata(error: CameraError) -> Self {
        Self {
            metadata: Err(error),
            ..Self::granting(0, 0)
        }
    }
}

#[async_trait::async_trait]
impl CameraDevice for FakeCamera {
    async fn request_stream(&mut self, constraints: &CameraConstraints) -> Result<(), CameraError> {
        self.calls.requested.lock().unwrap().push(constraints.clone());
        if let Some(err) = &self.request_error {
            return Err(err.clone());
        }
        self.streaming = true;
        Ok(())
    }

    async fn stream_metadata(&mut self) -> Result<StreamMetadata, CameraError> {
        self.metadata.clone()
    }

    fn grab_frame(&self) -> Result<VideoFrame, CameraError> {
        if !self.streaming {
            return Err(CameraError::NotActive);
        }
        self.calls.grabs.fetch_add(1, Ordering::SeqCst);
        let metadata = self.metadata.clone()?;
        Ok(VideoFrame::new(RgbImage::new(metadata.width, metadata.height)))
    }

    fn stop_tracks(&mut self) {
        self.streaming = false;
        self.calls.stops.fetch_add(1, Ordering::SeqCst);
    }

    fn name(&self) -> &str {
        "fake"
    }
}

// ============================================================================
// Canvas
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Resize { width: u32, height: u32 },
    Clear { x: f64, y: f64, width: f64, height: f64 },
    Image { x: f64, y: f64, width: f64, height: f64, frame_width: u32, frame_height: u32 },
    Rect { x: f64, y: f64, width: f64, height: f64 },
    Text { text: String, x: f64, y: f64 },
}

/// Canvas that records every call
pub struct RecordingCanvas {
    width: u32,
    height: u32,
    pub ops: Vec<DrawOp>,
}

impl RecordingCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ops: Vec::new(),
        }
    }

    pub fn rects(&self) -> Vec<&DrawOp> {
        self.ops.iter().filter(|op| matches!(op, DrawOp::Rect { .. })).collect()
    }

    pub fn texts(&self) -> Vec<&DrawOp> {
        self.ops.iter().filter(|op| matches!(op, DrawOp::Text { .. })).collect()
    }
}

impl Canvas2D for RecordingCanvas {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.ops.push(DrawOp::Resize { width, height });
    }

    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.ops.push(DrawOp::Clear { x, y, width, height });
    }

    fn draw_image(&mut self, frame: &VideoFrame, x: f64, y: f64, width: f64, height: f64) {
        self.ops.push(DrawOp::Image {
            x,
            y,
            width,
            height,
            frame_width: frame.width(),
            frame_height: frame.height(),
        });
    }

    fn stroke_rect(&mut self, x: f64, y: f64, width: f64, height: f64, _style: &StrokeStyle) {
        self.ops.push(DrawOp::Rect { x, y, width, height });
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64, _style: &TextStyle) {
        self.ops.push(DrawOp::Text {
            text: text.to_string(),
            x,
            y,
        });
    }
}

// ============================================================================
// Speech
// ============================================================================

#[derive(Debug, Default)]
pub struct SpeechLog {
    /// Utterance still "playing"
    pub speaking: Option<String>,
    /// Every utterance started, in order
    pub spoken: Vec<String>,
    /// Utterances cut off before finishing
    pub cancelled: Vec<String>,
}

/// Speech output whose utterances keep playing until `finish` is called
#[derive(Clone, Default)]
pub struct FakeSpeech {
    pub log: Arc<Mutex<SpeechLog>>,
}

impl FakeSpeech {
    pub fn finish(&self) {
        self.log.lock().unwrap().speaking = None;
    }

    pub fn speaking(&self) -> Option<String> {
        self.log.lock().unwrap().speaking.clone()
    }

    pub fn spoken(&self) -> Vec<String> {
        self.log.lock().unwrap().spoken.clone()
    }

    pub fn cancelled(&self) -> Vec<String> {
        self.log.lock().unwrap().cancelled.clone()
    }
}

impl SpeechOutput for FakeSpeech {
    fn is_speaking(&self) -> bool {
        self.log.lock().unwrap().speaking.is_some()
    }

    fn cancel(&self) {
        let mut log = self.log.lock().unwrap();
        if let Some(text) = log.speaking.take() {
            log.cancelled.push(text);
        }
    }

    fn speak(&self, text: &str) -> Result<(), SpeechError> {
        let mut log = self.log.lock().unwrap();
        log.speaking = Some(text.to_string());
        log.spoken.push(text.to_string());
        Ok(())
    }

    fn name(&self) -> &str {
        "fake"
    }
}

// ============================================================================
// Mock inference service
// ============================================================================

#[derive(Debug, Clone)]
pub struct Reply {
    pub status: StatusCode,
    pub body: Value,
    pub delay: Option<Duration>,
}

impl Reply {
    pub fn ok(body: Value) -> Self {
        Self {
            status: StatusCode::OK,
            body,
            delay: None,
        }
    }

    pub fn with_status(status: StatusCode, body: Value) -> Self {
        Self {
            status,
            body,
            delay: None,
        }
    }

    /// Never answers within a test's lifetime
    pub fn hang() -> Self {
        Self {
            delay: Some(Duration::from_secs(3600)),
            ..Self::ok(json!({"objects": []}))
        }
    }
}

/// One multipart field received by the mock
#[derive(Debug, Clone)]
pub struct Upload {
    pub endpoint: &'static str,
    pub field: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub len: usize,
}

struct MockState {
    detect: Reply,
    read: Reply,
    hits: AtomicUsize,
    uploads: Mutex<Vec<Upload>>,
}

pub struct MockInference {
    pub base_url: String,
    state: Arc<MockState>,
}

impl MockInference {
    pub async fn start(detect: Reply, read: Reply) -> Self {
        let state = Arc::new(MockState {
            detect,
            read,
            hits: AtomicUsize::new(0),
            uploads: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route(
                "/detect_objects",
                post(|State(s): State<Arc<MockState>>, multipart: Multipart| async move {
                    let reply = s.detect.clone();
                    respond(s, "/detect_objects", reply, multipart).await
                }),
            )
            .route(
                "/read_text",
                post(|State(s): State<Arc<MockState>>, multipart: Multipart| async move {
                    let reply = s.read.clone();
                    respond(s, "/read_text", reply, multipart).await
                }),
            )
            .route(
                "/test",
                get(|| async {
                    Json(json!({"status": "success", "message": "Backend is working"}))
                }),
            )
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
        }
    }

    pub fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }

    pub fn uploads(&self) -> Vec<Upload> {
        self.state.uploads.lock().unwrap().clone()
    }

    pub fn client(&self) -> AnalysisClient {
        client_for(&self.base_url)
    }
}

async fn respond(
    state: Arc<MockState>,
    endpoint: &'static str,
    reply: Reply,
    mut multipart: Multipart,
) -> (StatusCode, Json<Value>) {
    state.hits.fetch_add(1, Ordering::SeqCst);

    let mut saw_image = false;
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let len = field.bytes().await.map(|b| b.len()).unwrap_or(0);

        saw_image |= name == "image" && len > 0;
        state.uploads.lock().unwrap().push(Upload {
            endpoint,
            field: name,
            file_name,
            content_type,
            len,
        });
    }

    if !saw_image {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "No image provided"})),
        );
    }

    if let Some(delay) = reply.delay {
        tokio::time::sleep(delay).await;
    }

    (reply.status, Json(reply.body))
}

pub fn client_for(base_url: &str) -> AnalysisClient {
    AnalysisClient::new(AnalysisClientConfig {
        base_url: base_url.to_string(),
        request_timeout: None,
    })
    .unwrap()
}

/// Base URL of a port nobody is listening on
pub async fn unreachable_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

// ============================================================================
// Harness
// ============================================================================

pub struct Harness {
    pub orchestrator: Arc<Orchestrator>,
    pub canvas: Arc<Mutex<RecordingCanvas>>,
    pub speech: FakeSpeech,
    pub camera: Arc<CameraCalls>,
    pub mock: MockInference,
}

impl Harness {
    pub async fn new(camera: FakeCamera, detect: Reply, read: Reply) -> Self {
        let mock = MockInference::start(detect, read).await;
        Self::with_client(camera, mock.client(), mock)
    }

    pub fn with_client(camera: FakeCamera, client: AnalysisClient, mock: MockInference) -> Self {
        let calls = camera.calls.clone();
        let capture = FrameCapture::new(Box::new(camera), CameraConstraints::default());

        let canvas = Arc::new(Mutex::new(RecordingCanvas::new(300, 150)));
        let shared: SharedCanvas = canvas.clone();

        let speech = FakeSpeech::default();
        let narration = NarrationChannel::new(Box::new(speech.clone()));

        Self {
            orchestrator: Arc::new(Orchestrator::new(capture, client, shared, narration)),
            canvas,
            speech,
            camera: calls,
            mock,
        }
    }

    pub fn canvas_ops(&self) -> Vec<DrawOp> {
        self.canvas.lock().unwrap().ops.clone()
    }

    pub async fn wait_until_busy(&self) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while self.orchestrator.state() != lifelens::OrchestratorState::Busy {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("orchestrator never became busy");
    }
}

pub fn cup_detection() -> Value {
    json!({"objects": [{"label": "cup", "confidence": 0.92, "position": [10, 20, 50, 60]}]})
}
