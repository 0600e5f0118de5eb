pub mod analysis;
pub mod capture;
pub mod config;
pub mod http;
pub mod narration;
pub mod orchestrator;
pub mod overlay;

pub use analysis::{
    AnalysisClient, AnalysisClientConfig, AnalysisError, AnalysisKind, AnalysisResult,
    BoundingBox, Detection,
};
pub use capture::{
    CameraConstraints, CameraDevice, CameraDeviceFactory, CameraError, CameraSession,
    CameraSource, EncodedFrame, FacingMode, FrameCapture, StreamMetadata, VideoFrame,
};
pub use config::Config;
pub use http::{create_router, AppState};
pub use narration::{CommandSpeech, ConsoleSpeech, NarrationChannel, Severity, SpeechOutput, Status};
pub use orchestrator::{Command, CommandError, CommandOutcome, GuardViolation, Orchestrator, OrchestratorState};
pub use overlay::{Canvas2D, OverlayRenderer, RasterCanvas, SharedCanvas};
