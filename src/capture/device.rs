use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::error::CameraError;
use super::file::FileCamera;
use super::frame::VideoFrame;
use super::synthetic::SyntheticCamera;

/// Which way the requested camera should face
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    /// Rear-facing camera (what the user is looking at)
    Environment,
    /// Front-facing camera
    User,
}

/// Stream request sent to a camera device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraConstraints {
    /// Facing-mode hint; devices may ignore it
    pub facing_mode: FacingMode,
    /// Preferred frame width in pixels
    pub width: u32,
    /// Preferred frame height in pixels
    pub height: u32,
}

impl Default for CameraConstraints {
    fn default() -> Self {
        Self {
            facing_mode: FacingMode::Environment,
            width: 1280,
            height: 720,
        }
    }
}

/// Stream properties reported by the device once the stream is live
///
/// The device may pick a resolution other than the one requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamMetadata {
    pub width: u32,
    pub height: u32,
}

/// Camera capability trait
///
/// Implementations:
/// - `SyntheticCamera`: generated test pattern (demos, no hardware needed)
/// - `FileCamera`: replays still images from disk (testing/batch processing)
#[async_trait::async_trait]
pub trait CameraDevice: Send + Sync {
    /// Request a video stream matching the constraints
    async fn request_stream(&mut self, constraints: &CameraConstraints) -> Result<(), CameraError>;

    /// Wait for the live stream's metadata
    async fn stream_metadata(&mut self) -> Result<StreamMetadata, CameraError>;

    /// Copy the frame currently shown by the stream
    fn grab_frame(&self) -> Result<VideoFrame, CameraError>;

    /// Stop all tracks of the current stream. Must be safe to call without a stream.
    fn stop_tracks(&mut self);

    /// Get device name for logging
    fn name(&self) -> &str;
}

/// Camera source type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CameraSource {
    /// Generated test pattern
    Synthetic,
    /// Image file or directory of images
    File(PathBuf),
}

/// Camera device factory
pub struct CameraDeviceFactory;

impl CameraDeviceFactory {
    /// Create a camera device for the configured source
    pub fn create(source: CameraSource) -> Box<dyn CameraDevice> {
        match source {
            CameraSource::Synthetic => Box::new(SyntheticCamera::new()),
            CameraSource::File(path) => Box::new(FileCamera::new(path)),
        }
    }
}
