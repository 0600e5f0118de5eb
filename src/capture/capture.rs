use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use super::device::{CameraConstraints, CameraDevice};
use super::error::CameraError;
use super::frame::{EncodedFrame, VideoFrame};

/// Default JPEG quality for submitted frames
const DEFAULT_JPEG_QUALITY: u8 = 85;

/// A live camera session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CameraSession {
    /// Unique per acquisition; lets callers detect a torn-down session
    pub id: Uuid,

    /// Whether the stream is currently live
    pub active: bool,

    /// Actual frame width reported by the device
    pub frame_width: u32,

    /// Actual frame height reported by the device
    pub frame_height: u32,

    /// When the stream became ready
    pub started_at: DateTime<Utc>,
}

/// A still frame together with its encoded form
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Session the frame was taken from
    pub session_id: Uuid,
    /// Raw frame, in the session's coordinate space
    pub still: VideoFrame,
    /// JPEG payload of `still`
    pub encoded: EncodedFrame,
}

/// Owns the camera device and the current session
pub struct FrameCapture {
    device: Box<dyn CameraDevice>,
    constraints: CameraConstraints,
    jpeg_quality: u8,
    session: Option<CameraSession>,
}

impl FrameCapture {
    pub fn new(device: Box<dyn CameraDevice>, constraints: CameraConstraints) -> Self {
        Self {
            device,
            constraints,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            session: None,
        }
    }

    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality.clamp(1, 100);
        self
    }

    /// Acquire the camera and wait until the stream reports its size
    pub async fn start(&mut self) -> Result<CameraSession, CameraError> {
        if let Some(session) = &self.session {
            warn!("Camera already started");
            return Ok(session.clone());
        }

        info!(
            "Requesting {} camera ({:?}, {}x{})",
            self.device.name(),
            self.constraints.facing_mode,
            self.constraints.width,
            self.constraints.height
        );

        self.device.request_stream(&self.constraints).await?;

        let metadata = match self.device.stream_metadata().await {
            Ok(metadata) if metadata.width > 0 && metadata.height > 0 => metadata,
            Ok(metadata) => {
                self.device.stop_tracks();
                return Err(CameraError::Unavailable(format!(
                    "stream reported an empty frame size ({}x{})",
                    metadata.width, metadata.height
                )));
            }
            Err(e) => {
                self.device.stop_tracks();
                return Err(e);
            }
        };

        let session = CameraSession {
            id: Uuid::new_v4(),
            active: true,
            frame_width: metadata.width,
            frame_height: metadata.height,
            started_at: Utc::now(),
        };

        info!(
            "Camera session {} ready ({}x{})",
            session.id, session.frame_width, session.frame_height
        );

        self.session = Some(session.clone());
        Ok(session)
    }

    /// Release the camera. Does nothing when no session exists.
    pub fn stop(&mut self) {
        if let Some(session) = self.session.take() {
            self.device.stop_tracks();
            info!("Camera session {} stopped", session.id);
        }
    }

    /// Encode the current frame
    pub fn snapshot(&self) -> Result<EncodedFrame, CameraError> {
        self.grab().map(|snapshot| snapshot.encoded)
    }

    /// Copy the current frame and encode it, keeping the raw still
    pub fn grab(&self) -> Result<Snapshot, CameraError> {
        let (session_id, still) = self.grab_still()?;
        let encoded = still.encode_jpeg(self.jpeg_quality)?;

        Ok(Snapshot {
            session_id,
            still,
            encoded,
        })
    }

    /// Copy the current frame in session coordinates, without encoding it
    pub fn grab_still(&self) -> Result<(Uuid, VideoFrame), CameraError> {
        let session = self.session.as_ref().ok_or(CameraError::NotActive)?;

        let mut still = self.device.grab_frame()?;
        if still.width() != session.frame_width || still.height() != session.frame_height {
            warn!(
                "Device frame {}x{} differs from session {}x{}, rescaling",
                still.width(),
                still.height(),
                session.frame_width,
                session.frame_height
            );
            still = still.resized(session.frame_width, session.frame_height);
        }

        Ok((session.id, still))
    }

    pub fn jpeg_quality(&self) -> u8 {
        self.jpeg_quality
    }

    pub fn session(&self) -> Option<&CameraSession> {
        self.session.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.active)
    }

    pub fn device_name(&self) -> &str {
        self.device.name()
    }
}
