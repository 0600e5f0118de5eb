// Generated test-pattern camera, used when no real camera is configured

use image::{Rgb, RgbImage};
use std::sync::atomic::{AtomicU32, Ordering};
use tracing::info;

use super::device::{CameraConstraints, CameraDevice, StreamMetadata};
use super::error::CameraError;
use super::frame::VideoFrame;

/// Camera that renders a moving colour gradient at the requested resolution
pub struct SyntheticCamera {
    stream: Option<StreamMetadata>,
    frame_counter: AtomicU32,
}

impl SyntheticCamera {
    pub fn new() -> Self {
        Self {
            stream: None,
            frame_counter: AtomicU32::new(0),
        }
    }
}

impl Default for SyntheticCamera {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl CameraDevice for SyntheticCamera {
    async fn request_stream(&mut self, constraints: &CameraConstraints) -> Result<(), CameraError> {
        if constraints.width == 0 || constraints.height == 0 {
            return Err(CameraError::Constraint(format!(
                "cannot produce {}x{} frames",
                constraints.width, constraints.height
            )));
        }

        self.stream = Some(StreamMetadata {
            width: constraints.width,
            height: constraints.height,
        });

        info!(
            "Synthetic stream started ({}x{})",
            constraints.width, constraints.height
        );

        Ok(())
    }

    async fn stream_metadata(&mut self) -> Result<StreamMetadata, CameraError> {
        self.stream
            .ok_or_else(|| CameraError::Unavailable("no stream requested".to_string()))
    }

    fn grab_frame(&self) -> Result<VideoFrame, CameraError> {
        let stream = self.stream.ok_or(CameraError::NotActive)?;
        let shift = self.frame_counter.fetch_add(1, Ordering::Relaxed) % stream.width;

        let image = RgbImage::from_fn(stream.width, stream.height, |x, y| {
            let r = ((x + shift) % stream.width * 255 / stream.width) as u8;
            let g = (y * 255 / stream.height) as u8;
            Rgb([r, g, 128])
        });

        Ok(VideoFrame::new(image))
    }

    fn stop_tracks(&mut self) {
        if self.stream.take().is_some() {
            info!("Synthetic stream stopped");
        }
    }

    fn name(&self) -> &str {
        "synthetic"
    }
}
