// File-backed camera: replays still images as if they were a live stream

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use image::RgbImage;
use tracing::info;

use super::device::{CameraConstraints, CameraDevice, StreamMetadata};
use super::error::CameraError;
use super::frame::VideoFrame;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Camera that replays an image file, or every image in a directory in name order
///
/// Like a real device it picks its own resolution: the size of the first image.
pub struct FileCamera {
    path: PathBuf,
    frames: Option<Arc<Vec<RgbImage>>>,
    cursor: AtomicUsize,
}

impl FileCamera {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            frames: None,
            cursor: AtomicUsize::new(0),
        }
    }

    fn load(path: &Path) -> Result<Vec<RgbImage>, CameraError> {
        let files = if path.is_dir() {
            let mut files: Vec<PathBuf> = std::fs::read_dir(path)
                .map_err(|e| Self::io_error(path, e))?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| Self::is_image(p))
                .collect();
            files.sort();
            files
        } else {
            vec![path.to_path_buf()]
        };

        let mut frames = Vec::with_capacity(files.len());
        for file in &files {
            let decoded = image::open(file).map_err(|e| match e {
                image::ImageError::IoError(io) => Self::io_error(file, io),
                other => CameraError::Unavailable(format!(
                    "cannot decode {}: {}",
                    file.display(),
                    other
                )),
            })?;
            frames.push(decoded.to_rgb8());
        }

        if frames.is_empty() {
            return Err(CameraError::Unavailable(format!(
                "no images found in {}",
                path.display()
            )));
        }

        Ok(frames)
    }

    fn is_image(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
    }

    fn io_error(path: &Path, err: std::io::Error) -> CameraError {
        match err.kind() {
            ErrorKind::PermissionDenied => {
                CameraError::PermissionDenied(format!("cannot read {}", path.display()))
            }
            _ => CameraError::Unavailable(format!("{}: {}", path.display(), err)),
        }
    }
}

#[async_trait::async_trait]
impl CameraDevice for FileCamera {
    async fn request_stream(&mut self, constraints: &CameraConstraints) -> Result<(), CameraError> {
        if !self.path.exists() {
            return Err(CameraError::Unavailable(format!(
                "no image source at {}",
                self.path.display()
            )));
        }

        let path = self.path.clone();
        let frames = tokio::task::spawn_blocking(move || Self::load(&path))
            .await
            .map_err(|e| CameraError::Unavailable(format!("image loader failed: {}", e)))??;

        info!(
            "File stream opened: {} ({} frame(s), requested {}x{})",
            self.path.display(),
            frames.len(),
            constraints.width,
            constraints.height
        );

        self.cursor.store(0, Ordering::Relaxed);
        self.frames = Some(Arc::new(frames));
        Ok(())
    }

    async fn stream_metadata(&mut self) -> Result<StreamMetadata, CameraError> {
        let first = self
            .frames
            .as_ref()
            .and_then(|frames| frames.first())
            .ok_or_else(|| CameraError::Unavailable("no stream requested".to_string()))?;

        Ok(StreamMetadata {
            width: first.width(),
            height: first.height(),
        })
    }

    fn grab_frame(&self) -> Result<VideoFrame, CameraError> {
        let frames = self.frames.as_ref().ok_or(CameraError::NotActive)?;
        let index = self.cursor.fetch_add(1, Ordering::Relaxed) % frames.len();
        Ok(VideoFrame::new(frames[index].clone()))
    }

    fn stop_tracks(&mut self) {
        if self.frames.take().is_none() {
            return;
        }
        info!("File stream closed: {}", self.path.display());
    }

    fn name(&self) -> &str {
        "file"
    }
}
