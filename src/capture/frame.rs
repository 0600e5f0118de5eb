use chrono::{DateTime, Utc};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::RgbImage;

use super::error::CameraError;

pub const JPEG_MIME: &str = "image/jpeg";

/// A single still copied from the live stream
#[derive(Debug, Clone)]
pub struct VideoFrame {
    /// Raw RGB pixels
    pub image: RgbImage,
    /// When the frame was copied from the stream
    pub captured_at: DateTime<Utc>,
}

impl VideoFrame {
    pub fn new(image: RgbImage) -> Self {
        Self {
            image,
            captured_at: Utc::now(),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Rescale to the given size, keeping the capture timestamp
    pub fn resized(&self, width: u32, height: u32) -> Self {
        Self {
            image: imageops::resize(&self.image, width, height, FilterType::Triangle),
            captured_at: self.captured_at,
        }
    }

    /// Encode as JPEG at the given quality (1-100)
    pub fn encode_jpeg(&self, quality: u8) -> Result<EncodedFrame, CameraError> {
        let mut bytes = Vec::new();
        JpegEncoder::new_with_quality(&mut bytes, quality.clamp(1, 100))
            .encode_image(&self.image)
            .map_err(|e| CameraError::Encode(e.to_string()))?;

        Ok(EncodedFrame {
            bytes,
            mime: JPEG_MIME.to_string(),
            width: self.width(),
            height: self.height(),
        })
    }

    /// Encode on the blocking pool, handing the frame back with its JPEG
    pub async fn encode_jpeg_off_thread(
        self,
        quality: u8,
    ) -> Result<(VideoFrame, EncodedFrame), CameraError> {
        tokio::task::spawn_blocking(move || {
            let encoded = self.encode_jpeg(quality)?;
            Ok((self, encoded))
        })
        .await
        .map_err(|e| CameraError::Encode(format!("encoder task failed: {}", e)))?
    }
}

/// Encoded still ready for submission
///
/// Consumed by value when a request is sent; nothing keeps a copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedFrame {
    pub bytes: Vec<u8>,
    pub mime: String,
    /// Pixel size the frame was encoded at
    pub width: u32,
    pub height: u32,
}

impl EncodedFrame {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
