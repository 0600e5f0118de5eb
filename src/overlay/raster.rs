use std::io::Cursor;
use std::path::Path;

use anyhow::{Context, Result};
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use serde::Serialize;
use tracing::debug;

use super::canvas::{Canvas2D, Color, StrokeStyle, TextStyle};
use crate::capture::VideoFrame;

/// Text drawn onto the surface
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanvasLabel {
    pub text: String,
    pub x: f64,
    pub y: f64,
}

/// In-memory RGBA surface
///
/// Boxes and images are rasterised. The stack has no font rasteriser, so text
/// is kept as label metadata alongside the pixels.
#[derive(Debug, Clone)]
pub struct RasterCanvas {
    pixels: RgbaImage,
    labels: Vec<CanvasLabel>,
}

impl RasterCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: RgbaImage::new(width, height),
            labels: Vec::new(),
        }
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn labels(&self) -> &[CanvasLabel] {
        &self.labels
    }

    /// Encode the surface as PNG
    pub fn encode_png(&self) -> Result<Vec<u8>> {
        let mut out = Cursor::new(Vec::new());
        self.pixels
            .write_to(&mut out, ImageFormat::Png)
            .context("Failed to encode overlay as PNG")?;
        Ok(out.into_inner())
    }

    /// Write the surface to disk; the format follows the file extension
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        DynamicImage::ImageRgba8(self.pixels.clone())
            .to_rgb8()
            .save(path)
            .with_context(|| format!("Failed to save overlay to {}", path.display()))
    }

    /// Fill a rectangle, clipped to the surface
    fn fill_rect(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, color: Rgba<u8>) {
        let x0 = x0.clamp(0, self.pixels.width() as i64) as u32;
        let y0 = y0.clamp(0, self.pixels.height() as i64) as u32;
        let x1 = x1.clamp(0, self.pixels.width() as i64) as u32;
        let y1 = y1.clamp(0, self.pixels.height() as i64) as u32;

        for y in y0..y1 {
            for x in x0..x1 {
                self.pixels.put_pixel(x, y, color);
            }
        }
    }

    fn rgba(color: Color) -> Rgba<u8> {
        Rgba([color.r, color.g, color.b, 0xFF])
    }
}

impl Canvas2D for RasterCanvas {
    fn width(&self) -> u32 {
        self.pixels.width()
    }

    fn height(&self) -> u32 {
        self.pixels.height()
    }

    fn resize(&mut self, width: u32, height: u32) {
        debug!("Canvas resized to {}x{}", width, height);
        self.pixels = RgbaImage::new(width, height);
        self.labels.clear();
    }

    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        let (x0, y0) = (x.floor() as i64, y.floor() as i64);
        let (x1, y1) = ((x + width).ceil() as i64, (y + height).ceil() as i64);
        self.fill_rect(x0, y0, x1, y1, Rgba([0, 0, 0, 0]));

        let covers_surface = x <= 0.0
            && y <= 0.0
            && x + width >= self.pixels.width() as f64
            && y + height >= self.pixels.height() as f64;
        if covers_surface {
            // Labels anchored off-surface (above a box at the top edge) go too.
            self.labels.clear();
        } else {
            self.labels.retain(|label| {
                label.x < x || label.x >= x + width || label.y < y || label.y >= y + height
            });
        }
    }

    fn draw_image(&mut self, frame: &VideoFrame, x: f64, y: f64, width: f64, height: f64) {
        let (w, h) = (width.round().max(0.0) as u32, height.round().max(0.0) as u32);
        if w == 0 || h == 0 {
            return;
        }

        let rgba = DynamicImage::ImageRgb8(frame.image.clone()).to_rgba8();
        let scaled = if (rgba.width(), rgba.height()) == (w, h) {
            rgba
        } else {
            imageops::resize(&rgba, w, h, FilterType::Triangle)
        };

        imageops::replace(&mut self.pixels, &scaled, x.round() as i64, y.round() as i64);
    }

    fn stroke_rect(&mut self, x: f64, y: f64, width: f64, height: f64, style: &StrokeStyle) {
        // The stroke straddles the rectangle's edges, as on a browser canvas.
        let half = style.line_width / 2.0;
        let outer_x0 = (x - half).round() as i64;
        let outer_y0 = (y - half).round() as i64;
        let outer_x1 = (x + width + half).round() as i64;
        let outer_y1 = (y + height + half).round() as i64;
        let inner_x0 = (x + half).round() as i64;
        let inner_y0 = (y + half).round() as i64;
        let inner_x1 = (x + width - half).round() as i64;
        let inner_y1 = (y + height - half).round() as i64;
        let color = Self::rgba(style.color);

        self.fill_rect(outer_x0, outer_y0, outer_x1, inner_y0, color);
        self.fill_rect(outer_x0, inner_y1, outer_x1, outer_y1, color);
        self.fill_rect(outer_x0, inner_y0, inner_x0, inner_y1, color);
        self.fill_rect(inner_x1, inner_y0, outer_x1, inner_y1, color);
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64, _style: &TextStyle) {
        self.labels.push(CanvasLabel {
            text: text.to_string(),
            x,
            y,
        });
    }
}
