use std::sync::{Arc, Mutex};

use crate::capture::VideoFrame;

/// RGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const GREEN: Color = Color::rgb(0x00, 0xFF, 0x00);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    pub color: Color,
    pub line_width: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub color: Color,
    /// CSS-style font shorthand, e.g. `16px Arial`
    pub font: &'static str,
}

/// 2D drawing surface capability
///
/// Coordinates are surface pixels with the origin at the top-left corner,
/// mirroring a browser canvas context.
pub trait Canvas2D: Send {
    /// Declared surface width
    fn width(&self) -> u32;

    /// Declared surface height
    fn height(&self) -> u32;

    /// Change the declared size. Clears the surface.
    fn resize(&mut self, width: u32, height: u32);

    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64);

    /// Draw a frame scaled into the given rectangle
    fn draw_image(&mut self, frame: &VideoFrame, x: f64, y: f64, width: f64, height: f64);

    fn stroke_rect(&mut self, x: f64, y: f64, width: f64, height: f64, style: &StrokeStyle);

    /// Draw text with its baseline starting at `(x, y)`
    fn fill_text(&mut self, text: &str, x: f64, y: f64, style: &TextStyle);
}

/// Surface shared between the orchestrator and whatever presents it
pub type SharedCanvas = Arc<Mutex<dyn Canvas2D>>;
