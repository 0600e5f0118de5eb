//! Detection overlay
//!
//! `OverlayRenderer` paints a frame and its detections onto any `Canvas2D`
//! surface, in the frame's own pixel coordinates. `RasterCanvas` is the
//! in-memory surface used by the binary.

mod canvas;
mod raster;
mod renderer;

pub use canvas::{Canvas2D, Color, SharedCanvas, StrokeStyle, TextStyle};
pub use raster::{CanvasLabel, RasterCanvas};
pub use renderer::OverlayRenderer;
