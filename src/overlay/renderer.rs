use tracing::debug;

use super::canvas::{Canvas2D, Color, StrokeStyle, TextStyle};
use crate::analysis::Detection;
use crate::capture::VideoFrame;

/// Paints a frame and its detections onto a surface
#[derive(Debug, Clone)]
pub struct OverlayRenderer {
    box_style: StrokeStyle,
    label_style: TextStyle,
    /// Gap between a box's top edge and its label baseline
    label_offset: f64,
}

impl Default for OverlayRenderer {
    fn default() -> Self {
        Self {
            box_style: StrokeStyle {
                color: Color::GREEN,
                line_width: 3.0,
            },
            label_style: TextStyle {
                color: Color::GREEN,
                font: "16px Arial",
            },
            label_offset: 5.0,
        }
    }
}

impl OverlayRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear the surface, draw `frame` as background, then one box and one
    /// label per detection in input order
    ///
    /// Positions are used as-is: the surface must share the frame's
    /// coordinate space.
    pub fn render(&self, canvas: &mut dyn Canvas2D, frame: &VideoFrame, detections: &[Detection]) {
        let width = canvas.width() as f64;
        let height = canvas.height() as f64;

        canvas.clear_rect(0.0, 0.0, width, height);
        canvas.draw_image(frame, 0.0, 0.0, width, height);

        for detection in detections {
            let b = detection.position;
            canvas.stroke_rect(b.x, b.y, b.width, b.height, &self.box_style);
            canvas.fill_text(
                &detection.caption(),
                b.x,
                b.y - self.label_offset,
                &self.label_style,
            );
        }

        debug!(
            "Rendered {} detection(s) on {}x{} surface",
            detections.len(),
            width,
            height
        );
    }
}
