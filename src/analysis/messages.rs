use serde::{Deserialize, Serialize};

/// Axis-aligned box in source-frame pixels
///
/// On the wire this is the array `[x, y, width, height]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl From<[f64; 4]> for BoundingBox {
    fn from([x, y, width, height]: [f64; 4]) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

impl From<BoundingBox> for [f64; 4] {
    fn from(b: BoundingBox) -> Self {
        [b.x, b.y, b.width, b.height]
    }
}

/// One labelled region returned by object detection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub label: String,

    /// Confidence score (0.0 to 1.0)
    pub confidence: f64,

    pub position: BoundingBox,

    /// Rough relative distance estimate, if the service provides one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
}

impl Detection {
    /// Overlay caption, e.g. `cup (92%)`
    pub fn caption(&self) -> String {
        format!("{} ({}%)", self.label, (self.confidence * 100.0).round() as i64)
    }
}

/// Success body of `POST /detect_objects`
#[derive(Debug, Serialize, Deserialize)]
pub struct DetectObjectsResponse {
    pub objects: Vec<Detection>,
}

/// Success body of `POST /read_text`
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ReadTextResponse {
    #[serde(default)]
    pub text: Option<String>,
}

/// Body of `GET /test`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default)]
    pub message: String,
}
