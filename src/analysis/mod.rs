//! Client for the remote inference service
//!
//! - POST /detect_objects - object detection on one frame
//! - POST /read_text - text recognition on one frame
//! - GET /test - service health probe

mod client;
mod error;
pub mod messages;
mod result;

pub use client::{AnalysisClient, AnalysisClientConfig, IMAGE_FIELD};
pub use error::AnalysisError;
pub use messages::{BoundingBox, Detection, HealthResponse};
pub use result::{AnalysisKind, AnalysisResult};
