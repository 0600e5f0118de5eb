use serde::Serialize;

use super::messages::Detection;

/// The two remote operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    DetectObjects,
    ReadText,
}

impl AnalysisKind {
    pub fn endpoint(self) -> &'static str {
        match self {
            AnalysisKind::DetectObjects => "/detect_objects",
            AnalysisKind::ReadText => "/read_text",
        }
    }

    /// Status announced while the request is in flight
    pub fn progress_message(self) -> &'static str {
        match self {
            AnalysisKind::DetectObjects => "Detecting objects...",
            AnalysisKind::ReadText => "Reading text...",
        }
    }

    pub fn failure_prefix(self) -> &'static str {
        match self {
            AnalysisKind::DetectObjects => "Detection failed",
            AnalysisKind::ReadText => "Text recognition failed",
        }
    }
}

/// Outcome of one analysis command
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AnalysisResult {
    Detections(Vec<Detection>),
    Text(String),
    Failure(String),
}

impl AnalysisResult {
    /// What gets announced for this result
    pub fn summary(&self) -> String {
        match self {
            AnalysisResult::Detections(objects) => format!("Found {} objects", objects.len()),
            AnalysisResult::Text(text) if text.trim().is_empty() => "No text found".to_string(),
            AnalysisResult::Text(text) => text.clone(),
            AnalysisResult::Failure(reason) => reason.clone(),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, AnalysisResult::Failure(_))
    }
}
