use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::analysis::{AnalysisError, AnalysisKind, AnalysisResult};
use crate::capture::{CameraError, CameraSession};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrchestratorState {
    /// No camera session
    Idle,
    /// Camera running, nothing in flight
    Ready,
    /// One analysis request in flight
    Busy,
}

impl fmt::Display for OrchestratorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OrchestratorState::Idle => "idle",
            OrchestratorState::Ready => "ready",
            OrchestratorState::Busy => "busy",
        };
        f.write_str(name)
    }
}

/// The four user triggers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    StartCamera,
    Detect,
    ReadText,
    StopCamera,
}

impl Command {
    pub fn analysis_kind(self) -> Option<AnalysisKind> {
        match self {
            Command::Detect => Some(AnalysisKind::DetectObjects),
            Command::ReadText => Some(AnalysisKind::ReadText),
            Command::StartCamera | Command::StopCamera => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown command '{0}' (expected start, detect, read or stop)")]
pub struct UnknownCommand(pub String);

impl FromStr for Command {
    type Err = UnknownCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "start" | "start_camera" => Ok(Command::StartCamera),
            "detect" => Ok(Command::Detect),
            "read" | "read_text" => Ok(Command::ReadText),
            "stop" | "stop_camera" => Ok(Command::StopCamera),
            other => Err(UnknownCommand(other.to_string())),
        }
    }
}

/// A command issued in a state that does not allow it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GuardViolation {
    #[error("Please start camera first")]
    CameraNotStarted,

    #[error("Camera is already running")]
    CameraAlreadyRunning,

    #[error("Analysis already in progress")]
    AnalysisInProgress,
}

/// Why a command did not complete
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error(transparent)]
    Guard(#[from] GuardViolation),

    #[error("Camera error: {0}")]
    Camera(#[from] CameraError),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    /// The camera session ended while the request was in flight
    #[error("session stopped before the result arrived")]
    Discarded,
}

/// What a successful command produced
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CommandOutcome {
    Started { session: CameraSession },
    Stopped,
    Analyzed { result: AnalysisResult },
}
