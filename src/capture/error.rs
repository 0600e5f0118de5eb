use thiserror::Error;

/// Failures raised by the camera capability or by frame capture
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CameraError {
    /// The user or host refused access to the camera
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// No usable camera hardware (or source) was found
    #[error("Camera unavailable: {0}")]
    Unavailable(String),

    /// The device cannot satisfy the requested constraints
    #[error("Unsupported camera constraints: {0}")]
    Constraint(String),

    /// A snapshot was requested without a running session
    #[error("Camera is not active")]
    NotActive,

    #[error("Failed to encode frame: {0}")]
    Encode(String),
}
