//! Camera lifecycle and frame capture
//!
//! This module owns everything between the host camera and an encoded still:
//! - `CameraDevice` capability trait and its factory
//! - `FrameCapture`, which holds the active `CameraSession`
//! - JPEG encoding of point-in-time snapshots

mod capture;
pub mod device;
mod error;
pub mod file;
mod frame;
pub mod synthetic;

pub use capture::{CameraSession, FrameCapture, Snapshot};
pub use device::{
    CameraConstraints, CameraDevice, CameraDeviceFactory, CameraSource, FacingMode,
    StreamMetadata,
};
pub use error::CameraError;
pub use frame::{EncodedFrame, VideoFrame, JPEG_MIME};
