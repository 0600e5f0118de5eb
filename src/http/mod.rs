//! HTTP command surface
//!
//! The four user triggers plus read-only views of the session:
//! - POST /camera/start - Acquire the camera
//! - POST /camera/stop - Release the camera
//! - POST /detect - Run object detection on the current frame
//! - POST /read - Run text recognition on the current frame
//! - GET /status - State, session and narrated status line
//! - GET /overlay - Presentation surface as PNG
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
