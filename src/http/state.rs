use std::sync::{Arc, Mutex};

use crate::orchestrator::Orchestrator;
use crate::overlay::RasterCanvas;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,

    /// The surface the orchestrator renders into, for `GET /overlay`
    pub overlay: Arc<Mutex<RasterCanvas>>,
}

impl AppState {
    pub fn new(orchestrator: Arc<Orchestrator>, overlay: Arc<Mutex<RasterCanvas>>) -> Self {
        Self {
            orchestrator,
            overlay,
        }
    }
}
