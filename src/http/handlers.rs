use super::state::AppState;
use crate::analysis::AnalysisError;
use crate::capture::CameraSession;
use crate::narration::Status;
use crate::orchestrator::{Command, CommandError, CommandOutcome, OrchestratorState};
use crate::overlay::CanvasLabel;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use std::sync::PoisonError;
use tracing::error;

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub state: OrchestratorState,
    pub session: Option<CameraSession>,
    pub status: Status,
    pub overlay_labels: Vec<CanvasLabel>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    /// Narrated status after the failed command
    pub status: Status,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /camera/start
pub async fn start_camera(State(state): State<AppState>) -> Response {
    run(&state, Command::StartCamera).await
}

/// POST /camera/stop
pub async fn stop_camera(State(state): State<AppState>) -> Response {
    run(&state, Command::StopCamera).await
}

/// POST /detect
pub async fn detect(State(state): State<AppState>) -> Response {
    run(&state, Command::Detect).await
}

/// POST /read
pub async fn read_text(State(state): State<AppState>) -> Response {
    run(&state, Command::ReadText).await
}

/// GET /status
pub async fn get_status(State(state): State<AppState>) -> impl IntoResponse {
    let overlay_labels = state
        .overlay
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .labels()
        .to_vec();

    Json(StatusResponse {
        state: state.orchestrator.state(),
        session: state.orchestrator.session(),
        status: state.orchestrator.status(),
        overlay_labels,
    })
}

/// GET /overlay
pub async fn get_overlay(State(state): State<AppState>) -> Response {
    let canvas = state
        .overlay
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();

    let png = tokio::task::spawn_blocking(move || canvas.encode_png())
        .await
        .map_err(anyhow::Error::from)
        .and_then(|encoded| encoded);

    match png {
        Ok(bytes) => (StatusCode::OK, [(header::CONTENT_TYPE, "image/png")], bytes).into_response(),
        Err(e) => {
            error!("Failed to encode overlay: {:#}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("Failed to encode overlay: {}", e),
                    status: state.orchestrator.status(),
                }),
            )
                .into_response()
        }
    }
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

async fn run(state: &AppState, command: Command) -> Response {
    match state.orchestrator.dispatch(command).await {
        Ok(outcome) => (StatusCode::OK, Json::<CommandOutcome>(outcome)).into_response(),
        Err(e) => (
            error_status(&e),
            Json(ErrorResponse {
                error: e.to_string(),
                status: state.orchestrator.status(),
            }),
        )
            .into_response(),
    }
}

fn error_status(err: &CommandError) -> StatusCode {
    match err {
        CommandError::Guard(_) | CommandError::Discarded => StatusCode::CONFLICT,
        CommandError::Camera(_) => StatusCode::SERVICE_UNAVAILABLE,
        CommandError::Analysis(AnalysisError::Cancelled) => StatusCode::CONFLICT,
        CommandError::Analysis(_) => StatusCode::BAD_GATEWAY,
    }
}
