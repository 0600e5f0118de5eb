use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Camera control
        .route("/camera/start", post(handlers::start_camera))
        .route("/camera/stop", post(handlers::stop_camera))
        // Analysis
        .route("/detect", post(handlers::detect))
        .route("/read", post(handlers::read_text))
        // Views
        .route("/status", get(handlers::get_status))
        .route("/overlay", get(handlers::get_overlay))
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
