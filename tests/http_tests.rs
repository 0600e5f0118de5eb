// HTTP command surface driven through the router without binding a port

mod common;

use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use common::{cup_detection, FakeCamera, FakeSpeech, MockInference, Reply};
use lifelens::{
    create_router, AppState, CameraConstraints, FrameCapture, NarrationChannel, Orchestrator,
    RasterCanvas, SharedCanvas,
};

async fn app(detect: Reply) -> (Router, MockInference) {
    let mock = MockInference::start(detect, Reply::ok(json!({"text": "EXIT"}))).await;

    let capture = FrameCapture::new(
        Box::new(FakeCamera::granting(320, 240)),
        CameraConstraints::default(),
    );
    let overlay = Arc::new(Mutex::new(RasterCanvas::new(300, 150)));
    let canvas: SharedCanvas = overlay.clone();
    let orchestrator = Arc::new(Orchestrator::new(
        capture,
        mock.client(),
        canvas,
        NarrationChannel::new(Box::new(FakeSpeech::default())),
    ));

    (create_router(AppState::new(orchestrator, overlay)), mock)
}

async fn call(app: &Router, method: &str, uri: &str) -> (StatusCode, Vec<u8>) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, body.to_vec())
}

async fn call_json(app: &Router, method: &str, uri: &str) -> (StatusCode, Value) {
    let (status, body) = call(app, method, uri).await;
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _mock) = app(Reply::ok(cup_detection())).await;

    let (status, body) = call(&app, "GET", "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"OK");
}

#[tokio::test]
async fn test_detect_before_start_is_conflict() {
    let (app, mock) = app(Reply::ok(cup_detection())).await;

    let (status, body) = call_json(&app, "POST", "/detect").await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Please start camera first");
    assert_eq!(body["status"]["severity"], "error");
    assert_eq!(mock.hits(), 0);
}

#[tokio::test]
async fn test_full_command_cycle() {
    let (app, _mock) = app(Reply::ok(cup_detection())).await;

    let (status, body) = call_json(&app, "POST", "/camera/start").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "started");
    assert_eq!(body["session"]["frame_width"], 320);

    let (status, body) = call_json(&app, "POST", "/detect").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["kind"], "detections");
    assert_eq!(body["result"]["value"][0]["label"], "cup");
    assert_eq!(body["result"]["value"][0]["position"], json!([10.0, 20.0, 50.0, 60.0]));

    let (status, body) = call_json(&app, "GET", "/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "ready");
    assert_eq!(body["status"]["message"], "Found 1 objects");
    assert_eq!(body["overlay_labels"][0]["text"], "cup (92%)");

    let (status, body) = call_json(&app, "POST", "/read").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], json!({"kind": "text", "value": "EXIT"}));

    let (status, body) = call_json(&app, "POST", "/camera/stop").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "stopped");

    let (_, body) = call_json(&app, "GET", "/status").await;
    assert_eq!(body["state"], "idle");
    assert!(body["session"].is_null());
}

#[tokio::test]
async fn test_remote_failure_is_bad_gateway() {
    let (app, _mock) = app(Reply::ok(json!({"error": "model unavailable"}))).await;
    call_json(&app, "POST", "/camera/start").await;

    let (status, body) = call_json(&app, "POST", "/detect").await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "model unavailable");
    assert_eq!(body["status"]["message"], "Detection failed: model unavailable");
}

#[tokio::test]
async fn test_overlay_is_served_as_png() {
    let (app, _mock) = app(Reply::ok(cup_detection())).await;
    call_json(&app, "POST", "/camera/start").await;
    call_json(&app, "POST", "/detect").await;

    let response = app
        .clone()
        .oneshot(Request::get("/overlay").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let overlay = image::load_from_memory(&body).unwrap();
    assert_eq!((overlay.width(), overlay.height()), (320, 240));
}
