// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Endpoint tests for POST /describe-image
//!
//! These tests drive the full router against a stub VLM backend on an
//! ephemeral port and verify:
//! - Validation rejects bad media types and oversized uploads before any
//!   scratch file is written
//! - A successful upstream call returns the description and leaves no
//!   scratch file behind
//! - Upstream errors map to 502 with the upstream message embedded
//! - Upstream delays beyond the processing budget map to 504
//! - The error envelope always has the {"error": ...} shape

use std::path::Path;
use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use fabstir_vision_gateway::{
    api::describe_image::request::MAX_UPLOAD_BYTES,
    api::{build_router, AppState},
    config::GatewayConfig,
    storage::ScratchStore,
    vision::VlmClient,
};

/// How the stub VLM backend answers POST /api/chat
#[derive(Clone)]
enum StubBehavior {
    /// 200 with a chat response carrying this description
    Success(&'static str),
    /// 500 with an Ollama-style {"error": ...} body
    UpstreamError(&'static str),
    /// Sleep before answering, to trip the gateway timeout
    Delay(Duration),
}

/// Serve a stub Ollama backend on an ephemeral port, returning its base URL
async fn spawn_stub(behavior: StubBehavior) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let app = Router::new()
        .route("/", get(|| async { "Ollama is running" }))
        .route(
            "/api/chat",
            post(move || {
                let behavior = behavior.clone();
                async move {
                    match behavior {
                        StubBehavior::Success(text) => (
                            StatusCode::OK,
                            Json(json!({
                                "model": "llava:13b",
                                "message": {"role": "assistant", "content": text},
                                "done": true,
                            })),
                        ),
                        StubBehavior::UpstreamError(message) => (
                            StatusCode::INTERNAL_SERVER_ERROR,
                            Json(json!({"error": message})),
                        ),
                        StubBehavior::Delay(delay) => {
                            tokio::time::sleep(delay).await;
                            (
                                StatusCode::OK,
                                Json(json!({
                                    "model": "llava:13b",
                                    "message": {"role": "assistant", "content": "Too late."},
                                    "done": true,
                                })),
                            )
                        }
                    }
                }
            }),
        );

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

/// Build gateway state against `endpoint` with a fresh scratch directory
async fn test_state(endpoint: &str, timeout: Duration) -> (AppState, tempfile::TempDir) {
    let scratch_dir = tempfile::tempdir().unwrap();
    let config = GatewayConfig {
        api_port: 0,
        scratch_dir: scratch_dir.path().to_path_buf(),
        vlm_endpoint: endpoint.to_string(),
        vlm_model: "llava:13b".to_string(),
        processing_timeout: timeout,
    };
    let scratch = ScratchStore::init(&config.scratch_dir).await.unwrap();
    let vlm = VlmClient::new(&config.vlm_endpoint, &config.vlm_model);
    (AppState::new(config, vlm, scratch), scratch_dir)
}

/// Build a multipart POST /describe-image request with a single file field
fn multipart_request(filename: &str, media_type: &str, bytes: &[u8]) -> Request<Body> {
    let boundary = "gateway-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
             Content-Type: {media_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/describe-image")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn response_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn scratch_is_empty(dir: &Path) -> bool {
    std::fs::read_dir(dir).unwrap().next().is_none()
}

#[tokio::test]
async fn test_unsupported_media_type_rejected() {
    let endpoint = spawn_stub(StubBehavior::Success("A cat.")).await;
    let (state, scratch_dir) = test_state(&endpoint, Duration::from_secs(30)).await;
    let app = build_router(state);

    let response = app
        .oneshot(multipart_request("notes.txt", "text/plain", b"not an image"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("Unsupported file type"));
    assert!(
        scratch_is_empty(scratch_dir.path()),
        "No scratch file may be created for a rejected media type"
    );
}

#[tokio::test]
async fn test_payload_too_large_rejected() {
    let endpoint = spawn_stub(StubBehavior::Success("A cat.")).await;
    let (state, scratch_dir) = test_state(&endpoint, Duration::from_secs(30)).await;
    let app = build_router(state);

    let oversized = vec![0u8; MAX_UPLOAD_BYTES + 1];
    let response = app
        .oneshot(multipart_request("big.png", "image/png", &oversized))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let body = response_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("File too large"));
    assert!(
        scratch_is_empty(scratch_dir.path()),
        "No scratch file may be created for an oversized upload"
    );
}

#[tokio::test]
async fn test_missing_file_field_rejected() {
    let endpoint = spawn_stub(StubBehavior::Success("A cat.")).await;
    let (state, _scratch_dir) = test_state(&endpoint, Duration::from_secs(30)).await;
    let app = build_router(state);

    let boundary = "gateway-test-boundary";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"comment\"\r\n\r\n\
         hello\r\n\
         --{boundary}--\r\n"
    );
    let request = Request::builder()
        .method("POST")
        .uri("/describe-image")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("file"));
}

#[tokio::test]
async fn test_success_returns_description_and_cleans_up() {
    let endpoint = spawn_stub(StubBehavior::Success("A cat.")).await;
    let (state, scratch_dir) = test_state(&endpoint, Duration::from_secs(30)).await;
    let app = build_router(state);

    let response = app
        .oneshot(multipart_request("cat.png", "image/png", b"png-bytes"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body, json!({"description": "A cat."}));
    assert!(
        scratch_is_empty(scratch_dir.path()),
        "Scratch file must be removed after a successful call"
    );
}

#[tokio::test]
async fn test_upstream_error_maps_to_bad_gateway() {
    let endpoint = spawn_stub(StubBehavior::UpstreamError("model 'llava:13b' not found")).await;
    let (state, scratch_dir) = test_state(&endpoint, Duration::from_secs(30)).await;
    let app = build_router(state);

    let response = app
        .oneshot(multipart_request("cat.png", "image/png", b"png-bytes"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = response_json(response).await;
    let message = body["error"].as_str().unwrap();
    assert!(
        message.contains("model 'llava:13b' not found"),
        "Upstream message must be embedded, got: {message}"
    );
    assert!(
        scratch_is_empty(scratch_dir.path()),
        "Scratch file must be removed after an upstream error"
    );
}

#[tokio::test]
async fn test_upstream_delay_maps_to_gateway_timeout() {
    let endpoint = spawn_stub(StubBehavior::Delay(Duration::from_secs(2))).await;
    // Shortened budget; production default is 60s
    let (state, scratch_dir) = test_state(&endpoint, Duration::from_millis(250)).await;
    let app = build_router(state);

    let response = app
        .oneshot(multipart_request("slow.png", "image/png", b"png-bytes"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    let body = response_json(response).await;
    assert_eq!(body["error"], "Image processing timed out");
    assert!(
        scratch_is_empty(scratch_dir.path()),
        "Scratch file must be removed even when the call times out"
    );
}

#[tokio::test]
async fn test_error_envelope_shape() {
    let endpoint = spawn_stub(StubBehavior::Success("A cat.")).await;
    let (state, _scratch_dir) = test_state(&endpoint, Duration::from_secs(30)).await;
    let app = build_router(state);

    let response = app
        .oneshot(multipart_request("doc.pdf", "application/pdf", b"%PDF"))
        .await
        .unwrap();

    let body = response_json(response).await;
    let object = body.as_object().unwrap();
    assert_eq!(object.len(), 1, "Envelope carries only the error field");
    assert!(object["error"].is_string());
}

#[tokio::test]
async fn test_health_endpoint() {
    let endpoint = spawn_stub(StubBehavior::Success("A cat.")).await;
    let (state, _scratch_dir) = test_state(&endpoint, Duration::from_secs(30)).await;
    let app = build_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["model"], "llava:13b");
    assert_eq!(body["upstream_reachable"], true);
}

#[tokio::test]
async fn test_index_page_served() {
    let endpoint = spawn_stub(StubBehavior::Success("A cat.")).await;
    let (state, _scratch_dir) = test_state(&endpoint, Duration::from_secs(30)).await;
    let app = build_router(state);

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains("Describe an image"));
}
