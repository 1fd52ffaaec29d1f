//! Router-level tests: response shapes for the health check, the 400
//! paths of the prediction endpoints, and the dataset endpoints. None of
//! these reach the inference worker, so the app is built with a
//! disconnected predictor handle.

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use tower::ServiceExt;

use sign_bridge::agent::SentenceGeneratorAgent;
use sign_bridge::config::ServerConfig;
use sign_bridge::llm::LlmClient;
use sign_bridge::routes::build_router;
use sign_bridge::state::AppState;
use sign_bridge::worker::PredictorHandle;

fn test_config(dataset_dir: PathBuf) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["*".to_string()],
        upload_dir: std::env::temp_dir().join("sign-bridge-test-uploads"),
        dataset_dir,
        model_dir: PathBuf::from("models"),
        llm_endpoint: "http://localhost:11434/api/generate".to_string(),
        llm_model: "mistral:instruct".to_string(),
        max_frames: 117,
        max_upload_mb: 8,
    }
}

fn build_test_app(dataset_dir: PathBuf) -> Router {
    let config = test_config(dataset_dir);
    let llm = LlmClient::new(config.llm_endpoint.clone(), config.llm_model.clone());
    let state = AppState {
        config: Arc::new(config.clone()),
        predictor: PredictorHandle::disconnected(),
        agent: Arc::new(SentenceGeneratorAgent::new(llm)),
    };
    build_router(state, &config)
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn get(app: Router, uri: &str) -> axum::response::Response {
    app.oneshot(
        Request::builder()
            .method(Method::GET)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

fn multipart_request(uri: &str, fields: &[(&str, &str)]) -> Request<Body> {
    let boundary = "sign-bridge-test-boundary";
    let mut body = String::new();
    for (name, value) in fields {
        body.push_str(&format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ));
    }
    body.push_str(&format!("--{boundary}--\r\n"));

    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn health_returns_ok_with_version() {
    let dataset = tempfile::tempdir().unwrap();
    let response = get(build_test_app(dataset.path().into()), "/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let dataset = tempfile::tempdir().unwrap();
    let response = get(build_test_app(dataset.path().into()), "/no-such-route").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn missing_video_field_returns_400() {
    for uri in ["/predict-sign", "/predict-live"] {
        let dataset = tempfile::tempdir().unwrap();
        let app = build_test_app(dataset.path().into());
        let response = app
            .oneshot(multipart_request(uri, &[("other", "value")]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"], "No video uploaded");
    }
}

#[tokio::test]
async fn zero_frame_count_returns_400() {
    let dataset = tempfile::tempdir().unwrap();
    let app = build_test_app(dataset.path().into());
    let response = app
        .oneshot(multipart_request("/predict-frames", &[("frame_count", "0")]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "No frames provided");
}

#[tokio::test]
async fn undecodable_frames_return_400() {
    let dataset = tempfile::tempdir().unwrap();
    let app = build_test_app(dataset.path().into());
    let response = app
        .oneshot(multipart_request(
            "/predict-frames",
            &[("frame_count", "1"), ("frame_0", "not an image")],
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Could not decode any frames");
}

#[tokio::test]
async fn generate_context_without_words_returns_400() {
    let dataset = tempfile::tempdir().unwrap();
    let app = build_test_app(dataset.path().into());
    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/generate_context")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(""))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "No words provided");
}

#[tokio::test]
async fn dataset_listing_maps_labels_to_videos() {
    let dataset = tempfile::tempdir().unwrap();
    std::fs::create_dir(dataset.path().join("hello")).unwrap();
    std::fs::write(dataset.path().join("hello/clip1.mp4"), b"x").unwrap();
    std::fs::write(dataset.path().join("hello/notes.txt"), b"x").unwrap();

    let response = get(build_test_app(dataset.path().into()), "/get-dataset-videos").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["hello"], serde_json::json!(["data/hello/clip1.mp4"]));
}

#[tokio::test]
async fn stored_video_is_served_with_content_type() {
    let dataset = tempfile::tempdir().unwrap();
    std::fs::create_dir(dataset.path().join("hello")).unwrap();
    std::fs::write(dataset.path().join("hello/clip1.mp4"), b"video-bytes").unwrap();

    let response = get(build_test_app(dataset.path().into()), "/data/hello/clip1.mp4").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "video/mp4"
    );
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"video-bytes");
}

#[tokio::test]
async fn missing_video_file_returns_404() {
    let dataset = tempfile::tempdir().unwrap();
    let response = get(build_test_app(dataset.path().into()), "/data/hello/nope.mp4").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn path_traversal_is_rejected() {
    let dataset = tempfile::tempdir().unwrap();
    let response = get(
        build_test_app(dataset.path().into()),
        "/data/hello/..%2Fsecret.mp4",
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
