pub mod dataset;
pub mod health;
pub mod predict;
pub mod sentence;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};

use crate::config::ServerConfig;
use crate::state::AppState;

/// Build the application router with CORS and the raised body limit
/// video uploads need.
pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    let cors = build_cors_layer(config);

    Router::new()
        .merge(health::router())
        .route("/predict-sign", post(predict::predict_sign))
        .route("/predict-live", post(predict::predict_live))
        .route("/predict-frames", post(predict::predict_frames))
        .route("/get-dataset-videos", get(dataset::get_dataset_videos))
        .route("/data/{label}/{video}", get(dataset::serve_video))
        .route("/generate_context", post(sentence::generate_context))
        .layer(DefaultBodyLimit::max(config.max_upload_mb * 1024 * 1024))
        .layer(cors)
        .with_state(state)
}

/// Build the CORS layer from configuration. A misconfigured origin
/// panics at startup so the deployment fails fast.
fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    if config.cors_origins.iter().any(|origin| origin == "*") {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<_> = config
        .cors_origins
        .iter()
        .map(|origin| {
            origin
                .parse()
                .unwrap_or_else(|err| panic!("invalid CORS origin '{origin}': {err}"))
        })
        .collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}
