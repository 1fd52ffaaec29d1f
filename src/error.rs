use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Implements [`IntoResponse`] so every failure surfaces as a JSON
/// `{"error": ...}` body with the matching status code: 400 for
/// missing or undecodable input, 404 for absent files, 500 with the
/// underlying message for anything that breaks during processing.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            AppError::Internal(err) => {
                log::error!("request failed: {err:?}");
                (StatusCode::INTERNAL_SERVER_ERROR, format!("{err}"))
            }
        };

        (status, axum::Json(json!({ "error": message }))).into_response()
    }
}

impl From<crate::video::VideoError> for AppError {
    fn from(err: crate::video::VideoError) -> Self {
        AppError::Internal(err.into())
    }
}
