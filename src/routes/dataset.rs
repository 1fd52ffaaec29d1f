use std::collections::BTreeMap;

use anyhow::Context;
use axum::Json;
use axum::body::Body;
use axum::extract::{Path as UrlPath, State};
use axum::http::{StatusCode, header};
use axum::response::Response;

use crate::dataset::scan_dataset;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /get-dataset-videos — label name to relative video paths.
pub async fn get_dataset_videos(
    State(state): State<AppState>,
) -> AppResult<Json<BTreeMap<String, Vec<String>>>> {
    let root = state.config.dataset_dir.clone();
    let dataset = tokio::task::spawn_blocking(move || scan_dataset(&root))
        .await
        .context("dataset scan task failed")?
        .context("failed to scan dataset directory")?;
    Ok(Json(dataset))
}

/// GET /data/{label}/{video} — stream a stored dataset video back.
pub async fn serve_video(
    State(state): State<AppState>,
    UrlPath((label, video)): UrlPath<(String, String)>,
) -> AppResult<Response> {
    if !is_safe_segment(&label) || !is_safe_segment(&video) {
        return Err(AppError::BadRequest("invalid path".to_string()));
    }

    let path = state.config.dataset_dir.join(&label).join(&video);
    let data = match tokio::fs::read(&path).await {
        Ok(data) => data,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(AppError::NotFound(format!("{label}/{video} not found")));
        }
        Err(err) => {
            return Err(AppError::Internal(
                anyhow::Error::from(err).context("failed to read video file"),
            ));
        }
    };

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type_for(&video))
        .header(header::CONTENT_LENGTH, data.len())
        .body(Body::from(data))
        .context("failed to build video response")?;
    Ok(response)
}

fn is_safe_segment(segment: &str) -> bool {
    !segment.is_empty()
        && !segment.contains("..")
        && !segment.contains('/')
        && !segment.contains('\\')
}

fn content_type_for(name: &str) -> &'static str {
    let ext = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn traversal_segments_are_rejected() {
        assert!(!is_safe_segment(".."));
        assert!(!is_safe_segment("a/../b"));
        assert!(!is_safe_segment("a\\b"));
        assert!(!is_safe_segment(""));
        assert!(is_safe_segment("clip_01.mp4"));
    }

    #[test]
    fn content_types_follow_extension() {
        assert_eq!(content_type_for("a.mp4"), "video/mp4");
        assert_eq!(content_type_for("b.MOV"), "video/quicktime");
        assert_eq!(content_type_for("c.bin"), "application/octet-stream");
    }
}
