use std::path::{Path, PathBuf};

use anyhow::Context;
use axum::Json;
use axum::extract::{Multipart, State};
use serde_json::{Value, json};

use crate::classifier::clean_live_label;
use crate::error::{AppError, AppResult};
use crate::frame_decode;
use crate::state::AppState;
use crate::types::{Frame, Prediction};
use crate::video;

struct VideoUpload {
    filename: String,
    bytes: Vec<u8>,
}

/// POST /predict-sign — classify an uploaded video clip.
pub async fn predict_sign(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<Value>> {
    let upload = read_video_field(&mut multipart).await?;
    let stored = save_upload(&state.config.upload_dir, &upload.filename, &upload.bytes, false).await?;

    let info = video::probe(&stored).await?;
    let prediction = predict_stored_video(&state, &stored, &info).await?;

    Ok(Json(json!({ "label": prediction.label })))
}

/// POST /predict-live — like /predict-sign, but the stored name gains a
/// timestamp prefix and the clip's metadata is logged.
pub async fn predict_live(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<Value>> {
    let upload = read_video_field(&mut multipart).await?;
    let stored = save_upload(&state.config.upload_dir, &upload.filename, &upload.bytes, true).await?;

    let info = video::probe(&stored).await?;
    log::info!(
        "live upload {}: {}x{}, {} frames, {:.2} fps, {:.2}s",
        stored.display(),
        info.width,
        info.height,
        info.frame_count
            .map_or_else(|| "?".to_string(), |n| n.to_string()),
        info.fps,
        info.duration_secs,
    );

    let prediction = predict_stored_video(&state, &stored, &info).await?;
    log::info!(
        "live prediction: {} (confidence {:.4})",
        prediction.label,
        prediction.confidence
    );

    Ok(Json(json!({
        "predicted_label": prediction.label,
        "confidence": prediction.confidence,
    })))
}

/// POST /predict-frames — classify frames captured in the browser and
/// uploaded as `frame_0..frame_{n-1}` plus a `frame_count` field.
pub async fn predict_frames(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<Value>> {
    let request_id = chrono::Utc::now().timestamp_millis();
    log::info!("[{request_id}] received frame prediction request");

    let mut frame_count: usize = 0;
    let mut frames: Vec<(usize, Frame)> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::BadRequest(err.to_string()))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        if name == "frame_count" {
            let text = field
                .text()
                .await
                .map_err(|err| AppError::BadRequest(err.to_string()))?;
            frame_count = text.trim().parse().unwrap_or(0);
        } else if let Some(index) = name
            .strip_prefix("frame_")
            .and_then(|rest| rest.parse::<usize>().ok())
        {
            let bytes = field
                .bytes()
                .await
                .map_err(|err| AppError::BadRequest(err.to_string()))?;
            match frame_decode::decode_frame(&bytes) {
                Ok(frame) => frames.push((index, frame)),
                Err(err) => log::warn!("[{request_id}] failed to decode {name}: {err:?}"),
            }
        }
    }

    if frame_count == 0 {
        return Err(AppError::BadRequest("No frames provided".to_string()));
    }
    if frames.is_empty() {
        return Err(AppError::BadRequest(
            "Could not decode any frames".to_string(),
        ));
    }

    log::info!("[{request_id}] decoded {} of {frame_count} frames", frames.len());

    frames.sort_by_key(|(index, _)| *index);
    let ordered: Vec<Frame> = frames.into_iter().map(|(_, frame)| frame).collect();

    let prediction = state.predictor.predict(ordered).await?;
    let label = clean_live_label(&prediction.label);
    log::info!(
        "[{request_id}] predicted {label} (confidence {:.4})",
        prediction.confidence
    );

    Ok(Json(json!({
        "predicted_label": label,
        "confidence": prediction.confidence,
        "request_id": request_id,
    })))
}

async fn predict_stored_video(
    state: &AppState,
    path: &Path,
    info: &video::VideoInfo,
) -> AppResult<Prediction> {
    let frames = video::decode_frames(path, info).await?;
    log::info!("decoded {} frames from {}", frames.len(), path.display());
    Ok(state.predictor.predict(frames).await?)
}

async fn read_video_field(multipart: &mut Multipart) -> AppResult<VideoUpload> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::BadRequest(err.to_string()))?
    {
        if field.name() != Some("video") {
            continue;
        }
        let filename = field.file_name().unwrap_or("upload.mp4").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|err| AppError::BadRequest(err.to_string()))?;
        return Ok(VideoUpload {
            filename,
            bytes: bytes.to_vec(),
        });
    }
    Err(AppError::BadRequest("No video uploaded".to_string()))
}

async fn save_upload(
    upload_dir: &Path,
    original_name: &str,
    bytes: &[u8],
    timestamp_prefix: bool,
) -> AppResult<PathBuf> {
    let mut filename = sanitize_filename(original_name);
    if timestamp_prefix {
        filename = format!("{}_{filename}", chrono::Local::now().format("%Y%m%d%H%M%S"));
    }

    tokio::fs::create_dir_all(upload_dir)
        .await
        .context("failed to create upload directory")?;
    let dest = upload_dir.join(filename);
    tokio::fs::write(&dest, bytes)
        .await
        .with_context(|| format!("failed to store upload at {}", dest.display()))?;
    log::info!("stored upload at {}", dest.display());
    Ok(dest)
}

/// Keep only a safe basename: path components are dropped and anything
/// outside `[A-Za-z0-9._-]` is replaced.
fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.').to_string();
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}
