use std::{
    fs,
    io::{Read, Write},
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result, anyhow};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::blocking::Client;

use crate::config::ServerConfig;

const POSE_MODEL_FILENAME: &str = "pose_estimation_mediapipe_2023mar.onnx";
const POSE_MODEL_URL: &str = "https://github.com/opencv/opencv_zoo/raw/main/models/pose_estimation_mediapipe/pose_estimation_mediapipe_2023mar.onnx";
const HAND_MODEL_FILENAME: &str = "handpose_estimation_mediapipe_2023feb.onnx";
const HAND_MODEL_URL: &str = "https://github.com/opencv/opencv_zoo/raw/main/models/handpose_estimation_mediapipe/handpose_estimation_mediapipe_2023feb.onnx";
const CLASSIFIER_MODEL_FILENAME: &str = "sign_classifier_bilstm.onnx";
const LABELS_FILENAME: &str = "labels.json";

pub fn pose_model_path(config: &ServerConfig) -> PathBuf {
    config.model_dir.join(POSE_MODEL_FILENAME)
}

pub fn hand_model_path(config: &ServerConfig) -> PathBuf {
    config.model_dir.join(HAND_MODEL_FILENAME)
}

pub fn classifier_model_path(config: &ServerConfig) -> PathBuf {
    config.model_dir.join(CLASSIFIER_MODEL_FILENAME)
}

pub fn labels_path(config: &ServerConfig) -> PathBuf {
    config.model_dir.join(LABELS_FILENAME)
}

/// Make sure every model file the service needs is on disk.
///
/// The landmark models are public and downloaded when absent; the
/// trained classifier and its label table are deployment artifacts that
/// must already be in the model directory.
pub fn ensure_models_available(config: &ServerConfig) -> Result<()> {
    ensure_downloaded("pose estimator", POSE_MODEL_URL, &pose_model_path(config))?;
    ensure_downloaded("hand estimator", HAND_MODEL_URL, &hand_model_path(config))?;

    for path in [classifier_model_path(config), labels_path(config)] {
        if !path.exists() {
            return Err(anyhow!(
                "required model artifact {} is missing; place the trained classifier and label table in {}",
                path.display(),
                config.model_dir.display()
            ));
        }
    }
    Ok(())
}

fn ensure_downloaded(label: &str, url: &str, dest: &Path) -> Result<()> {
    if dest.exists() {
        return Ok(());
    }

    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create model directory {}", parent.display()))?;
    }

    log::info!("downloading {label} model from {url} to {}", dest.display());

    let client = Client::new();
    let mut response = client
        .get(url)
        .send()
        .context("failed to start model download")?
        .error_for_status()
        .context("model download returned error status")?;

    let progress = create_progress_bar(response.content_length());

    let tmp_path = dest.with_extension("download");
    let mut file = fs::File::create(&tmp_path)
        .with_context(|| format!("failed to create {}", tmp_path.display()))?;

    let mut downloaded: u64 = 0;
    let mut buffer = [0u8; 16 * 1024];
    loop {
        let bytes_read = response
            .read(&mut buffer)
            .context("failed while reading model bytes")?;
        if bytes_read == 0 {
            break;
        }

        file.write_all(&buffer[..bytes_read])
            .context("failed while writing model to disk")?;
        downloaded += bytes_read as u64;
        progress.set_position(downloaded);
    }

    file.sync_all()
        .context("failed to flush downloaded model to disk")?;
    fs::rename(&tmp_path, dest).with_context(|| {
        format!(
            "failed to move temp model {} into place at {}",
            tmp_path.display(),
            dest.display()
        )
    })?;

    progress.finish_with_message(format!("{label} model ready"));
    Ok(())
}

fn create_progress_bar(total_size: Option<u64>) -> ProgressBar {
    match total_size {
        Some(total) if total > 0 => {
            let pb = ProgressBar::new(total);
            let style = ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {bytes}/{total_bytes} ({eta})",
            )
            .unwrap()
            .progress_chars("=>-");
            pb.set_style(style);
            pb
        }
        _ => {
            let pb = ProgressBar::new_spinner();
            let style = ProgressStyle::with_template("{spinner:.green} downloading model").unwrap();
            pb.set_style(style);
            pb.enable_steady_tick(Duration::from_millis(100));
            pb
        }
    }
}
