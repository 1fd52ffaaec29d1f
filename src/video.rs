use std::path::Path;

use serde::Deserialize;

use crate::types::Frame;

/// Error type for ffprobe/ffmpeg operations.
#[derive(Debug, thiserror::Error)]
pub enum VideoError {
    #[error("ffprobe/ffmpeg binary not found: {0}")]
    NotFound(std::io::Error),

    #[error("ffprobe/ffmpeg execution failed (exit code {exit_code:?}): {stderr}")]
    ExecutionFailed {
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("failed to parse ffprobe output: {0}")]
    ParseError(String),

    #[error("video file not found: {0}")]
    VideoNotFound(String),

    #[error("no video stream in {0}")]
    NoVideoStream(String),
}

/// Metadata of a stored video, as reported by ffprobe.
#[derive(Debug, Clone)]
pub struct VideoInfo {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub frame_count: Option<u64>,
    pub duration_secs: f64,
}

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    streams: Vec<FfprobeStream>,
    format: FfprobeFormat,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    /// e.g. "30/1" or "24000/1001"
    r_frame_rate: Option<String>,
    nb_frames: Option<String>,
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

/// Run `ffprobe` on a video file and return its parsed metadata.
pub async fn probe(path: &Path) -> Result<VideoInfo, VideoError> {
    if !path.exists() {
        return Err(VideoError::VideoNotFound(
            path.to_string_lossy().to_string(),
        ));
    }

    let output = tokio::process::Command::new("ffprobe")
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path)
        .output()
        .await
        .map_err(VideoError::NotFound)?;

    if !output.status.success() {
        return Err(VideoError::ExecutionFailed {
            exit_code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        });
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let probe: FfprobeOutput = serde_json::from_str(&stdout)
        .map_err(|err| VideoError::ParseError(format!("{err}: {stdout}")))?;
    video_info(&probe, path)
}

fn video_info(probe: &FfprobeOutput, path: &Path) -> Result<VideoInfo, VideoError> {
    let stream = probe
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| VideoError::NoVideoStream(path.to_string_lossy().to_string()))?;

    let (Some(width), Some(height)) = (stream.width, stream.height) else {
        return Err(VideoError::ParseError(
            "video stream is missing dimensions".to_string(),
        ));
    };

    let fps = stream
        .r_frame_rate
        .as_deref()
        .map(parse_framerate)
        .unwrap_or(0.0);
    let frame_count = stream.nb_frames.as_deref().and_then(|n| n.parse().ok());
    let duration_secs = probe
        .format
        .duration
        .as_deref()
        .or(stream.duration.as_deref())
        .and_then(|d| d.parse().ok())
        .unwrap_or(0.0);

    Ok(VideoInfo {
        width,
        height,
        fps,
        frame_count,
        duration_secs,
    })
}

/// Decode every frame of the video into RGBA buffers through an ffmpeg
/// rawvideo pipe.
pub async fn decode_frames(path: &Path, info: &VideoInfo) -> Result<Vec<Frame>, VideoError> {
    if !path.exists() {
        return Err(VideoError::VideoNotFound(
            path.to_string_lossy().to_string(),
        ));
    }

    let output = tokio::process::Command::new("ffmpeg")
        .args(["-v", "error", "-i"])
        .arg(path)
        .args(["-f", "rawvideo", "-pix_fmt", "rgba", "pipe:1"])
        .output()
        .await
        .map_err(VideoError::NotFound)?;

    if !output.status.success() {
        return Err(VideoError::ExecutionFailed {
            exit_code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        });
    }

    let frame_len = info.width as usize * info.height as usize * 4;
    if frame_len == 0 {
        return Ok(Vec::new());
    }

    let frames = output
        .stdout
        .chunks_exact(frame_len)
        .map(|chunk| Frame {
            rgba: chunk.to_vec(),
            width: info.width,
            height: info.height,
        })
        .collect();
    Ok(frames)
}

/// Parse the fraction ffprobe reports for frame rate.
fn parse_framerate(rate: &str) -> f64 {
    match rate.split_once('/') {
        Some((numerator, denominator)) => {
            let numerator: f64 = numerator.parse().unwrap_or(0.0);
            let denominator: f64 = denominator.parse().unwrap_or(0.0);
            if denominator > 0.0 {
                numerator / denominator
            } else {
                0.0
            }
        }
        None => rate.parse().unwrap_or(0.0),
    }
}
