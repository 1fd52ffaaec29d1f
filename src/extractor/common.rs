use anyhow::{Context, Result, anyhow};
use fast_image_resize as fir;
use ndarray::Array4;
use rayon::prelude::*;

use crate::types::Frame;

pub(crate) const POSE_INPUT_SIZE: u32 = 256;
pub(crate) const HAND_INPUT_SIZE: u32 = 224;

#[derive(Clone, Debug)]
pub(crate) struct LetterboxInfo {
    pub scale: f32,
    pub pad_x: f32,
    pub pad_y: f32,
    pub orig_w: u32,
    pub orig_h: u32,
}

pub(crate) fn prepare_frame_with_size(
    frame: &Frame,
    target_size: u32,
) -> Result<(Array4<f32>, LetterboxInfo)> {
    let expected_len = (frame.width as usize)
        .saturating_mul(frame.height as usize)
        .saturating_mul(4);
    if frame.rgba.len() != expected_len {
        return Err(anyhow!(
            "frame buffer size mismatch: got {}, expected {}",
            frame.rgba.len(),
            expected_len
        ));
    }

    let scale = target_size as f32 / (frame.width.max(frame.height) as f32);
    let new_w = (frame.width as f32 * scale).round().max(1.0) as u32;
    let new_h = (frame.height as f32 * scale).round().max(1.0) as u32;

    let src_image = fir::images::Image::from_vec_u8(
        frame.width,
        frame.height,
        frame.rgba.clone(),
        fir::PixelType::U8x4,
    )?;
    let mut dst_image = fir::images::Image::new(new_w, new_h, fir::PixelType::U8x4);
    let mut resizer = fir::Resizer::new();
    let resize_options = fir::ResizeOptions::new()
        .resize_alg(fir::ResizeAlg::Interpolation(fir::FilterType::Bilinear));
    resizer
        .resize(&src_image, &mut dst_image, Some(&resize_options))
        .context("fast resize failed")?;
    let resized = dst_image.into_vec();

    let pad_x = ((target_size as i64 - new_w as i64) / 2).max(0) as usize;
    let pad_y = ((target_size as i64 - new_h as i64) / 2).max(0) as usize;
    let mut canvas = vec![0u8; (target_size as usize) * (target_size as usize) * 4];
    for px in canvas.chunks_mut(4) {
        px[3] = 255;
    }
    let dst_stride = target_size as usize * 4;
    let src_stride = new_w as usize * 4;
    for row in 0..(new_h as usize) {
        let dst_offset = (pad_y + row) * dst_stride + pad_x * 4;
        let src_offset = row * src_stride;
        canvas[dst_offset..dst_offset + src_stride]
            .copy_from_slice(&resized[src_offset..src_offset + src_stride]);
    }

    let normalized: Vec<f32> = canvas
        .par_chunks_exact(4)
        .flat_map_iter(|px| {
            [
                px[0] as f32 / 255.0,
                px[1] as f32 / 255.0,
                px[2] as f32 / 255.0,
            ]
        })
        .collect();
    let input = Array4::<f32>::from_shape_vec(
        (1, target_size as usize, target_size as usize, 3),
        normalized,
    )
    .map_err(|err| anyhow!("failed to build input tensor: {err}"))?;

    let letterbox = LetterboxInfo {
        scale,
        pad_x: pad_x as f32,
        pad_y: pad_y as f32,
        orig_w: frame.width,
        orig_h: frame.height,
    };

    Ok((input, letterbox))
}

pub(crate) fn decode_landmarks(flat: &[f32], count: usize) -> Result<Vec<[f32; 3]>> {
    if flat.len() < count * 3 {
        return Err(anyhow!(
            "unexpected landmarks length: got {}, need {}",
            flat.len(),
            count * 3
        ));
    }

    let mut landmarks = Vec::with_capacity(count);
    for chunk in flat.chunks_exact(3).take(count) {
        landmarks.push([chunk[0], chunk[1], chunk[2]]);
    }
    Ok(landmarks)
}

/// Undo the letterbox transform and scale landmarks to [0, 1] relative
/// to the original frame. Depth keeps the same scale as x.
pub(crate) fn normalize_landmarks(
    landmarks: &[[f32; 3]],
    letterbox: &LetterboxInfo,
) -> Vec<[f32; 3]> {
    let width = letterbox.orig_w.max(1) as f32;
    let height = letterbox.orig_h.max(1) as f32;
    landmarks
        .iter()
        .map(|[x, y, z]| {
            let px = (x - letterbox.pad_x) / letterbox.scale;
            let py = (y - letterbox.pad_y) / letterbox.scale;
            [
                (px / width).clamp(0.0, 1.0),
                (py / height).clamp(0.0, 1.0),
                z / (letterbox.scale * width),
            ]
        })
        .collect()
}
