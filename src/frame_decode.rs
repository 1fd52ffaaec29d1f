use anyhow::{Context, Result, anyhow};
use zune_jpeg::{
    JpegDecoder,
    zune_core::{bytestream::ZCursor, colorspace::ColorSpace, options::DecoderOptions},
};

use crate::types::Frame;

/// Decode an uploaded image into an RGBA frame. Browser frame captures
/// arrive as JPEG, which takes the zune-jpeg path; anything else falls
/// back to the image crate.
pub fn decode_frame(bytes: &[u8]) -> Result<Frame> {
    if bytes.starts_with(&[0xFF, 0xD8]) {
        return decode_jpeg(bytes);
    }

    let decoded = image::load_from_memory(bytes)
        .context("failed to decode uploaded frame")?
        .to_rgba8();
    let (width, height) = decoded.dimensions();
    Ok(Frame {
        rgba: decoded.into_raw(),
        width,
        height,
    })
}

fn decode_jpeg(bytes: &[u8]) -> Result<Frame> {
    let options = DecoderOptions::default().jpeg_set_out_colorspace(ColorSpace::RGBA);
    let mut decoder = JpegDecoder::new_with_options(ZCursor::new(bytes), options);
    let rgba = decoder
        .decode()
        .map_err(|err| anyhow!("JPEG decode failed: {err:?}"))?;

    let info = decoder
        .info()
        .ok_or_else(|| anyhow!("JPEG decoder returned no image info"))?;
    let width = info.width as u32;
    let height = info.height as u32;
    let expected_len = width as usize * height as usize * 4;
    if rgba.len() < expected_len {
        return Err(anyhow!(
            "JPEG decode produced too few bytes: got {}, expected {expected_len}",
            rgba.len()
        ));
    }

    Ok(Frame { rgba, width, height })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, RgbImage, RgbaImage};
    use std::io::Cursor;

    #[test]
    fn decodes_png_via_image_fallback() {
        let source = RgbaImage::from_pixel(4, 2, image::Rgba([10, 20, 30, 255]));
        let mut encoded = Cursor::new(Vec::new());
        source.write_to(&mut encoded, ImageFormat::Png).unwrap();

        let frame = decode_frame(encoded.get_ref()).unwrap();
        assert_eq!((frame.width, frame.height), (4, 2));
        assert_eq!(frame.rgba.len(), 4 * 2 * 4);
        assert_eq!(&frame.rgba[0..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn decodes_jpeg_via_fast_path() {
        let source = RgbImage::from_pixel(8, 8, image::Rgb([200, 100, 50]));
        let mut encoded = Cursor::new(Vec::new());
        source.write_to(&mut encoded, ImageFormat::Jpeg).unwrap();

        let frame = decode_frame(encoded.get_ref()).unwrap();
        assert_eq!((frame.width, frame.height), (8, 8));
        assert_eq!(frame.rgba.len(), 8 * 8 * 4);
    }

    #[test]
    fn garbage_bytes_are_rejected() {
        assert!(decode_frame(&[0, 1, 2, 3]).is_err());
    }
}
