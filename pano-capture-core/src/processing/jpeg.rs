//! JPEG compression of decoded mosaics.

use std::io::{Cursor, Write};

use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, RgbImage};

use crate::models::error::CaptureError;

use super::nv21;

/// Encode `image` as JPEG at `quality` into `out`, then flush it.
///
/// A failing flush is reported like any other encoding failure.
pub fn encode_rgb<W: Write>(image: &RgbImage, quality: u8, mut out: W) -> Result<(), CaptureError> {
    {
        let mut encoder = JpegEncoder::new_with_quality(&mut out, quality);
        encoder
            .encode(
                image.as_raw(),
                image.width(),
                image.height(),
                ExtendedColorType::Rgb8,
            )
            .map_err(|e| CaptureError::EncodingFailed(format!("JPEG encoding failed: {}", e)))?;
    }
    out.flush()
        .map_err(|e| CaptureError::EncodingFailed(format!("failed to close JPEG stream: {}", e)))
}

/// Convert a full NV21 image to RGB and compress it to JPEG.
pub fn compress_nv21(data: &[u8], width: u32, height: u32, quality: u8) -> Result<Vec<u8>, CaptureError> {
    let rgb = nv21::nv21_to_rgb(data, width, height)?;
    let mut cursor = Cursor::new(Vec::new());
    encode_rgb(&rgb, quality, &mut cursor)?;
    Ok(cursor.into_inner())
}
