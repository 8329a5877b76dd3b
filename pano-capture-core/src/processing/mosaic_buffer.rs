//! Raw stitching engine output.
//!
//! The engine hands back an NV21 image followed by an 8-byte trailer:
//! ```text
//! [pixel data ...............][width: i32 BE][height: i32 BE]
//!                              └──── last 8 bytes ───────────┘
//! ```
//! The trailer describes the valid image region; pixel data may be longer
//! than the region needs.

use crate::models::error::CaptureError;

/// Size of the width/height trailer in bytes.
pub const TRAILER_SIZE: usize = 8;

/// A decoded engine buffer: pixel data plus the dimensions from its trailer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawMosaic<'a> {
    pub pixels: &'a [u8],
    pub width: u32,
    pub height: u32,
}

/// Split `buffer` into pixel data and its trailer dimensions.
///
/// Fails if the buffer is too short to hold a trailer or if either
/// dimension is not strictly positive.
pub fn decode(buffer: &[u8]) -> Result<RawMosaic<'_>, CaptureError> {
    if buffer.len() < TRAILER_SIZE {
        return Err(CaptureError::MalformedBuffer(format!(
            "buffer of {} bytes has no room for a trailer",
            buffer.len()
        )));
    }

    let len = buffer.len() - TRAILER_SIZE;
    let (pixels, trailer) = buffer.split_at(len);
    let width = i32::from_be_bytes([trailer[0], trailer[1], trailer[2], trailer[3]]);
    let height = i32::from_be_bytes([trailer[4], trailer[5], trailer[6], trailer[7]]);
    log::debug!("Mosaic buffer: {} pixel bytes, W = {}, H = {}", len, width, height);

    if width <= 0 || height <= 0 {
        return Err(CaptureError::MalformedBuffer(format!(
            "invalid dimensions {}x{} (pixel bytes = {})",
            width, height, len
        )));
    }

    Ok(RawMosaic {
        pixels,
        width: width as u32,
        height: height as u32,
    })
}

/// Append a trailer for `width`×`height` to `pixels`.
pub fn append_trailer(pixels: &mut Vec<u8>, width: i32, height: i32) {
    pixels.extend_from_slice(&width.to_be_bytes());
    pixels.extend_from_slice(&height.to_be_bytes());
}
