//! NV21 (semi-planar 4:2:0, V/U interleaved) to RGB conversion.

use image::RgbImage;

use crate::models::error::CaptureError;

/// Bytes needed for a `width`×`height` NV21 image with tightly packed rows.
pub fn nv21_len(width: u32, height: u32) -> usize {
    let width = width as usize;
    let height = height as usize;
    width * height + chroma_stride(width) * height.div_ceil(2)
}

fn chroma_stride(width: usize) -> usize {
    width.div_ceil(2) * 2
}

/// Convert an NV21 image to RGB.
///
/// Only the first [`nv21_len`] bytes of `data` are read.
pub fn nv21_to_rgb(data: &[u8], width: u32, height: u32) -> Result<RgbImage, CaptureError> {
    let needed = nv21_len(width, height);
    if data.len() < needed {
        return Err(CaptureError::MalformedBuffer(format!(
            "{}x{} NV21 image needs {} bytes, buffer holds {}",
            width,
            height,
            needed,
            data.len()
        )));
    }

    let w = width as usize;
    let h = height as usize;
    let (y_plane, vu_plane) = data.split_at(w * h);
    let vu_stride = chroma_stride(w);

    let mut rgb = vec![0u8; w * h * 3];
    for row in 0..h {
        let vu_row = (row / 2) * vu_stride;
        let rgb_row = row * w * 3;
        for col in 0..w {
            let vu = vu_row + (col / 2) * 2;
            let v = vu_plane[vu] as i32 - 128;
            let u = vu_plane[vu + 1] as i32 - 128;
            let y = ((y_plane[row * w + col] as i32 - 16) * 149) >> 7;

            let out = rgb_row + col * 3;
            rgb[out] = (y + ((179 * v) >> 7)).clamp(0, 255) as u8;
            rgb[out + 1] = (y - ((44 * u) >> 7) - ((91 * v) >> 7)).clamp(0, 255) as u8;
            rgb[out + 2] = (y + ((227 * u) >> 7)).clamp(0, 255) as u8;
        }
    }

    RgbImage::from_raw(width, height, rgb)
        .ok_or_else(|| CaptureError::EncodingFailed("failed to create RGB image from buffer".into()))
}

/// Build a solid-color NV21 image. Used by simulated engines and tests.
pub fn solid_nv21(width: u32, height: u32, y: u8, u: u8, v: u8) -> Vec<u8> {
    let luma = width as usize * height as usize;
    let mut data = vec![y; luma];
    let chroma_len = nv21_len(width, height) - luma;
    data.reserve(chroma_len);
    for i in 0..chroma_len {
        data.push(if i % 2 == 0 { v } else { u });
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nv21_len_even_and_odd() {
        assert_eq!(nv21_len(4, 4), 16 + 8);
        assert_eq!(nv21_len(3, 3), 9 + 4 * 2);
    }

    #[test]
    fn neutral_gray_converts_to_gray() {
        let data = solid_nv21(16, 16, 128, 128, 128);
        let rgb = nv21_to_rgb(&data, 16, 16).unwrap();
        assert_eq!(rgb.dimensions(), (16, 16));

        let px = rgb.get_pixel(5, 7);
        assert_eq!(px[0], px[1]);
        assert_eq!(px[1], px[2]);
        assert!((125..=135).contains(&px[0]));
    }

    #[test]
    fn high_v_is_red() {
        let data = solid_nv21(8, 8, 81, 90, 240);
        let rgb = nv21_to_rgb(&data, 8, 8).unwrap();
        let px = rgb.get_pixel(0, 0);
        assert!(px[0] > 200, "red channel {}", px[0]);
        assert!(px[1] < 60, "green channel {}", px[1]);
        assert!(px[2] < 60, "blue channel {}", px[2]);
    }

    #[test]
    fn odd_dimensions_convert() {
        let data = solid_nv21(5, 3, 128, 128, 128);
        let rgb = nv21_to_rgb(&data, 5, 3).unwrap();
        assert_eq!(rgb.dimensions(), (5, 3));
    }

    #[test]
    fn trailing_bytes_are_ignored() {
        let mut data = solid_nv21(4, 4, 200, 128, 128);
        data.extend_from_slice(&[0u8; 100]);
        assert!(nv21_to_rgb(&data, 4, 4).is_ok());
    }

    #[test]
    fn short_buffer_is_rejected() {
        let data = vec![0u8; 10];
        assert!(matches!(
            nv21_to_rgb(&data, 4, 4),
            Err(CaptureError::MalformedBuffer(_))
        ));
    }
}
