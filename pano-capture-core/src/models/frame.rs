/// Pixel formats a camera can deliver preview frames in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// Semi-planar 4:2:0, interleaved V/U chroma.
    Nv21,
    /// Planar 4:2:0.
    Yv12,
    /// Semi-planar 4:2:2.
    Nv16,
    /// Packed 4:2:2.
    Yuy2,
    Rgb565,
}

impl PixelFormat {
    pub fn bits_per_pixel(&self) -> usize {
        match self {
            Self::Nv21 | Self::Yv12 => 12,
            Self::Nv16 | Self::Yuy2 | Self::Rgb565 => 16,
        }
    }
}

/// Dimensions of the camera preview stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewSize {
    pub width: u32,
    pub height: u32,
}

impl PreviewSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Size in bytes of one preview frame in `format`, plus `padding`.
    pub fn frame_buffer_size(&self, format: PixelFormat, padding: usize) -> usize {
        let pixels = self.width as usize * self.height as usize;
        pixels * format.bits_per_pixel() / 8 + padding
    }
}
