use std::sync::Arc;

use pano_capture_core::{CameraSource, FrameSurface, PixelFormat, PreviewSize};

/// Camera that reports fixed parameters and remembers where it renders to.
pub struct SimulatedCamera {
    preview_size: PreviewSize,
    pixel_format: PixelFormat,
    horizontal_view_angle: f32,
    vertical_view_angle: f32,
    surface: Option<Arc<dyn FrameSurface>>,
}

impl SimulatedCamera {
    pub fn new(preview_size: PreviewSize, horizontal_view_angle: f32, vertical_view_angle: f32) -> Self {
        Self {
            preview_size,
            pixel_format: PixelFormat::Nv21,
            horizontal_view_angle,
            vertical_view_angle,
            surface: None,
        }
    }

    pub fn with_pixel_format(mut self, pixel_format: PixelFormat) -> Self {
        self.pixel_format = pixel_format;
        self
    }

    /// Whether a frame surface has been attached.
    pub fn is_rendering(&self) -> bool {
        self.surface.is_some()
    }
}

impl Default for SimulatedCamera {
    /// 960×720 NV21 preview, 60°×46° field of view.
    fn default() -> Self {
        Self::new(PreviewSize::new(960, 720), 60.0, 46.0)
    }
}

impl CameraSource for SimulatedCamera {
    fn preview_size(&self) -> PreviewSize {
        self.preview_size
    }

    fn preview_pixel_format(&self) -> PixelFormat {
        self.pixel_format
    }

    fn horizontal_view_angle(&self) -> f32 {
        self.horizontal_view_angle
    }

    fn vertical_view_angle(&self) -> f32 {
        self.vertical_view_angle
    }

    fn attach_frame_listener(&mut self, surface: Arc<dyn FrameSurface>) {
        log::debug!("Simulated camera rendering to headless surface");
        self.surface = Some(surface);
    }
}
