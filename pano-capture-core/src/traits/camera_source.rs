use std::sync::Arc;

use crate::models::frame::{PixelFormat, PreviewSize};

use super::frame_surface::FrameSurface;

/// Camera hardware abstraction.
pub trait CameraSource: Send {
    fn preview_size(&self) -> PreviewSize;

    fn preview_pixel_format(&self) -> PixelFormat;

    /// Horizontal field of view in degrees.
    fn horizontal_view_angle(&self) -> f32;

    /// Vertical field of view in degrees.
    fn vertical_view_angle(&self) -> f32;

    /// Route preview frames into `surface`.
    fn attach_frame_listener(&mut self, surface: Arc<dyn FrameSurface>);
}
