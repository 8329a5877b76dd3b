use std::sync::Arc;

use super::frame_surface::FrameSurface;

/// GPU preview renderer.
///
/// Every method is called on the control thread only.
pub trait PreviewRenderer: Send {
    /// Draw the very first frame synchronously, before the preview is shown.
    fn show_first_frame(&mut self);

    /// Queue the latest frame for display.
    fn show_preview_frame_async(&mut self);

    /// Draw the latest frame with the alignment overlay, synchronously.
    fn update_alignment_overlay_sync(&mut self);

    /// The surface the camera should render into.
    fn input_frame_source(&self) -> Arc<dyn FrameSurface>;
}
