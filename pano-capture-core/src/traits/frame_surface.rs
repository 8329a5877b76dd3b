use std::sync::Arc;

/// Callback invoked when a new camera frame has landed on a [`FrameSurface`].
///
/// Fires on whatever thread the camera producer runs on; it must not block
/// and must not touch the renderer.
pub type FrameAvailableCallback = Arc<dyn Fn() + Send + Sync + 'static>;

/// Surface the camera renders preview frames into.
///
/// Single producer (camera), single consumer (the control thread's dispatch).
pub trait FrameSurface: Send + Sync {
    /// Install or clear the frame-available callback.
    fn set_on_frame_available(&self, callback: Option<FrameAvailableCallback>);
}
