use crate::models::state::CaptureState;
use crate::traits::renderer::PreviewRenderer;

use super::frame_worker::FrameWorker;

/// What a single dispatch did with the latest frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    FirstFrameShown,
    PreviewShown,
    Aligned,
    /// Overlay updated while capturing, but no frame processor took the frame.
    OverlayOnly,
}

/// Routes each available frame to the renderer and, while capturing, the engine.
///
/// Runs on the control thread; this is the only place rendering is triggered.
#[derive(Debug, Default)]
pub struct FrameDispatcher {
    preview_visible: bool,
}

impl FrameDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_preview_visible(&self) -> bool {
        self.preview_visible
    }

    pub fn dispatch<R: PreviewRenderer + ?Sized>(
        &mut self,
        state: CaptureState,
        renderer: &mut R,
        frame_worker: Option<&FrameWorker>,
    ) -> DispatchOutcome {
        if !self.preview_visible {
            renderer.show_first_frame();
            self.preview_visible = true;
            return DispatchOutcome::FirstFrameShown;
        }

        match state {
            CaptureState::Viewfinder => {
                renderer.show_preview_frame_async();
                DispatchOutcome::PreviewShown
            }
            CaptureState::MosaicCapturing => {
                renderer.update_alignment_overlay_sync();
                match frame_worker {
                    Some(worker) => {
                        worker.submit();
                        DispatchOutcome::Aligned
                    }
                    None => {
                        log::warn!("Capturing without a frame processor, frame not stitched");
                        DispatchOutcome::OverlayOnly
                    }
                }
            }
        }
    }
}
