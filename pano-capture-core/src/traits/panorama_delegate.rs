use crate::models::error::CaptureError;
use crate::models::mosaic::MosaicJpeg;
use crate::models::panorama::{MediaHandle, StoredPanorama};
use crate::models::progress::SweepProgress;
use crate::models::state::CaptureState;

/// Event delegate for panorama session notifications.
///
/// All methods are called on the control thread, from inside
/// `PanoramaSession::process_pending` / `process_next`.
pub trait PanoramaDelegate: Send + Sync {
    fn on_state_changed(&self, state: CaptureState);

    /// Sweep feedback while capturing.
    fn on_progress_updated(&self, progress: &SweepProgress);

    /// The fast low-resolution mosaic is ready; the high-res pass starts next.
    fn on_low_res_preview(&self, preview: &MosaicJpeg);

    /// Finalization failed. The session is already back in the viewfinder.
    fn on_error(&self, error: &CaptureError);

    fn on_panorama_saved(&self, panorama: &StoredPanorama, handle: &MediaHandle);

    fn on_reset_to_viewfinder(&self);
}
