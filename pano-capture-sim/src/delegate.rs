use pano_capture_core::{
    CaptureError, CaptureState, MediaHandle, MosaicJpeg, PanoramaDelegate, StoredPanorama, SweepProgress,
};

/// Delegate that reports every session event through `log`.
#[derive(Debug, Default)]
pub struct LoggingDelegate;

impl PanoramaDelegate for LoggingDelegate {
    fn on_state_changed(&self, state: CaptureState) {
        log::info!("Capture state: {:?}", state);
    }

    fn on_progress_updated(&self, progress: &SweepProgress) {
        log::debug!(
            "Sweep {:.1}° x {:.1}° (rate {:.2}, {:.2})",
            progress.angle_x,
            progress.angle_y,
            progress.panning_rate_x,
            progress.panning_rate_y
        );
    }

    fn on_low_res_preview(&self, preview: &MosaicJpeg) {
        log::info!(
            "Low-res preview ready: {}x{} ({} bytes)",
            preview.width,
            preview.height,
            preview.data.len()
        );
    }

    fn on_error(&self, error: &CaptureError) {
        log::error!("Panorama failed: {}", error);
    }

    fn on_panorama_saved(&self, panorama: &StoredPanorama, handle: &MediaHandle) {
        log::info!(
            "Saved {} ({}x{}, {} bytes) as {}",
            panorama.file_path.display(),
            panorama.width,
            panorama.height,
            panorama.length,
            handle
        );
    }

    fn on_reset_to_viewfinder(&self) {
        log::info!("Back to viewfinder");
    }
}
