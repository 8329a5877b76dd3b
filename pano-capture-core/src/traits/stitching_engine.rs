use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::models::error::CaptureError;
use crate::models::mosaic::MosaicStatus;
use crate::models::progress::ProgressSample;

/// Receiver of per-frame progress from the stitching engine.
///
/// Called from the engine's processing thread.
pub trait ProgressListener: Send + Sync {
    fn on_progress(&self, sample: ProgressSample);
}

/// Frame alignment and stitching engine.
///
/// One instance is shared per process (see [`MosaicContext`](crate::session::context::MosaicContext)).
/// `process_frame` and `create_mosaic` may block for a long time and are only
/// ever called from worker threads.
pub trait StitchingEngine: Send + Sync {
    /// Prepare the engine for frames of `width`×`height` occupying `buffer_size` bytes.
    fn initialize(&self, width: u32, height: u32, buffer_size: usize) -> Result<(), CaptureError>;

    /// Install or clear the progress listener. Installing replaces any previous one.
    fn set_progress_listener(&self, listener: Option<Arc<dyn ProgressListener>>);

    /// Align and accumulate the most recent preview frame.
    fn process_frame(&self);

    /// Stitch the accumulated frames.
    ///
    /// Implementations poll `cancel` and return [`MosaicStatus::Cancelled`]
    /// once it is set.
    fn create_mosaic(&self, high_res: bool, cancel: &AtomicBool) -> MosaicStatus;

    /// The raw NV21 result of the last successful `create_mosaic`, with its
    /// 8-byte big-endian width/height trailer.
    fn final_mosaic_buffer(&self) -> Option<Vec<u8>>;

    /// Drop accumulated frames so a new capture starts from scratch.
    fn reset(&self);
}
