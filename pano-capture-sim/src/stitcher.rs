//! Synthetic stitching engine.
//!
//! Stands in for the native aligner: every processed frame advances the sweep
//! by a fixed fraction of the field of view, and `create_mosaic` paints a
//! horizontal luma gradient sized to the requested resolution.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use pano_capture_core::processing::mosaic_buffer::append_trailer;
use pano_capture_core::processing::nv21::nv21_len;
use pano_capture_core::{CaptureError, MosaicStatus, ProgressListener, ProgressSample, StitchingEngine};

const CANCEL_POLL: Duration = Duration::from_millis(2);

/// Behaviour of a [`SyntheticStitcher`].
#[derive(Debug, Clone, PartialEq)]
pub struct StitcherScript {
    /// Horizontal progress per processed frame, as a fraction of the field of view.
    pub progress_step_x: f32,
    /// Vertical progress per processed frame.
    pub progress_step_y: f32,
    /// Report `finished` once this many frames have been processed.
    pub finish_after: Option<u64>,
    /// High-res mosaic size.
    pub mosaic_width: u32,
    pub mosaic_height: u32,
    /// The low-res pass divides both dimensions by this.
    pub low_res_divisor: u32,
    /// Simulated stitching time per `create_mosaic` call.
    pub stitch_delay: Duration,
    /// Return this status from every `create_mosaic` call instead of stitching.
    pub forced_status: Option<MosaicStatus>,
    /// Write a zero width into the high-res trailer.
    pub corrupt_high_res_trailer: bool,
}

impl Default for StitcherScript {
    fn default() -> Self {
        Self {
            progress_step_x: 0.1,
            progress_step_y: 0.0,
            finish_after: None,
            mosaic_width: 640,
            mosaic_height: 240,
            low_res_divisor: 4,
            stitch_delay: Duration::ZERO,
            forced_status: None,
            corrupt_high_res_trailer: false,
        }
    }
}

#[derive(Default)]
struct StitcherState {
    geometry: Option<(u32, u32, usize)>,
    listener: Option<Arc<dyn ProgressListener>>,
    frames: u64,
    buffer: Option<Vec<u8>>,
    mosaic_requests: Vec<bool>,
}

/// Deterministic [`StitchingEngine`] for headless runs and tests.
#[derive(Default)]
pub struct SyntheticStitcher {
    script: StitcherScript,
    state: Mutex<StitcherState>,
}

impl SyntheticStitcher {
    pub fn new(script: StitcherScript) -> Self {
        Self {
            script,
            state: Mutex::new(StitcherState::default()),
        }
    }

    pub fn script(&self) -> &StitcherScript {
        &self.script
    }

    /// Frames processed since the last reset.
    pub fn frames_processed(&self) -> u64 {
        self.state.lock().frames
    }

    /// The `high_res` flag of every `create_mosaic` call, in order.
    pub fn mosaic_requests(&self) -> Vec<bool> {
        self.state.lock().mosaic_requests.clone()
    }

    pub fn geometry(&self) -> Option<(u32, u32, usize)> {
        self.state.lock().geometry
    }

    pub fn has_listener(&self) -> bool {
        self.state.lock().listener.is_some()
    }

    fn output_size(&self, high_res: bool) -> (u32, u32) {
        if high_res {
            return (self.script.mosaic_width, self.script.mosaic_height);
        }
        let divisor = self.script.low_res_divisor.max(1);
        (
            (self.script.mosaic_width / divisor).max(2),
            (self.script.mosaic_height / divisor).max(2),
        )
    }

    /// Sleep for the scripted stitch time. Returns `false` if cancelled meanwhile.
    fn simulate_work(&self, cancel: &AtomicBool) -> bool {
        let deadline = Instant::now() + self.script.stitch_delay;
        loop {
            if cancel.load(Ordering::SeqCst) {
                return false;
            }
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            thread::sleep((deadline - now).min(CANCEL_POLL));
        }
    }
}

impl StitchingEngine for SyntheticStitcher {
    fn initialize(&self, width: u32, height: u32, buffer_size: usize) -> Result<(), CaptureError> {
        if width == 0 || height == 0 {
            return Err(CaptureError::EngineFailed(format!(
                "invalid preview size {}x{}",
                width, height
            )));
        }
        log::debug!("Synthetic stitcher: {}x{}, {} byte frames", width, height, buffer_size);
        self.state.lock().geometry = Some((width, height, buffer_size));
        Ok(())
    }

    fn set_progress_listener(&self, listener: Option<Arc<dyn ProgressListener>>) {
        self.state.lock().listener = listener;
    }

    fn process_frame(&self) {
        let (sample, listener) = {
            let mut state = self.state.lock();
            state.frames += 1;
            let frames = state.frames as f32;
            let sample = ProgressSample {
                finished: self.script.finish_after.is_some_and(|n| state.frames >= n),
                panning_rate_x: self.script.progress_step_x,
                panning_rate_y: self.script.progress_step_y,
                progress_x: self.script.progress_step_x * frames,
                progress_y: self.script.progress_step_y * frames,
            };
            (sample, state.listener.clone())
        };

        if let Some(listener) = listener {
            listener.on_progress(sample);
        }
    }

    fn create_mosaic(&self, high_res: bool, cancel: &AtomicBool) -> MosaicStatus {
        self.state.lock().mosaic_requests.push(high_res);

        if !self.simulate_work(cancel) {
            log::debug!("Synthetic stitch cancelled (high_res = {})", high_res);
            return MosaicStatus::Cancelled;
        }
        if let Some(status) = self.script.forced_status {
            return status;
        }

        let mut state = self.state.lock();
        if state.frames == 0 {
            log::warn!("create_mosaic called with no frames");
            return MosaicStatus::Error;
        }

        let (width, height) = self.output_size(high_res);
        let mut pixels = Vec::with_capacity(nv21_len(width, height) + 8);
        for _ in 0..height {
            for col in 0..width {
                pixels.push((16 + col * 219 / width.max(1)) as u8);
            }
        }
        pixels.resize(nv21_len(width, height), 128);

        let trailer_width = if high_res && self.script.corrupt_high_res_trailer {
            0
        } else {
            width as i32
        };
        append_trailer(&mut pixels, trailer_width, height as i32);

        state.buffer = Some(pixels);
        MosaicStatus::Ok
    }

    fn final_mosaic_buffer(&self) -> Option<Vec<u8>> {
        self.state.lock().buffer.clone()
    }

    fn reset(&self) {
        let mut state = self.state.lock();
        state.frames = 0;
        state.buffer = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pano_capture_core::processing::mosaic_buffer;

    struct Recorder(Mutex<Vec<ProgressSample>>);

    impl ProgressListener for Recorder {
        fn on_progress(&self, sample: ProgressSample) {
            self.0.lock().push(sample);
        }
    }

    #[test]
    fn progress_accumulates_per_frame() {
        let stitcher = SyntheticStitcher::new(StitcherScript {
            progress_step_x: 0.25,
            finish_after: Some(3),
            ..Default::default()
        });
        let recorder = Arc::new(Recorder(Mutex::new(Vec::new())));
        stitcher.set_progress_listener(Some(recorder.clone()));

        for _ in 0..3 {
            stitcher.process_frame();
        }

        let samples = recorder.0.lock();
        assert_eq!(samples.len(), 3);
        assert_eq!(samples[0].progress_x, 0.25);
        assert_eq!(samples[2].progress_x, 0.75);
        assert!(!samples[1].finished);
        assert!(samples[2].finished);
    }

    #[test]
    fn mosaic_buffer_carries_trailer() {
        let stitcher = SyntheticStitcher::default();
        stitcher.process_frame();

        assert_eq!(stitcher.create_mosaic(false, &AtomicBool::new(false)), MosaicStatus::Ok);
        let buffer = stitcher.final_mosaic_buffer().unwrap();
        let raw = mosaic_buffer::decode(&buffer).unwrap();
        assert_eq!((raw.width, raw.height), (160, 60));
        assert_eq!(raw.pixels.len(), nv21_len(160, 60));

        assert_eq!(stitcher.create_mosaic(true, &AtomicBool::new(false)), MosaicStatus::Ok);
        let buffer = stitcher.final_mosaic_buffer().unwrap();
        let raw = mosaic_buffer::decode(&buffer).unwrap();
        assert_eq!((raw.width, raw.height), (640, 240));
        assert_eq!(stitcher.mosaic_requests(), vec![false, true]);
    }

    #[test]
    fn cancel_flag_aborts_stitch() {
        let stitcher = SyntheticStitcher::new(StitcherScript {
            stitch_delay: Duration::from_secs(5),
            ..Default::default()
        });
        stitcher.process_frame();

        let started = Instant::now();
        assert_eq!(stitcher.create_mosaic(true, &AtomicBool::new(true)), MosaicStatus::Cancelled);
        assert!(started.elapsed() < Duration::from_secs(1));
        assert!(stitcher.final_mosaic_buffer().is_none());
    }

    #[test]
    fn no_frames_is_an_error() {
        let stitcher = SyntheticStitcher::default();
        assert_eq!(stitcher.create_mosaic(false, &AtomicBool::new(false)), MosaicStatus::Error);
    }

    #[test]
    fn reset_clears_frames_and_buffer() {
        let stitcher = SyntheticStitcher::default();
        stitcher.process_frame();
        stitcher.create_mosaic(false, &AtomicBool::new(false));
        stitcher.reset();
        assert_eq!(stitcher.frames_processed(), 0);
        assert!(stitcher.final_mosaic_buffer().is_none());
    }
}
