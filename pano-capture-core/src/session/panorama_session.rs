use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};

use crate::models::config::PanoramaConfiguration;
use crate::models::diagnostics::SessionDiagnostics;
use crate::models::error::CaptureError;
use crate::models::mosaic::MosaicResult;
use crate::models::panorama::{MediaHandle, StoredPanorama};
use crate::models::progress::{AngleBudget, ProgressSample};
use crate::models::state::CaptureState;
use crate::processing::sweep::{self, ProgressDirection, SweepDecision};
use crate::storage::metadata::SidecarMetadataWriter;
use crate::storage::panorama_writer::PanoramaWriter;
use crate::traits::camera_source::CameraSource;
use crate::traits::frame_surface::FrameSurface;
use crate::traits::panorama_delegate::PanoramaDelegate;
use crate::traits::renderer::PreviewRenderer;
use crate::traits::stitching_engine::ProgressListener;
use crate::traits::storage::{MetadataWriter, PanoramaStorage};

use super::context::MosaicContext;
use super::control_loop::{ControlHandle, ControlLoop, ControlMessage, ForwardingProgressListener};
use super::dispatcher::{DispatchOutcome, FrameDispatcher};
use super::finalizer::MosaicFinalizer;
use super::frame_worker::{FrameWorker, FrameWorkerExit};

/// Panorama capture session.
///
/// Generic over the camera and preview renderer; the stitching engine comes
/// from a shared [`MosaicContext`].
///
/// The thread that owns the session is the control thread: it must call
/// [`process_pending`](Self::process_pending) or
/// [`process_next`](Self::process_next) to apply frame notifications,
/// progress samples and finalization results.
///
/// ```text
/// [Camera] → FrameSurface callback → ControlLoop ─┐
/// [Engine] → ProgressListener ─────→ ControlLoop ─┤
///                                                  ├→ dispatch → [Renderer] / [Frame worker → Engine]
/// [Finalizer workers] ──────────────→ ControlLoop ─┘
/// ```
pub struct PanoramaSession<C: CameraSource, R: PreviewRenderer> {
    camera: C,
    renderer: R,
    context: MosaicContext,
    writer: PanoramaWriter,
    config: PanoramaConfiguration,
    budget: AngleBudget,
    state: CaptureState,
    delegate: Option<Arc<dyn PanoramaDelegate>>,

    control: ControlLoop,
    dispatcher: FrameDispatcher,
    surface: Option<Arc<dyn FrameSurface>>,
    frame_worker: Option<FrameWorker>,
    // Frame processor of an aborted capture, still draining its queue
    draining_worker: Option<FrameWorkerExit>,
    listener: Option<Arc<dyn ProgressListener>>,
    progress_direction: ProgressDirection,

    // Shared with worker threads
    cancel: Arc<AtomicBool>,
    alive: Arc<AtomicBool>,
    finalizing: Arc<AtomicBool>,

    time_taken: Option<DateTime<Local>>,
    last_saved: Option<(StoredPanorama, MediaHandle)>,
    diagnostics: SessionDiagnostics,
}

impl<C: CameraSource, R: PreviewRenderer> PanoramaSession<C, R> {
    /// Create a session. The camera's field of view is fixed for its lifetime.
    pub fn new(
        camera: C,
        renderer: R,
        context: MosaicContext,
        storage: Arc<dyn PanoramaStorage>,
        config: PanoramaConfiguration,
    ) -> Result<Self, CaptureError> {
        config.validate().map_err(CaptureError::ConfigurationFailed)?;

        let budget = AngleBudget::new(camera.horizontal_view_angle(), camera.vertical_view_angle())
            .with_sweep_limit(config.sweep_limit_degrees);
        let writer = PanoramaWriter::new(storage, Arc::new(SidecarMetadataWriter), config.file_name_format.clone());

        Ok(Self {
            camera,
            renderer,
            context,
            writer,
            config,
            budget,
            state: CaptureState::Viewfinder,
            delegate: None,
            control: ControlLoop::new(),
            dispatcher: FrameDispatcher::new(),
            surface: None,
            frame_worker: None,
            draining_worker: None,
            listener: None,
            progress_direction: ProgressDirection::identity(),
            cancel: Arc::new(AtomicBool::new(false)),
            alive: Arc::new(AtomicBool::new(true)),
            finalizing: Arc::new(AtomicBool::new(false)),
            time_taken: None,
            last_saved: None,
            diagnostics: SessionDiagnostics::default(),
        })
    }

    pub fn set_delegate(&mut self, delegate: Arc<dyn PanoramaDelegate>) {
        self.delegate = Some(delegate);
    }

    /// Replace the default JSON sidecar metadata writer.
    pub fn set_metadata_writer(&mut self, metadata_writer: Arc<dyn MetadataWriter>) {
        self.writer = PanoramaWriter::new(
            self.writer_storage(),
            metadata_writer,
            self.config.file_name_format.clone(),
        );
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    pub fn budget(&self) -> AngleBudget {
        self.budget
    }

    pub fn config(&self) -> &PanoramaConfiguration {
        &self.config
    }

    pub fn diagnostics(&self) -> SessionDiagnostics {
        self.diagnostics.clone()
    }

    pub fn camera(&self) -> &C {
        &self.camera
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn progress_direction(&self) -> ProgressDirection {
        self.progress_direction
    }

    /// Capture start time of the current or last capture.
    pub fn time_taken(&self) -> Option<DateTime<Local>> {
        self.time_taken
    }

    pub fn last_saved(&self) -> Option<&(StoredPanorama, MediaHandle)> {
        self.last_saved.as_ref()
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Whether a low-res or high-res finalization is in flight.
    pub fn is_finalizing(&self) -> bool {
        self.finalizing.load(Ordering::SeqCst)
    }

    pub fn is_preview_visible(&self) -> bool {
        self.dispatcher.is_preview_visible()
    }

    /// Handle for posting to this session's control loop from other threads.
    pub fn control_handle(&self) -> ControlHandle {
        self.control.handle()
    }

    /// Note that a camera frame is available. Safe from any thread via
    /// [`control_handle`](Self::control_handle); never blocks.
    pub fn on_frame_available(&self) {
        self.control.handle().frame_available();
    }

    /// The preview surface exists: initialize the engine and route camera frames.
    pub fn on_surface_available(&mut self) -> Result<(), CaptureError> {
        let size = self.camera.preview_size();
        let format = self.camera.preview_pixel_format();
        let buffer_size = size.frame_buffer_size(format, self.config.preview_buffer_padding);
        log::debug!("Mosaic preview: {}x{} {:?}", size.width, size.height, format);

        self.context.ensure_initialized(size.width, size.height, buffer_size)?;

        let surface = self.renderer.input_frame_source();
        surface.set_on_frame_available(Some(self.control.handle().frame_callback()));
        self.camera.attach_frame_listener(Arc::clone(&surface));
        self.surface = Some(surface);
        Ok(())
    }

    /// Shutter action: stop when capturing, start otherwise.
    pub fn on_shutter_pressed(&mut self) -> bool {
        if self.state.is_capturing() {
            self.stop_capture(false)
        } else {
            self.start_capture()
        }
    }

    /// Start a capture sweep. Transitions: viewfinder → mosaic capturing.
    ///
    /// Returns `false` without side effects when already capturing, while a
    /// previous panorama is still being finalized, while the frame processor
    /// of an aborted capture is still running, or after teardown.
    pub fn start_capture(&mut self) -> bool {
        if !self.is_alive() {
            log::debug!("start_capture ignored: session torn down");
            return false;
        }
        if self.state.is_capturing() {
            log::debug!("start_capture ignored: already capturing");
            return false;
        }
        if self.is_finalizing() {
            log::info!("start_capture ignored: waiting for previous panorama");
            return false;
        }
        if self.draining_worker.as_ref().is_some_and(|exit| !exit.is_finished()) {
            log::info!("start_capture ignored: previous frame processor still running");
            return false;
        }
        if let Some(exit) = self.draining_worker.take() {
            let frames = exit.join();
            log::debug!("Aborted frame processor finished after {} frames", frames);
        }

        log::info!("Starting panorama capture");
        let engine = self.context.engine();

        let frame_worker = match FrameWorker::spawn(Arc::clone(&engine)) {
            Ok(worker) => worker,
            Err(e) => {
                log::error!("Cannot start capture: {}", e);
                self.notify(|d| d.on_error(&e));
                return false;
            }
        };

        self.cancel.store(false, Ordering::SeqCst);
        self.time_taken = Some(Local::now());
        engine.reset();

        let listener: Arc<dyn ProgressListener> = ForwardingProgressListener::new(self.control.handle());
        self.context.install_listener(Arc::clone(&listener));
        self.listener = Some(listener);

        self.frame_worker = Some(frame_worker);
        self.progress_direction = ProgressDirection::from_orientation(self.config.capture_orientation);
        self.set_state(CaptureState::MosaicCapturing);
        true
    }

    /// Stop the capture sweep. Transitions: mosaic capturing → viewfinder.
    ///
    /// Unless `aborted`, a worker thread then builds the low-res mosaic,
    /// which in turn schedules the high-res save. Returns `false` when not
    /// capturing.
    pub fn stop_capture(&mut self, aborted: bool) -> bool {
        if !self.state.is_capturing() {
            log::debug!("stop_capture ignored: not capturing");
            return false;
        }

        log::info!("Stopping panorama capture (aborted = {})", aborted);
        self.set_state(CaptureState::Viewfinder);

        self.release_listener();
        if let Some(surface) = &self.surface {
            surface.set_on_frame_available(None);
        }
        let frame_exit = self.frame_worker.take().map(FrameWorker::close);

        if aborted {
            self.draining_worker = frame_exit;
            self.reset_to_viewfinder();
        } else {
            self.spawn_low_res_pass(frame_exit);
        }
        true
    }

    /// Abort an in-flight `create_mosaic`.
    pub fn cancel_computation(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    /// Build and persist the high-res mosaic on a worker thread.
    pub fn save_high_res_mosaic(&mut self) {
        if !self.is_alive() {
            return;
        }

        let finalizer = self.finalizer();
        let writer = self.writer.clone();
        let handle = self.control.handle();
        let orientation = self.config.capture_orientation;
        let taken_at = self.time_taken.unwrap_or_else(Local::now);

        self.finalizing.store(true, Ordering::SeqCst);
        self.diagnostics.finalizations_started += 1;

        let spawned = thread::Builder::new()
            .name("mosaic-high-res".into())
            .spawn(move || match finalizer.generate_final_mosaic(true) {
                MosaicResult::Cancelled => handle.post(ControlMessage::ResetToViewfinder),
                MosaicResult::Error(e) => handle.post(ControlMessage::GenerateFinalMosaicError(e)),
                MosaicResult::Ready(jpeg) => {
                    match writer.save_panorama(&jpeg.data, jpeg.width, jpeg.height, orientation, taken_at) {
                        Ok(Some((panorama, media))) => handle.post(ControlMessage::PanoramaSaved {
                            panorama,
                            handle: media,
                        }),
                        Ok(None) => {}
                        Err(e) => {
                            log::error!("Failed to save panorama: {}", e);
                            handle.post(ControlMessage::GenerateFinalMosaicError(e));
                            return;
                        }
                    }
                    handle.post(ControlMessage::ResetToViewfinder);
                }
            });

        if let Err(e) = spawned {
            self.on_spawn_failure(e);
        }
    }

    /// Apply all queued control messages without blocking. Returns how many ran.
    pub fn process_pending(&mut self) -> usize {
        let mut handled = 0;
        while let Some(message) = self.control.try_next() {
            self.handle_message(message);
            handled += 1;
        }
        handled
    }

    /// Wait up to `timeout` for one control message and apply it.
    pub fn process_next(&mut self, timeout: Duration) -> bool {
        match self.control.next_timeout(timeout) {
            Some(message) => {
                self.handle_message(message);
                true
            }
            None => false,
        }
    }

    /// Keep processing messages until no finalization is in flight and the
    /// queue is empty, or `timeout` passes. Returns whether it settled.
    pub fn wait_for_finalization(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            self.process_pending();
            if !self.is_finalizing() && self.control.pending() == 0 {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            self.process_next((deadline - now).min(Duration::from_millis(50)));
        }
    }

    /// Leave panorama mode.
    ///
    /// In-flight workers are cancelled; anything they post afterwards is
    /// discarded. Safe to call more than once.
    pub fn tear_down(&mut self) {
        if !self.alive.swap(false, Ordering::SeqCst) {
            return;
        }
        log::debug!("Tearing down panorama session");

        self.cancel.store(true, Ordering::SeqCst);
        self.state = CaptureState::Viewfinder;
        self.release_listener();
        if let Some(surface) = self.surface.take() {
            surface.set_on_frame_available(None);
        }
        self.frame_worker = None;
    }

    // --- Internal helpers ---

    fn handle_message(&mut self, message: ControlMessage) {
        if !self.is_alive() {
            if matches!(
                message,
                ControlMessage::ResetToViewfinder
                    | ControlMessage::GenerateFinalMosaicError(_)
                    | ControlMessage::LowResMosaicReady(_)
            ) {
                self.finalizing.store(false, Ordering::SeqCst);
            }
            self.diagnostics.messages_discarded += 1;
            log::debug!("Discarding {} for torn-down session", message_name(&message));
            return;
        }

        match message {
            ControlMessage::FrameAvailable => self.dispatch_frame(),
            ControlMessage::Progress(sample) => self.on_progress(sample),
            ControlMessage::LowResMosaicReady(preview) => {
                self.notify(|d| d.on_low_res_preview(&preview));
                self.save_high_res_mosaic();
            }
            ControlMessage::GenerateFinalMosaicError(e) => {
                self.finalizing.store(false, Ordering::SeqCst);
                self.notify(|d| d.on_error(&e));
                self.reset_to_viewfinder();
            }
            ControlMessage::ResetToViewfinder => {
                self.finalizing.store(false, Ordering::SeqCst);
                self.reset_to_viewfinder();
            }
            ControlMessage::PanoramaSaved { panorama, handle } => {
                self.diagnostics.panoramas_saved += 1;
                self.notify(|d| d.on_panorama_saved(&panorama, &handle));
                self.last_saved = Some((panorama, handle));
            }
        }
    }

    fn dispatch_frame(&mut self) {
        self.diagnostics.frames_dispatched += 1;
        let outcome = self
            .dispatcher
            .dispatch(self.state, &mut self.renderer, self.frame_worker.as_ref());
        if outcome == DispatchOutcome::Aligned {
            self.diagnostics.frames_submitted += 1;
        }
    }

    fn on_progress(&mut self, sample: ProgressSample) {
        // Samples queued before a stop are stale.
        if !self.state.is_capturing() {
            return;
        }
        self.diagnostics.progress_samples += 1;

        match sweep::evaluate(&sample, &self.budget) {
            SweepDecision::Complete => {
                self.stop_capture(false);
            }
            SweepDecision::InProgress(progress) => {
                let progress = self.progress_direction.apply(progress);
                self.notify(|d| d.on_progress_updated(&progress));
            }
        }
    }

    fn spawn_low_res_pass(&mut self, frame_exit: Option<FrameWorkerExit>) {
        let finalizer = self.finalizer();
        let handle = self.control.handle();

        self.finalizing.store(true, Ordering::SeqCst);
        self.diagnostics.finalizations_started += 1;

        let spawned = thread::Builder::new()
            .name("mosaic-low-res".into())
            .spawn(move || {
                // Frame processing and mosaic creation must not overlap.
                if let Some(exit) = frame_exit {
                    let frames = exit.join();
                    log::debug!("Frame processor finished after {} frames", frames);
                }
                match finalizer.generate_final_mosaic(false) {
                    MosaicResult::Ready(preview) => handle.post(ControlMessage::LowResMosaicReady(preview)),
                    MosaicResult::Cancelled => handle.post(ControlMessage::ResetToViewfinder),
                    MosaicResult::Error(e) => {
                        log::warn!("Low-res mosaic failed: {}", e);
                        handle.post(ControlMessage::ResetToViewfinder);
                    }
                }
            });

        if let Err(e) = spawned {
            self.on_spawn_failure(e);
        }
    }

    fn on_spawn_failure(&mut self, e: std::io::Error) {
        let error = CaptureError::Unknown(format!("failed to spawn finalization thread: {}", e));
        log::error!("{}", error);
        self.finalizing.store(false, Ordering::SeqCst);
        self.notify(|d| d.on_error(&error));
        self.reset_to_viewfinder();
    }

    fn reset_to_viewfinder(&mut self) {
        if let Some(surface) = &self.surface {
            surface.set_on_frame_available(Some(self.control.handle().frame_callback()));
        }
        self.notify(|d| d.on_reset_to_viewfinder());
    }

    /// Detach this session's progress listener unless another session took over.
    fn release_listener(&mut self) {
        if let Some(listener) = self.listener.take() {
            if !self.context.clear_listener_if_owner(&listener) {
                log::debug!("Progress listener already replaced by another session");
            }
        }
    }

    fn finalizer(&self) -> MosaicFinalizer {
        MosaicFinalizer::new(self.context.engine(), Arc::clone(&self.cancel), self.config.jpeg_quality)
    }

    fn writer_storage(&self) -> Arc<dyn PanoramaStorage> {
        self.writer.storage()
    }

    fn set_state(&mut self, new_state: CaptureState) {
        self.state = new_state;
        self.notify(|d| d.on_state_changed(new_state));
    }

    fn notify(&self, f: impl FnOnce(&dyn PanoramaDelegate)) {
        if let Some(ref delegate) = self.delegate {
            f(delegate.as_ref());
        }
    }
}

impl<C: CameraSource, R: PreviewRenderer> Drop for PanoramaSession<C, R> {
    fn drop(&mut self) {
        self.tear_down();
    }
}

fn message_name(message: &ControlMessage) -> &'static str {
    match message {
        ControlMessage::FrameAvailable => "FrameAvailable",
        ControlMessage::Progress(_) => "Progress",
        ControlMessage::LowResMosaicReady(_) => "LowResMosaicReady",
        ControlMessage::GenerateFinalMosaicError(_) => "GenerateFinalMosaicError",
        ControlMessage::ResetToViewfinder => "ResetToViewfinder",
        ControlMessage::PanoramaSaved { .. } => "PanoramaSaved",
    }
}
