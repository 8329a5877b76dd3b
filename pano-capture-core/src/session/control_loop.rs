use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};

use crate::models::error::CaptureError;
use crate::models::mosaic::MosaicJpeg;
use crate::models::panorama::{MediaHandle, StoredPanorama};
use crate::models::progress::ProgressSample;
use crate::traits::frame_surface::FrameAvailableCallback;
use crate::traits::stitching_engine::ProgressListener;

/// Work posted to the control thread.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlMessage {
    /// A new camera frame is ready. Coalesced: at most one is queued.
    FrameAvailable,
    Progress(ProgressSample),
    LowResMosaicReady(MosaicJpeg),
    GenerateFinalMosaicError(CaptureError),
    ResetToViewfinder,
    PanoramaSaved {
        panorama: StoredPanorama,
        handle: MediaHandle,
    },
}

/// Sending half of the control loop. Cheap to clone, usable from any thread.
#[derive(Clone)]
pub struct ControlHandle {
    tx: Sender<ControlMessage>,
    frame_pending: Arc<AtomicBool>,
}

impl ControlHandle {
    /// Post a message. Silently dropped if the loop is gone.
    pub fn post(&self, message: ControlMessage) {
        if self.tx.send(message).is_err() {
            log::debug!("Control loop closed, dropping message");
        }
    }

    /// Note that a frame is available. Never blocks.
    pub fn frame_available(&self) {
        if !self.frame_pending.swap(true, Ordering::AcqRel) {
            self.post(ControlMessage::FrameAvailable);
        }
    }

    /// A frame-available callback suitable for a [`FrameSurface`](crate::traits::frame_surface::FrameSurface).
    pub fn frame_callback(&self) -> FrameAvailableCallback {
        let handle = self.clone();
        Arc::new(move || handle.frame_available())
    }
}

/// Receiving half, drained on the control thread.
pub struct ControlLoop {
    rx: Receiver<ControlMessage>,
    handle: ControlHandle,
}

impl ControlLoop {
    pub fn new() -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        Self {
            rx,
            handle: ControlHandle {
                tx,
                frame_pending: Arc::new(AtomicBool::new(false)),
            },
        }
    }

    pub fn handle(&self) -> ControlHandle {
        self.handle.clone()
    }

    /// Next queued message, without blocking.
    pub fn try_next(&self) -> Option<ControlMessage> {
        self.rx.try_recv().ok().map(|m| self.received(m))
    }

    /// Wait up to `timeout` for the next message.
    pub fn next_timeout(&self, timeout: Duration) -> Option<ControlMessage> {
        match self.rx.recv_timeout(timeout) {
            Ok(m) => Some(self.received(m)),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    pub fn pending(&self) -> usize {
        self.rx.len()
    }

    fn received(&self, message: ControlMessage) -> ControlMessage {
        if message == ControlMessage::FrameAvailable {
            self.handle.frame_pending.store(false, Ordering::Release);
        }
        message
    }
}

impl Default for ControlLoop {
    fn default() -> Self {
        Self::new()
    }
}

/// Progress listener that forwards every sample to the control thread.
pub struct ForwardingProgressListener {
    handle: ControlHandle,
}

impl ForwardingProgressListener {
    pub fn new(handle: ControlHandle) -> Arc<Self> {
        Arc::new(Self { handle })
    }
}

impl ProgressListener for ForwardingProgressListener {
    fn on_progress(&self, sample: ProgressSample) {
        self.handle.post(ControlMessage::Progress(sample));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn frame_notifications_coalesce() {
        let control = ControlLoop::new();
        let handle = control.handle();

        handle.frame_available();
        handle.frame_available();
        handle.frame_available();
        assert_eq!(control.pending(), 1);

        assert_eq!(control.try_next(), Some(ControlMessage::FrameAvailable));
        assert!(control.try_next().is_none());

        // Once dispatched, the next notification queues again.
        handle.frame_available();
        assert_eq!(control.try_next(), Some(ControlMessage::FrameAvailable));
    }

    #[test]
    fn messages_from_other_threads_arrive_in_order() {
        let control = ControlLoop::new();
        let handle = control.handle();

        thread::spawn(move || {
            handle.post(ControlMessage::ResetToViewfinder);
            handle.post(ControlMessage::GenerateFinalMosaicError(CaptureError::Unknown("x".into())));
        })
        .join()
        .unwrap();

        assert_eq!(
            control.next_timeout(Duration::from_secs(1)),
            Some(ControlMessage::ResetToViewfinder)
        );
        assert!(matches!(
            control.next_timeout(Duration::from_secs(1)),
            Some(ControlMessage::GenerateFinalMosaicError(_))
        ));
    }

    #[test]
    fn post_after_loop_dropped_is_harmless() {
        let control = ControlLoop::new();
        let handle = control.handle();
        drop(control);
        handle.post(ControlMessage::ResetToViewfinder);
        handle.frame_available();
    }

    #[test]
    fn progress_listener_forwards_samples() {
        let control = ControlLoop::new();
        let listener = ForwardingProgressListener::new(control.handle());
        let sample = ProgressSample {
            progress_x: 0.5,
            ..Default::default()
        };
        listener.on_progress(sample);
        assert_eq!(control.try_next(), Some(ControlMessage::Progress(sample)));
    }
}
