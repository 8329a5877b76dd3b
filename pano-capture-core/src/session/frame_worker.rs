use std::sync::Arc;
use std::thread;

use crossbeam_channel::{Sender, TrySendError};

use crate::models::error::CaptureError;
use crate::traits::stitching_engine::StitchingEngine;

/// Single-use thread that feeds frames to the stitching engine while capturing.
///
/// The queue holds at most one request; a request submitted while one is
/// already queued is coalesced into it.
pub struct FrameWorker {
    tx: Option<Sender<()>>,
    handle: Option<thread::JoinHandle<u64>>,
}

impl FrameWorker {
    pub fn spawn(engine: Arc<dyn StitchingEngine>) -> Result<Self, CaptureError> {
        let (tx, rx) = crossbeam_channel::bounded::<()>(1);

        let handle = thread::Builder::new()
            .name("mosaic-frame-processor".into())
            .spawn(move || {
                let mut processed = 0u64;
                while rx.recv().is_ok() {
                    engine.process_frame();
                    processed += 1;
                }
                processed
            })
            .map_err(|e| CaptureError::Unknown(format!("failed to spawn frame processor: {}", e)))?;

        Ok(Self {
            tx: Some(tx),
            handle: Some(handle),
        })
    }

    /// Ask for the latest frame to be processed. Never blocks.
    pub fn submit(&self) {
        let Some(tx) = &self.tx else {
            return;
        };
        match tx.try_send(()) {
            Ok(()) | Err(TrySendError::Full(())) => {}
            Err(TrySendError::Disconnected(())) => {
                log::warn!("Frame processor exited early, dropping frame");
            }
        }
    }

    /// Close the queue and return a handle to wait for the thread on.
    ///
    /// The caller decides where to block; the control thread never should.
    pub fn close(mut self) -> FrameWorkerExit {
        self.tx = None;
        FrameWorkerExit {
            handle: self.handle.take(),
        }
    }
}

impl Drop for FrameWorker {
    fn drop(&mut self) {
        // Dropping the sender ends the thread; it is left detached.
        self.tx = None;
    }
}

/// A closed [`FrameWorker`] whose thread may still be finishing a frame.
pub struct FrameWorkerExit {
    handle: Option<thread::JoinHandle<u64>>,
}

impl FrameWorkerExit {
    /// Whether the thread has processed its last queued frame and exited.
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, |h| h.is_finished())
    }

    /// Block until the last in-flight frame is processed. Returns frames processed.
    pub fn join(mut self) -> u64 {
        match self.handle.take().map(|h| h.join()) {
            Some(Ok(count)) => count,
            Some(Err(_)) => {
                log::error!("Frame processor thread panicked");
                0
            }
            None => 0,
        }
    }
}
