//! Headless preview renderer.

use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use pano_capture_core::{FrameAvailableCallback, FrameSurface, PreviewRenderer};

/// Frame surface that a producer thread can push frames into.
#[derive(Default)]
pub struct HeadlessSurface {
    callback: Mutex<Option<FrameAvailableCallback>>,
    frames_emitted: AtomicU64,
    frames_dropped: AtomicU64,
}

impl HeadlessSurface {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Simulate the camera finishing a frame. Returns whether a listener saw it.
    pub fn emit_frame(&self) -> bool {
        // Never call out while holding the lock.
        let callback = self.callback.lock().clone();
        match callback {
            Some(callback) => {
                self.frames_emitted.fetch_add(1, Ordering::Relaxed);
                callback();
                true
            }
            None => {
                self.frames_dropped.fetch_add(1, Ordering::Relaxed);
                false
            }
        }
    }

    pub fn has_listener(&self) -> bool {
        self.callback.lock().is_some()
    }

    pub fn frames_emitted(&self) -> u64 {
        self.frames_emitted.load(Ordering::Relaxed)
    }

    pub fn frames_dropped(&self) -> u64 {
        self.frames_dropped.load(Ordering::Relaxed)
    }

    /// Emit `frames` frames from a new thread, one every `interval`.
    pub fn spawn_producer(self: &Arc<Self>, frames: u64, interval: Duration) -> io::Result<thread::JoinHandle<()>> {
        let surface = Arc::clone(self);
        thread::Builder::new()
            .name("camera-producer".into())
            .spawn(move || {
                for _ in 0..frames {
                    surface.emit_frame();
                    thread::sleep(interval);
                }
                log::debug!("Camera producer done after {} frames", frames);
            })
    }
}

impl FrameSurface for HeadlessSurface {
    fn set_on_frame_available(&self, callback: Option<FrameAvailableCallback>) {
        *self.callback.lock() = callback;
    }
}

/// How often each renderer entry point ran.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderCounts {
    pub first_frames: u64,
    pub previews: u64,
    pub alignments: u64,
}

/// Renderer that draws nothing and counts calls.
pub struct HeadlessRenderer {
    surface: Arc<HeadlessSurface>,
    counts: RenderCounts,
}

impl HeadlessRenderer {
    pub fn new() -> Self {
        Self {
            surface: HeadlessSurface::new(),
            counts: RenderCounts::default(),
        }
    }

    /// The concrete input surface, for driving frames in.
    pub fn surface(&self) -> Arc<HeadlessSurface> {
        Arc::clone(&self.surface)
    }

    pub fn counts(&self) -> RenderCounts {
        self.counts
    }
}

impl Default for HeadlessRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl PreviewRenderer for HeadlessRenderer {
    fn show_first_frame(&mut self) {
        self.counts.first_frames += 1;
    }

    fn show_preview_frame_async(&mut self) {
        self.counts.previews += 1;
    }

    fn update_alignment_overlay_sync(&mut self) {
        self.counts.alignments += 1;
    }

    fn input_frame_source(&self) -> Arc<dyn FrameSurface> {
        self.surface.clone()
    }
}
