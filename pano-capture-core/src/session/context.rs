use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::error::CaptureError;
use crate::traits::stitching_engine::{ProgressListener, StitchingEngine};

/// Process-wide owner of the stitching engine.
///
/// Create one at startup and hand clones to each session. The engine is
/// initialized at most once per preview geometry.
///
/// The engine holds one progress listener at a time. Sessions install and
/// clear theirs through the context so a session can only remove the
/// listener it installed itself.
#[derive(Clone)]
pub struct MosaicContext {
    engine: Arc<dyn StitchingEngine>,
    initialized: Arc<Mutex<Option<(u32, u32, usize)>>>,
    listener: Arc<Mutex<Option<Arc<dyn ProgressListener>>>>,
}

impl MosaicContext {
    pub fn new(engine: Arc<dyn StitchingEngine>) -> Self {
        Self {
            engine,
            initialized: Arc::new(Mutex::new(None)),
            listener: Arc::new(Mutex::new(None)),
        }
    }

    pub fn engine(&self) -> Arc<dyn StitchingEngine> {
        Arc::clone(&self.engine)
    }

    /// Initialize the engine for the given geometry unless it already is.
    pub fn ensure_initialized(&self, width: u32, height: u32, buffer_size: usize) -> Result<(), CaptureError> {
        let mut initialized = self.initialized.lock();
        if *initialized == Some((width, height, buffer_size)) {
            return Ok(());
        }
        log::debug!("Initializing stitching engine: {}x{}, {} bytes per frame", width, height, buffer_size);
        self.engine.initialize(width, height, buffer_size)?;
        *initialized = Some((width, height, buffer_size));
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.lock().is_some()
    }

    /// Make `listener` the engine's progress listener, replacing whoever held it.
    pub fn install_listener(&self, listener: Arc<dyn ProgressListener>) {
        let mut current = self.listener.lock();
        if current.is_some() {
            log::debug!("Replacing progress listener of another session");
        }
        self.engine.set_progress_listener(None);
        self.engine.set_progress_listener(Some(Arc::clone(&listener)));
        *current = Some(listener);
    }

    /// Clear the engine's progress listener if it is still `listener`.
    ///
    /// Returns `false` and leaves the engine alone when another listener has
    /// been installed since.
    pub fn clear_listener_if_owner(&self, listener: &Arc<dyn ProgressListener>) -> bool {
        let mut current = self.listener.lock();
        match current.as_ref() {
            Some(installed) if same_listener(installed, listener) => {
                self.engine.set_progress_listener(None);
                *current = None;
                true
            }
            _ => false,
        }
    }

    /// Whether `listener` is the one currently installed.
    pub fn owns_listener(&self, listener: &Arc<dyn ProgressListener>) -> bool {
        self.listener
            .lock()
            .as_ref()
            .is_some_and(|installed| same_listener(installed, listener))
    }

    pub fn has_listener(&self) -> bool {
        self.listener.lock().is_some()
    }

    /// Process teardown: detach any listener and forget the initialized geometry.
    ///
    /// Only call once no session uses the context any more.
    pub fn shutdown(&self) {
        let mut current = self.listener.lock();
        self.engine.set_progress_listener(None);
        *current = None;
        *self.initialized.lock() = None;
    }
}

// Compare data pointers only; vtable pointers of one type may differ across codegen units.
fn same_listener(a: &Arc<dyn ProgressListener>, b: &Arc<dyn ProgressListener>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}
