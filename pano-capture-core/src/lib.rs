//! # pano-capture-core
//!
//! Platform-agnostic panorama capture core library.
//!
//! Drives a sweep capture on a live camera feed: the viewfinder/capturing
//! state machine, frame dispatch into the renderer and stitching engine, the
//! stop-on-sweep policy, and two-pass (low-res, then high-res) mosaic
//! finalization with JPEG encoding and persistence.
//!
//! Camera, renderer, stitching engine and storage backends implement the
//! traits in [`traits`] and plug into the generic [`PanoramaSession`].
//!
//! ## Architecture
//!
//! ```text
//! pano-capture-core (this crate)
//! ├── traits/       ← CameraSource, PreviewRenderer, FrameSurface, StitchingEngine, PanoramaStorage, PanoramaDelegate
//! ├── models/       ← CaptureError, CaptureState, PanoramaConfiguration, ProgressSample, MosaicResult, etc.
//! ├── processing/   ← mosaic buffer trailer, NV21 → RGB, JPEG, sweep policy
//! ├── session/      ← ControlLoop, FrameDispatcher, MosaicFinalizer, PanoramaSession
//! └── storage/      ← PanoramaWriter, DirectoryStorage, metadata sidecars
//! ```

pub mod models;
pub mod processing;
pub mod session;
pub mod storage;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use models::config::PanoramaConfiguration;
pub use models::diagnostics::SessionDiagnostics;
pub use models::error::CaptureError;
pub use models::frame::{PixelFormat, PreviewSize};
pub use models::mosaic::{MosaicJpeg, MosaicResult, MosaicStatus};
pub use models::panorama::{ImageRecord, MediaHandle, PanoramaMetadata, StoredPanorama};
pub use models::progress::{AngleBudget, ProgressSample, SweepProgress};
pub use models::state::CaptureState;
pub use processing::sweep::{ProgressDirection, SweepDecision};
pub use session::context::MosaicContext;
pub use session::control_loop::{ControlHandle, ControlLoop, ControlMessage};
pub use session::finalizer::MosaicFinalizer;
pub use session::panorama_session::PanoramaSession;
pub use storage::directory::DirectoryStorage;
pub use storage::metadata::SidecarMetadataWriter;
pub use storage::panorama_writer::PanoramaWriter;
pub use traits::camera_source::CameraSource;
pub use traits::frame_surface::{FrameAvailableCallback, FrameSurface};
pub use traits::panorama_delegate::PanoramaDelegate;
pub use traits::renderer::PreviewRenderer;
pub use traits::stitching_engine::{ProgressListener, StitchingEngine};
pub use traits::storage::{MetadataWriter, PanoramaStorage};
