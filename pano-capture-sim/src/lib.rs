//! # pano-capture-sim
//!
//! Headless backend for pano-capture-core.
//!
//! Provides:
//! - `SimulatedCamera`: fixed preview geometry and field of view
//! - `HeadlessRenderer`: counts render calls; its `HeadlessSurface` can be
//!   driven from a producer thread like a real camera texture
//! - `SyntheticStitcher`: emits scripted sweep progress and produces a real
//!   NV21 mosaic with the big-endian width/height trailer
//! - `LoggingDelegate`: forwards session events to `log`
//!
//! ## Usage
//! ```ignore
//! use std::sync::Arc;
//! use pano_capture_core::{DirectoryStorage, MosaicContext, PanoramaConfiguration, PanoramaSession};
//! use pano_capture_sim::{HeadlessRenderer, SimulatedCamera, SyntheticStitcher};
//!
//! let context = MosaicContext::new(Arc::new(SyntheticStitcher::default()));
//! let mut session = PanoramaSession::new(
//!     SimulatedCamera::default(),
//!     HeadlessRenderer::new(),
//!     context,
//!     Arc::new(DirectoryStorage::new("panoramas")),
//!     PanoramaConfiguration::default(),
//! )?;
//! session.on_surface_available()?;
//! session.start_capture();
//! ```

pub mod camera;
pub mod delegate;
pub mod renderer;
pub mod stitcher;

pub use camera::SimulatedCamera;
pub use delegate::LoggingDelegate;
pub use renderer::{HeadlessRenderer, HeadlessSurface, RenderCounts};
pub use stitcher::{StitcherScript, SyntheticStitcher};
