use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::models::error::CaptureError;
use crate::models::mosaic::{MosaicJpeg, MosaicResult, MosaicStatus};
use crate::processing::{jpeg, mosaic_buffer};
use crate::traits::stitching_engine::StitchingEngine;

/// Turns the engine's accumulated frames into an encoded mosaic.
///
/// Runs on worker threads only.
#[derive(Clone)]
pub struct MosaicFinalizer {
    engine: Arc<dyn StitchingEngine>,
    cancel: Arc<AtomicBool>,
    jpeg_quality: u8,
}

impl MosaicFinalizer {
    pub fn new(engine: Arc<dyn StitchingEngine>, cancel: Arc<AtomicBool>, jpeg_quality: u8) -> Self {
        Self {
            engine,
            cancel,
            jpeg_quality,
        }
    }

    /// Generate the final mosaic at the requested fidelity.
    ///
    /// Once cancellation is observed no `Ready` result is produced, even if
    /// the engine already finished.
    pub fn generate_final_mosaic(&self, high_res: bool) -> MosaicResult {
        match self.engine.create_mosaic(high_res, &self.cancel) {
            MosaicStatus::Cancelled => return MosaicResult::Cancelled,
            MosaicStatus::Error => {
                return MosaicResult::Error(CaptureError::EngineFailed(format!(
                    "create_mosaic(high_res = {}) failed",
                    high_res
                )))
            }
            MosaicStatus::Ok => {}
        }
        if self.is_cancelled() {
            return MosaicResult::Cancelled;
        }

        let Some(buffer) = self.engine.final_mosaic_buffer().filter(|b| !b.is_empty()) else {
            log::error!("Stitching engine returned no mosaic buffer");
            return MosaicResult::Error(CaptureError::MalformedBuffer("engine returned no buffer".into()));
        };

        let encoded = mosaic_buffer::decode(&buffer).and_then(|raw| {
            let data = jpeg::compress_nv21(raw.pixels, raw.width, raw.height, self.jpeg_quality)?;
            Ok(MosaicJpeg {
                data,
                width: raw.width,
                height: raw.height,
            })
        });

        match encoded {
            Ok(_) if self.is_cancelled() => MosaicResult::Cancelled,
            Ok(jpeg) => MosaicResult::Ready(jpeg),
            Err(e) => {
                log::error!("Failed to build final mosaic: {}", e);
                MosaicResult::Error(e)
            }
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }
}
