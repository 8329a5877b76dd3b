use std::path::{Path, PathBuf};

use crate::models::error::CaptureError;
use crate::models::panorama::{ImageRecord, MediaHandle, PanoramaMetadata};

/// Persistent storage plus media index registration.
pub trait PanoramaStorage: Send + Sync {
    /// Write `data` under `name` and return the resulting path.
    fn write_file(&self, name: &str, data: &[u8]) -> Result<PathBuf, CaptureError>;

    /// Register a written image with the media index.
    fn register_image(&self, record: &ImageRecord) -> Result<MediaHandle, CaptureError>;
}

/// Attaches image tags to a file that has already been written.
pub trait MetadataWriter: Send + Sync {
    fn write(&self, image_path: &Path, metadata: &PanoramaMetadata) -> Result<(), CaptureError>;
}
