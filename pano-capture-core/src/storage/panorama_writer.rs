use std::fs;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Local};
use sha2::{Digest, Sha256};

use crate::models::error::CaptureError;
use crate::models::panorama::{ImageRecord, MediaHandle, PanoramaMetadata, StoredPanorama};
use crate::traits::storage::{MetadataWriter, PanoramaStorage};

use super::file_name;

/// Persists finished panoramas: file, metadata, media index.
#[derive(Clone)]
pub struct PanoramaWriter {
    storage: Arc<dyn PanoramaStorage>,
    metadata_writer: Arc<dyn MetadataWriter>,
    file_name_format: String,
}

impl PanoramaWriter {
    pub fn new(
        storage: Arc<dyn PanoramaStorage>,
        metadata_writer: Arc<dyn MetadataWriter>,
        file_name_format: impl Into<String>,
    ) -> Self {
        Self {
            storage,
            metadata_writer,
            file_name_format: file_name_format.into(),
        }
    }

    pub fn storage(&self) -> Arc<dyn PanoramaStorage> {
        Arc::clone(&self.storage)
    }

    /// Store an encoded panorama and register it.
    ///
    /// Returns `Ok(None)` when there is nothing to store. A metadata failure
    /// is logged and does not undo the written image.
    pub fn save_panorama(
        &self,
        jpeg: &[u8],
        width: u32,
        height: u32,
        orientation: u32,
        taken_at: DateTime<Local>,
    ) -> Result<Option<(StoredPanorama, MediaHandle)>, CaptureError> {
        if jpeg.is_empty() {
            return Ok(None);
        }

        let title = file_name::create_name(&self.file_name_format, &taken_at);
        let file_path = self.storage.write_file(&file_name::file_name_for(&title), jpeg)?;

        let panorama = StoredPanorama {
            file_name: title,
            length: file_length(&file_path).unwrap_or(jpeg.len() as u64),
            checksum: sha256_hex(jpeg),
            file_path,
            width,
            height,
            orientation,
            taken_at,
        };

        let metadata = PanoramaMetadata::for_panorama(&panorama);
        if let Err(e) = self.metadata_writer.write(&panorama.file_path, &metadata) {
            log::error!("Cannot set metadata for {}: {}", panorama.file_path.display(), e);
        }

        let handle = self.storage.register_image(&ImageRecord::from(&panorama))?;
        log::info!("Saved panorama {} as {}", panorama.file_path.display(), handle);
        Ok(Some((panorama, handle)))
    }
}

fn file_length(path: &Path) -> Option<u64> {
    fs::metadata(path).ok().map(|m| m.len())
}

/// SHA-256 hex digest of `data`.
pub fn sha256_hex(data: &[u8]) -> String {
    Sha256::digest(data).iter().map(|b| format!("{:02x}", b)).collect()
}
