use std::fs;
use std::path::{Path, PathBuf};

use crate::models::error::CaptureError;
use crate::models::panorama::PanoramaMetadata;
use crate::traits::storage::MetadataWriter;

/// Path of the metadata sidecar for `image_path`.
pub fn sidecar_path(image_path: &Path) -> PathBuf {
    image_path.with_extension("metadata.json")
}

/// Write panorama metadata as a JSON sidecar file.
///
/// Creates the sidecar next to the image, replacing its extension:
/// `PANO_x.jpg` gets `PANO_x.metadata.json`.
pub fn write_metadata(metadata: &PanoramaMetadata, image_path: &Path) -> Result<(), CaptureError> {
    let json = serde_json::to_string_pretty(metadata)
        .map_err(|e| CaptureError::MetadataWriteFailed(format!("failed to serialize metadata: {}", e)))?;
    fs::write(sidecar_path(image_path), json)
        .map_err(|e| CaptureError::MetadataWriteFailed(format!("failed to write metadata: {}", e)))?;
    Ok(())
}

/// Read panorama metadata from a JSON sidecar file.
pub fn read_metadata(image_path: &Path) -> Result<PanoramaMetadata, CaptureError> {
    let json = fs::read_to_string(sidecar_path(image_path))
        .map_err(|e| CaptureError::StorageError(format!("failed to read metadata: {}", e)))?;
    serde_json::from_str(&json).map_err(|e| CaptureError::StorageError(format!("failed to parse metadata: {}", e)))
}

/// [`MetadataWriter`] backed by JSON sidecar files.
#[derive(Debug, Clone, Copy, Default)]
pub struct SidecarMetadataWriter;

impl MetadataWriter for SidecarMetadataWriter {
    fn write(&self, image_path: &Path, metadata: &PanoramaMetadata) -> Result<(), CaptureError> {
        write_metadata(metadata, image_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata() -> PanoramaMetadata {
        PanoramaMetadata {
            id: "id-1".into(),
            date_time: "2024:01:02 03:04:05".into(),
            gps_date_stamp: "2024:01:02".into(),
            gps_time_stamp: "03:04:05".into(),
            orientation: 1,
            image_width: 10,
            image_length: 20,
            checksum: "00".into(),
        }
    }

    #[test]
    fn sidecar_round_trip() {
        let image_path = std::env::temp_dir().join("pano_capture_test_sidecar.jpg");
        write_metadata(&metadata(), &image_path).unwrap();

        let read = read_metadata(&image_path).unwrap();
        assert_eq!(read, metadata());

        fs::remove_file(sidecar_path(&image_path)).ok();
    }

    #[test]
    fn sidecar_replaces_the_image_extension() {
        let path = sidecar_path(Path::new("/media/PANO_20240102_030405.jpg"));
        assert_eq!(path, Path::new("/media/PANO_20240102_030405.metadata.json"));
    }

    #[test]
    fn unwritable_location_is_metadata_failure() {
        let image_path = std::env::temp_dir()
            .join("pano_capture_test_missing_dir")
            .join("nested")
            .join("x.jpg");
        let result = SidecarMetadataWriter.write(&image_path, &metadata());
        assert!(matches!(result, Err(CaptureError::MetadataWriteFailed(_))));
    }
}
