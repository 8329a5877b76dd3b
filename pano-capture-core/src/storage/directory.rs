use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::models::error::CaptureError;
use crate::models::panorama::{ImageRecord, MediaHandle};
use crate::traits::storage::PanoramaStorage;

/// Name of the media index file kept in the storage directory.
pub const MEDIA_INDEX_FILE: &str = "media_index.json";

/// One registered image in the media index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaEntry {
    pub handle: MediaHandle,
    pub registered_at: String,
    #[serde(flatten)]
    pub record: ImageRecord,
}

/// [`PanoramaStorage`] that writes into a directory and keeps a JSON media index there.
pub struct DirectoryStorage {
    directory: PathBuf,
    index_lock: Mutex<()>,
}

impl DirectoryStorage {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            index_lock: Mutex::new(()),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn index_path(&self) -> PathBuf {
        self.directory.join(MEDIA_INDEX_FILE)
    }

    /// All registered images, oldest first.
    pub fn entries(&self) -> Result<Vec<MediaEntry>, CaptureError> {
        let _guard = self.index_lock.lock();
        self.read_index()
    }

    fn read_index(&self) -> Result<Vec<MediaEntry>, CaptureError> {
        let path = self.index_path();
        if !path.exists() {
            return Ok(Vec::new());
        }
        let json = fs::read_to_string(&path)
            .map_err(|e| CaptureError::StorageError(format!("failed to read media index: {}", e)))?;
        serde_json::from_str(&json)
            .map_err(|e| CaptureError::StorageError(format!("failed to parse media index: {}", e)))
    }

    fn ensure_directory(&self) -> Result<(), CaptureError> {
        fs::create_dir_all(&self.directory)
            .map_err(|e| CaptureError::StorageError(format!("failed to create directory: {}", e)))
    }
}

impl PanoramaStorage for DirectoryStorage {
    fn write_file(&self, name: &str, data: &[u8]) -> Result<PathBuf, CaptureError> {
        self.ensure_directory()?;
        let path = self.directory.join(name);
        fs::write(&path, data)
            .map_err(|e| CaptureError::StorageError(format!("failed to write {}: {}", path.display(), e)))?;
        Ok(path)
    }

    fn register_image(&self, record: &ImageRecord) -> Result<MediaHandle, CaptureError> {
        let _guard = self.index_lock.lock();
        self.ensure_directory()?;

        let mut entries = self.read_index()?;
        let handle = MediaHandle(format!("media://panorama/{}", uuid::Uuid::new_v4()));
        entries.push(MediaEntry {
            handle: handle.clone(),
            registered_at: chrono::Utc::now().to_rfc3339(),
            record: record.clone(),
        });

        let json = serde_json::to_string_pretty(&entries)
            .map_err(|e| CaptureError::StorageError(format!("failed to serialize media index: {}", e)))?;
        fs::write(self.index_path(), json)
            .map_err(|e| CaptureError::StorageError(format!("failed to write media index: {}", e)))?;
        Ok(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("pano_capture_test_{}_{}", name, uuid::Uuid::new_v4()))
    }

    fn record(path: &Path) -> ImageRecord {
        ImageRecord {
            title: "PANO_1".into(),
            taken_at_ms: 1_000,
            orientation: 0,
            length: 3,
            file_path: path.to_string_lossy().to_string(),
            width: 4,
            height: 2,
        }
    }

    #[test]
    fn writes_file_into_directory() {
        let dir = temp_dir("write");
        let storage = DirectoryStorage::new(&dir);

        let path = storage.write_file("PANO_1.jpg", &[1, 2, 3]).unwrap();
        assert_eq!(path, dir.join("PANO_1.jpg"));
        assert_eq!(fs::read(&path).unwrap(), vec![1, 2, 3]);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn registration_appends_to_index() {
        let dir = temp_dir("register");
        let storage = DirectoryStorage::new(&dir);
        let path = storage.write_file("PANO_1.jpg", &[1, 2, 3]).unwrap();

        let first = storage.register_image(&record(&path)).unwrap();
        let second = storage.register_image(&record(&path)).unwrap();
        assert_ne!(first, second);
        assert!(first.as_str().starts_with("media://panorama/"));

        let entries = storage.entries().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].handle, first);
        assert_eq!(entries[1].record.width, 4);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn empty_directory_has_no_entries() {
        let storage = DirectoryStorage::new(temp_dir("empty"));
        assert!(storage.entries().unwrap().is_empty());
    }
}
