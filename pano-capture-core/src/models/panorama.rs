use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Reference to an image registered with the media index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MediaHandle(pub String);

impl MediaHandle {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MediaHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A panorama that has been written to storage.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredPanorama {
    pub file_name: String,
    pub file_path: PathBuf,
    pub length: u64,
    pub width: u32,
    pub height: u32,
    /// Degrees: 0, 90, 180 or 270.
    pub orientation: u32,
    pub taken_at: DateTime<Local>,
    pub checksum: String,
}

/// Arguments to [`PanoramaStorage::register_image`](crate::traits::storage::PanoramaStorage::register_image).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub title: String,
    pub taken_at_ms: i64,
    pub orientation: u32,
    pub length: u64,
    pub file_path: String,
    pub width: u32,
    pub height: u32,
}

impl From<&StoredPanorama> for ImageRecord {
    fn from(pano: &StoredPanorama) -> Self {
        Self {
            title: pano.file_name.clone(),
            taken_at_ms: pano.taken_at.timestamp_millis(),
            orientation: pano.orientation,
            length: pano.length,
            file_path: pano.file_path.to_string_lossy().to_string(),
            width: pano.width,
            height: pano.height,
        }
    }
}

/// Image tags attached to a stored panorama.
///
/// Field names follow the EXIF tags they stand in for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PanoramaMetadata {
    pub id: String,
    pub date_time: String,
    #[serde(rename = "GPSDateStamp")]
    pub gps_date_stamp: String,
    #[serde(rename = "GPSTimeStamp")]
    pub gps_time_stamp: String,
    pub orientation: u16,
    pub image_width: u32,
    pub image_length: u32,
    pub checksum: String,
}

impl PanoramaMetadata {
    pub fn for_panorama(pano: &StoredPanorama) -> Self {
        let utc = pano.taken_at.with_timezone(&chrono::Utc);
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            date_time: pano.taken_at.format("%Y:%m:%d %H:%M:%S").to_string(),
            gps_date_stamp: utc.format("%Y:%m:%d").to_string(),
            gps_time_stamp: utc.format("%H:%M:%S").to_string(),
            orientation: exif_orientation(pano.orientation),
            image_width: pano.width,
            image_length: pano.height,
            checksum: pano.checksum.clone(),
        }
    }
}

/// Map a rotation in degrees to the EXIF orientation code.
pub fn exif_orientation(degrees: u32) -> u16 {
    match degrees % 360 {
        90 => 6,
        180 => 3,
        270 => 8,
        _ => 1,
    }
}
