use std::path::PathBuf;

/// Default sweep limit per axis, in degrees.
pub const DEFAULT_SWEEP_ANGLE: f32 = 160.0;

/// Default chrono format for panorama file names.
pub const DEFAULT_FILE_NAME_FORMAT: &str = "PANO_%Y%m%d_%H%M%S";

/// Configuration for a panorama capture session.
#[derive(Debug, Clone)]
pub struct PanoramaConfiguration {
    /// Accumulated sweep (degrees, per axis) at which capture stops on its own (default: 160).
    pub sweep_limit_degrees: f32,

    /// Directory where panoramas are written.
    pub output_directory: PathBuf,

    /// `chrono` format string applied to the capture start time to name the file.
    pub file_name_format: String,

    /// JPEG quality, 1..=100 (default: 100).
    pub jpeg_quality: u8,

    /// Extra bytes added to the engine's per-frame buffer size.
    ///
    /// Some camera drivers write past the nominal frame size.
    pub preview_buffer_padding: usize,

    /// Orientation of the device at capture time in degrees (0, 90, 180 or 270).
    pub capture_orientation: u32,
}

impl PanoramaConfiguration {
    pub fn validate(&self) -> Result<(), String> {
        if !self.sweep_limit_degrees.is_finite() || self.sweep_limit_degrees <= 0.0 {
            return Err(format!(
                "sweep limit must be a positive angle: {}",
                self.sweep_limit_degrees
            ));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(format!("unsupported jpeg quality: {}", self.jpeg_quality));
        }
        if self.file_name_format.trim().is_empty() {
            return Err("file name format must not be empty".into());
        }
        if self.capture_orientation % 90 != 0 || self.capture_orientation >= 360 {
            return Err(format!(
                "unsupported capture orientation: {}",
                self.capture_orientation
            ));
        }
        Ok(())
    }
}

impl Default for PanoramaConfiguration {
    fn default() -> Self {
        Self {
            sweep_limit_degrees: DEFAULT_SWEEP_ANGLE,
            output_directory: PathBuf::from("."),
            file_name_format: DEFAULT_FILE_NAME_FORMAT.to_string(),
            jpeg_quality: 100,
            preview_buffer_padding: 32,
            capture_orientation: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(PanoramaConfiguration::default().validate().is_ok());
    }

    #[test]
    fn rejects_bad_values() {
        let config = PanoramaConfiguration {
            sweep_limit_degrees: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = PanoramaConfiguration {
            jpeg_quality: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = PanoramaConfiguration {
            file_name_format: "  ".into(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = PanoramaConfiguration {
            capture_orientation: 45,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
