use chrono::{DateTime, Local};

/// File extension of stored panoramas.
pub const PANORAMA_EXTENSION: &str = "jpg";

/// Name a panorama from its capture start time using a `chrono` format string.
pub fn create_name(format: &str, taken_at: &DateTime<Local>) -> String {
    use std::fmt::Write;

    let mut name = String::new();
    if write!(name, "{}", taken_at.format(format)).is_err() {
        // Invalid format specifiers make chrono's Display fail.
        log::warn!("Invalid file name format {:?}, falling back to a timestamp", format);
        name = format!("PANO_{}", taken_at.timestamp_millis());
    }
    name
}

/// File name with extension for a panorama title.
pub fn file_name_for(title: &str) -> String {
    format!("{}.{}", title, PANORAMA_EXTENSION)
}
