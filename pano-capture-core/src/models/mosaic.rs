use super::error::CaptureError;

/// Return code of a stitching engine `create_mosaic` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MosaicStatus {
    Ok,
    Cancelled,
    Error,
}

/// An encoded (JPEG) mosaic and its dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MosaicJpeg {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Outcome of one finalization pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MosaicResult {
    /// The stitch was aborted. Not an error; the session returns to the viewfinder.
    Cancelled,
    Error(CaptureError),
    Ready(MosaicJpeg),
}

impl MosaicResult {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}
