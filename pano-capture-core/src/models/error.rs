use thiserror::Error;

/// Errors that can occur while capturing or finalizing a panorama.
///
/// An aborted stitch is reported as
/// [`MosaicResult::Cancelled`](super::mosaic::MosaicResult::Cancelled), never
/// as an error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("malformed mosaic buffer: {0}")]
    MalformedBuffer(String),

    #[error("encoding failed: {0}")]
    EncodingFailed(String),

    #[error("metadata write failed: {0}")]
    MetadataWriteFailed(String),

    #[error("storage error: {0}")]
    StorageError(String),

    #[error("configuration failed: {0}")]
    ConfigurationFailed(String),

    #[error("stitching engine failed: {0}")]
    EngineFailed(String),

    #[error("unknown error: {0}")]
    Unknown(String),
}
