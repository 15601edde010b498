//! Error types shared by the geometry core, the orchestrator and the raster engine.

use thiserror::Error;

/// Errors produced while building or transforming an [`Image`](crate::Image).
#[derive(Debug, Error)]
pub enum ThumbnailError {
    /// Unrecognized construction option or an option value of the wrong type.
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// The image decoded fine but is not GIF, JPEG or PNG, or an output
    /// type was requested that the engine cannot produce.
    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// A computation would yield a non-positive dimension, or an orientation
    /// code falls outside 0-8.
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    /// The raster engine reported a failure (allocation, resample, rotate, encode).
    #[error("Raster engine failure: {0}")]
    EngineFailure(String),

    /// The input bytes are not a recognizable image, or they are corrupted.
    #[error("Could not decode image: {0}")]
    Decode(String),

    /// I/O error while reading or writing a file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ThumbnailError {
    pub(crate) fn geometry(message: impl Into<String>) -> Self {
        ThumbnailError::InvalidGeometry(message.into())
    }

    pub(crate) fn engine(message: impl Into<String>) -> Self {
        ThumbnailError::EngineFailure(message.into())
    }
}

/// Result type for thumbnail operations.
pub type Result<T> = std::result::Result<T, ThumbnailError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ThumbnailError::geometry("width must be positive");
        assert_eq!(err.to_string(), "Invalid geometry: width must be positive");

        let err = ThumbnailError::UnsupportedFormat("bmp".to_string());
        assert_eq!(err.to_string(), "Unsupported image format: bmp");
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.png");
        let err: ThumbnailError = io.into();
        assert!(matches!(err, ThumbnailError::Io(_)));
        assert!(err.to_string().contains("missing.png"));
    }
}
