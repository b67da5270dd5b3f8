//! Error types shared by the encoder and the decoding pipeline.

use thiserror::Error;

/// Errors raised while turning text into a bitstream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// The requested version does not fit in the 4-bit header.
    #[error("version {0} does not fit in the version header")]
    VersionOutOfRange(u8),
}

/// Errors raised while locating the code geometry in an image.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocatorError {
    /// The circle finder produced no candidate centers.
    #[error("no circle candidates found in image")]
    NoHoughCircle,
    /// No admissible center/orientation-ring pair was found.
    #[error("no center pair found among {candidates} candidate shapes")]
    NoCenterFound {
        /// Number of candidate shapes that were considered.
        candidates: usize,
    },
    /// No shape smaller than the center disc was found near the center.
    #[error("no orientation dot found")]
    NoOrientationDot,
}

/// Errors raised while turning recovered bits back into text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Fewer bits than the version header were recovered.
    #[error("bitstream holds {0} bits, fewer than the version header")]
    MissingVersion(usize),
    /// The payload bytes hold no valid UTF-8 prefix.
    #[error("payload is not valid UTF-8")]
    InvalidText,
}

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum FgcError {
    /// Encoding failed.
    #[error("encode error: {0}")]
    Encode(#[from] EncodeError),
    /// Code geometry could not be located.
    #[error("locator error: {0}")]
    Locator(#[from] LocatorError),
    /// Too few shapes survived outlier removal.
    #[error("sanitization left {survivors} shapes, at least 3 are required")]
    Sanitization {
        /// Number of shapes retained.
        survivors: usize,
    },
    /// Bits could not be turned back into text.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),
    /// Invalid configuration value or document.
    #[error("invalid configuration: {0}")]
    Config(String),
    /// Configuration document could not be parsed.
    #[error("invalid configuration document: {0}")]
    Json(#[from] serde_json::Error),
    /// Image loading or saving failed.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    /// File I/O failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, FgcError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_errors_convert() {
        let err: FgcError = LocatorError::NoHoughCircle.into();
        assert!(matches!(err, FgcError::Locator(LocatorError::NoHoughCircle)));
        assert_eq!(
            err.to_string(),
            "locator error: no circle candidates found in image"
        );

        let err: FgcError = DecodeError::InvalidText.into();
        assert!(matches!(err, FgcError::Decode(DecodeError::InvalidText)));
    }
}
