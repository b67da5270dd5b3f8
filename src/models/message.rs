use std::time::Duration;

use image::RgbImage;

use crate::detector::features::FeatureStats;
use crate::detector::sampler::SlotSample;
use crate::error::{FgcError, Result};
use crate::models::BitStream;

/// A successfully decoded code.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct DecodedMessage {
    /// Wire format version from the header
    pub version: u8,
    /// Decoded text
    pub text: String,
    /// Bits recovered from the image, before error correction
    pub raw_bits: BitStream,
    /// Wall time spent decoding
    pub elapsed: Duration,
    /// Index of the bit flipped by error correction, if any
    pub corrected_bit: Option<usize>,
}

/// Per-stage counters collected while decoding.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    /// Circle candidates from the circle finder
    pub hough_circles: usize,
    /// Contour filter counters
    pub features: FeatureStats,
    /// Candidates left after outlier removal
    pub retained: usize,
    /// Member count per ring group
    pub ring_sizes: Vec<usize>,
    /// Every slot the sampler probed
    pub samples: Vec<SlotSample>,
}

/// Outcome of one decode attempt with everything gathered on the way.
///
/// On failure the outcome holds the error while the diagnostics, raw bits
/// and annotated image keep whatever the pipeline produced before stopping.
#[derive(Debug)]
pub struct DecodeReport {
    /// Decoded message or the error that stopped the pipeline
    pub outcome: Result<DecodedMessage>,
    /// Bits recovered from the image, empty if sampling was not reached
    pub raw_bits: BitStream,
    /// Wall time spent decoding
    pub elapsed: Duration,
    /// Per-stage counters
    pub diagnostics: Diagnostics,
    /// Input image with the detected geometry drawn on top
    pub annotated: Option<RgbImage>,
}

impl DecodeReport {
    /// Decoded text, empty when decoding failed
    pub fn text(&self) -> &str {
        self.outcome.as_ref().map(|m| m.text.as_str()).unwrap_or("")
    }

    /// Whether the decode succeeded
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }

    /// Error that stopped the pipeline, if any
    pub fn error(&self) -> Option<&FgcError> {
        self.outcome.as_ref().err()
    }

    /// Drop the diagnostics and keep the outcome
    pub fn into_result(self) -> Result<DecodedMessage> {
        self.outcome
    }
}
