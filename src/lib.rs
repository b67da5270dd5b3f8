//! RustFGC - Fancy Galaxy Code encoder and decoder
//!
//! An FGC is a circular optical code: a filled center disc, a broken
//! orientation ring with a dot marking 0°, and concentric data rings whose
//! arcs and dots carry a Hamming-protected UTF-8 bitstream.
//!
//! ```no_run
//! let code = rust_fgc::encode("Milch.")?;
//! let image = image::DynamicImage::ImageLuma8(code.to_image(12.0));
//! let message = rust_fgc::decode(&image)?;
//! assert_eq!(message.text, "Milch.");
//! # Ok::<(), rust_fgc::FgcError>(())
//! ```

#![warn(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

/// Text to bits and the Hamming error corrector
pub mod codec;
/// Decoder settings, JSON and environment loading
pub mod config;
/// FGC detection modules (circles, contours, geometry, sampling)
pub mod detector;
/// Text to ring geometry
pub mod encoder;
/// Error types
pub mod error;
/// Ring layout, marks and canvases
pub mod layout;
/// Core data structures (BitMatrix, Point, shapes, descriptors)
pub mod models;
/// End-to-end decoding pipeline
pub mod pipeline;
/// Create-or-read conversation state machine
pub mod session;
/// Image loading, dataset iteration and stats helpers
pub mod tools;
/// Utility functions (grayscale, binarization, geometry)
pub mod utils;

use std::path::Path;

use image::DynamicImage;

pub use config::DecodeConfig;
pub use encoder::{EncodeOptions, EncodedCode, Encoder};
pub use error::{FgcError, Result};
pub use models::{BitMatrix, DecodeReport, DecodedMessage, Point};
pub use pipeline::FgcDecoder;

/// Encode `text` with default options.
pub fn encode(text: &str) -> Result<EncodedCode> {
    Encoder::default().encode(text)
}

/// Decode one image with the default settings.
pub fn decode(image: &DynamicImage) -> Result<DecodedMessage> {
    FgcDecoder::default().decode(image)
}

/// Load and decode an image file.
pub fn decode_image<P: AsRef<Path>>(path: P) -> Result<DecodedMessage> {
    let image = tools::load_image(path)?;
    decode(&image)
}

/// Decode images in parallel with the default settings.
pub fn decode_batch(images: &[DynamicImage]) -> Vec<Result<DecodedMessage>> {
    FgcDecoder::default().decode_batch(images)
}
