//! Bit-level codecs
//!
//! - Version header + UTF-8 payload packing
//! - Generalized Hamming single-error correction

/// Version header and UTF-8 payload packing
pub mod bit_codec;
/// Generalized Hamming code over the whole message
pub mod hamming;

pub use bit_codec::{BitCodec, CURRENT_VERSION, VERSION_BITS};
pub use hamming::{Corrected, ErrorCorrector};
