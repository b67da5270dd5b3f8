//! Version header and UTF-8 payload packing.
//!
//! The wire format is a 4-bit version header followed by the UTF-8 bytes
//! of the message, every value written most significant bit first.

use crate::error::{DecodeError, EncodeError};
use crate::models::BitStream;

/// Number of bits in the version header.
pub const VERSION_BITS: usize = 4;

/// Wire format revision written by this crate.
pub const CURRENT_VERSION: u8 = 1;

/// Packs and unpacks version + text bitstreams.
pub struct BitCodec;

impl BitCodec {
    /// Encode text with the current version header.
    pub fn encode(text: &str) -> BitStream {
        let mut bits = Vec::with_capacity(VERSION_BITS + text.len() * 8);
        push_bits(&mut bits, CURRENT_VERSION as u32, VERSION_BITS);
        for byte in text.bytes() {
            push_bits(&mut bits, byte as u32, 8);
        }
        bits
    }

    /// Encode text with an explicit version header.
    pub fn encode_with_version(version: u8, text: &str) -> Result<BitStream, EncodeError> {
        if version as u32 >= 1 << VERSION_BITS {
            return Err(EncodeError::VersionOutOfRange(version));
        }
        let mut bits = Self::encode(text);
        for (i, bit) in bits.iter_mut().take(VERSION_BITS).enumerate() {
            *bit = (version >> (VERSION_BITS - 1 - i)) & 1 == 1;
        }
        Ok(bits)
    }

    /// Decode a bitstream into its version and text.
    ///
    /// A trailing partial byte is ignored. Invalid trailing UTF-8 is dropped
    /// byte by byte; trailing NUL characters are stripped afterwards.
    pub fn decode(bits: &[bool]) -> Result<(u8, String), DecodeError> {
        if bits.len() < VERSION_BITS {
            return Err(DecodeError::MissingVersion(bits.len()));
        }
        let version = read_bits(&bits[..VERSION_BITS]) as u8;

        let bytes: Vec<u8> = bits[VERSION_BITS..]
            .chunks_exact(8)
            .map(|chunk| read_bits(chunk) as u8)
            .collect();

        let text = match std::str::from_utf8(&bytes) {
            Ok(text) => text,
            Err(err) => {
                let valid = err.valid_up_to();
                if valid == 0 {
                    return Err(DecodeError::InvalidText);
                }
                // Dropping bytes from the end stops at the longest valid prefix.
                std::str::from_utf8(&bytes[..valid]).map_err(|_| DecodeError::InvalidText)?
            }
        };

        Ok((version, text.trim_end_matches('\0').to_string()))
    }
}

fn push_bits(bits: &mut BitStream, value: u32, count: usize) {
    for i in (0..count).rev() {
        bits.push((value >> i) & 1 == 1);
    }
}

fn read_bits(bits: &[bool]) -> u32 {
    bits.iter().fold(0u32, |acc, &bit| (acc << 1) | bit as u32)
}
