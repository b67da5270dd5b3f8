//! Single-error-correcting Hamming code over arbitrary-length bitstreams.
//!
//! Parity bits sit at every 1-based position that is a power of two. Unlike
//! fixed Hamming(7,4) blocks, one codeword spans the whole message, so at
//! most one flipped bit per message can be corrected.

use crate::models::BitStream;

/// Result of a Hamming decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Corrected {
    /// Payload with parity bits stripped.
    pub data: BitStream,
    /// Zero-based index of the flipped bit in the encoded stream, if any.
    pub corrected: Option<usize>,
}

/// Generalized Hamming encoder/decoder.
pub struct ErrorCorrector;

impl ErrorCorrector {
    /// Interleave parity bits into `data`.
    pub fn encode(data: &[bool]) -> BitStream {
        let mut encoded = Vec::with_capacity(data.len() + parity_count(data.len()));
        let mut remaining = data.iter();
        let mut position = 1usize;
        // The codeword never ends on a parity position.
        while remaining.len() > 0 {
            if position.is_power_of_two() {
                encoded.push(false);
            } else if let Some(&bit) = remaining.next() {
                encoded.push(bit);
            }
            position += 1;
        }

        let mut parity = 1usize;
        while parity <= encoded.len() {
            encoded[parity - 1] = parity_over(&encoded, parity);
            parity <<= 1;
        }
        encoded
    }

    /// Correct at most one flipped bit and strip the parity positions.
    pub fn decode(encoded: &[bool]) -> Corrected {
        let mut bits = encoded.to_vec();
        let syndrome = Self::syndrome(&bits);

        let corrected = if (1..=bits.len()).contains(&syndrome) {
            bits[syndrome - 1] = !bits[syndrome - 1];
            Some(syndrome - 1)
        } else {
            None
        };

        let data = bits
            .iter()
            .enumerate()
            .filter(|(i, _)| !(i + 1).is_power_of_two())
            .map(|(_, &bit)| bit)
            .collect();

        Corrected { data, corrected }
    }

    /// 1-based position of the single erroneous bit, 0 when consistent.
    pub fn syndrome(encoded: &[bool]) -> usize {
        let mut syndrome = 0usize;
        let mut parity = 1usize;
        while parity <= encoded.len() {
            if parity_over(encoded, parity) != encoded[parity - 1] {
                syndrome |= parity;
            }
            parity <<= 1;
        }
        syndrome
    }
}

/// XOR of every position covered by `parity`, excluding the parity bit itself.
fn parity_over(bits: &[bool], parity: usize) -> bool {
    bits.iter()
        .enumerate()
        .map(|(i, &bit)| (i + 1, bit))
        .filter(|&(pos, _)| pos != parity && pos & parity != 0)
        .fold(false, |acc, (_, bit)| acc ^ bit)
}

/// Number of parity bits needed to carry `data_len` data bits.
pub fn parity_count(data_len: usize) -> usize {
    let mut parity = 0;
    while (1usize << parity) < data_len + parity + 1 {
        parity += 1;
    }
    parity
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::BitCodec;
    use proptest::prelude::*;

    #[test]
    fn test_parity_positions() {
        let data = BitCodec::encode("Milch.");
        assert_eq!(data.len(), 52);
        let encoded = ErrorCorrector::encode(&data);
        assert_eq!(encoded.len(), 58);
        assert_eq!(parity_count(52), 6);
        assert_eq!(ErrorCorrector::syndrome(&encoded), 0);
    }

    #[test]
    fn test_short_streams() {
        assert!(ErrorCorrector::encode(&[]).is_empty());
        // One data bit lands on position 3 after parity 1 and 2.
        assert_eq!(ErrorCorrector::encode(&[true]), vec![true, true, true]);
        assert_eq!(ErrorCorrector::decode(&[]).data, Vec::<bool>::new());
    }

    #[test]
    fn test_corrects_every_single_flip() {
        let data = BitCodec::encode("Hi");
        let encoded = ErrorCorrector::encode(&data);
        for i in 0..encoded.len() {
            let mut noisy = encoded.clone();
            noisy[i] = !noisy[i];
            let result = ErrorCorrector::decode(&noisy);
            assert_eq!(result.data, data, "flip at {}", i);
            assert_eq!(result.corrected, Some(i));
        }
    }

    #[test]
    fn test_clean_decode_reports_no_correction() {
        let data = BitCodec::encode("clean");
        let result = ErrorCorrector::decode(&ErrorCorrector::encode(&data));
        assert_eq!(result.data, data);
        assert_eq!(result.corrected, None);
    }

    proptest! {
        #[test]
        fn prop_single_flip_round_trip(text in "\\PC{0,12}", flip in any::<prop::sample::Index>()) {
            let data = BitCodec::encode(&text);
            let mut encoded = ErrorCorrector::encode(&data);
            let i = flip.index(encoded.len());
            encoded[i] = !encoded[i];
            let decoded = ErrorCorrector::decode(&encoded);
            let (_, round_trip) = BitCodec::decode(&decoded.data).unwrap();
            prop_assert_eq!(round_trip, text.trim_end_matches('\0'));
        }
    }
}
