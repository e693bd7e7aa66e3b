//! Sentinel-framed bit streams.
//!
//! A message becomes one byte per character, most significant bit first,
//! followed by [`STOP_SEQUENCE`]. Bits are stored one per `u8` (0 or 1).

use crate::config::STOP_SEQUENCE;
use crate::error::{Error, Result};

/// Convert text to bits, 8 per character.
///
/// Fails with [`Error::EncodingUnsupported`] on any code point above U+00FF.
pub fn to_bits(text: &str) -> Result<Vec<u8>> {
    let mut bits = Vec::with_capacity(text.len() * 8);
    for (position, character) in text.chars().enumerate() {
        let code = u32::from(character);
        if code > 0xFF {
            return Err(Error::EncodingUnsupported {
                character,
                position,
            });
        }
        push_byte(&mut bits, code as u8);
    }
    Ok(bits)
}

/// Convert bits back to text, 8 per character.
///
/// Lenient: a trailing group shorter than 8 bits is dropped and never fails.
pub fn from_bits(bits: &[u8]) -> String {
    bits.chunks_exact(8)
        .map(|group| char::from(byte_from_bits(group)))
        .collect()
}

/// Character bits followed by the stop marker.
pub fn frame_with_sentinel(text: &str) -> Result<Vec<u8>> {
    let mut bits = to_bits(text)?;
    bits.extend_from_slice(&STOP_SEQUENCE);
    Ok(bits)
}

/// Index of the first occurrence of the stop marker, at any bit offset.
pub fn find_sentinel(bits: &[u8]) -> Option<usize> {
    bits.windows(STOP_SEQUENCE.len())
        .position(|window| window == STOP_SEQUENCE)
}

/// Decode a sentinel-framed stream.
///
/// Returns the text before the first stop marker and whether one was found.
/// Without a marker the whole stream is decoded best-effort.
pub fn decode_sentinel_framed(bits: &[u8]) -> (String, bool) {
    match find_sentinel(bits) {
        Some(end) => (from_bits(&bits[..end]), true),
        None => (from_bits(bits), false),
    }
}

/// Number of framed bits for a message of `chars` characters.
pub fn sentinel_framed_len(chars: usize) -> usize {
    chars * 8 + STOP_SEQUENCE.len()
}

/// Characters that fit into `slots` one-bit slots after the stop marker.
pub fn sentinel_capacity(slots: usize) -> usize {
    slots.saturating_sub(STOP_SEQUENCE.len()) / 8
}

/// Append one byte as 8 bits, most significant first.
pub fn push_byte(bits: &mut Vec<u8>, byte: u8) {
    bits.extend((0..8).rev().map(|shift| (byte >> shift) & 1));
}

/// Expand bytes into bits, most significant first.
pub fn bits_from_bytes(bytes: &[u8]) -> Vec<u8> {
    let mut bits = Vec::with_capacity(bytes.len() * 8);
    for &byte in bytes {
        push_byte(&mut bits, byte);
    }
    bits
}

/// Pack up to 8 bits into a byte, most significant first.
pub fn byte_from_bits(group: &[u8]) -> u8 {
    group.iter().fold(0u8, |acc, &bit| (acc << 1) | (bit & 1))
}

/// Pack bits into bytes; a trailing partial group is dropped.
pub fn bytes_from_bits(bits: &[u8]) -> Vec<u8> {
    bits.chunks_exact(8).map(byte_from_bits).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_bits_msb_first() {
        let bits = to_bits("A").unwrap();
        assert_eq!(bits, vec![0, 1, 0, 0, 0, 0, 0, 1]);
    }

    #[test]
    fn test_latin1_roundtrip() {
        let text = "héllo ÿ";
        let bits = to_bits(text).unwrap();
        assert_eq!(bits.len(), text.chars().count() * 8);
        assert_eq!(from_bits(&bits), text);
    }

    #[test]
    fn test_multibyte_character_rejected() {
        match to_bits("ok ✓") {
            Err(Error::EncodingUnsupported {
                character,
                position,
            }) => {
                assert_eq!(character, '✓');
                assert_eq!(position, 3);
            }
            other => panic!("expected EncodingUnsupported, got {other:?}"),
        }
    }

    #[test]
    fn test_from_bits_drops_partial_group() {
        let mut bits = to_bits("hi").unwrap();
        bits.extend_from_slice(&[1, 0, 1]);
        assert_eq!(from_bits(&bits), "hi");
    }

    #[test]
    fn test_sentinel_framing() {
        let bits = frame_with_sentinel("hello world").unwrap();
        assert_eq!(bits.len(), sentinel_framed_len(11));
        assert_eq!(find_sentinel(&bits), Some(88));

        let (text, found) = decode_sentinel_framed(&bits);
        assert!(found);
        assert_eq!(text, "hello world");
    }

    #[test]
    fn test_missing_sentinel_is_best_effort() {
        let bits = to_bits("partial").unwrap();
        let (text, found) = decode_sentinel_framed(&bits);
        assert!(!found);
        assert_eq!(text, "partial");
    }

    #[test]
    fn test_sentinel_false_positive_inside_payload() {
        // 0xFF 0xFE spells the stop marker on its own
        let bits = frame_with_sentinel("a\u{ff}\u{fe}b").unwrap();
        assert_eq!(decode_sentinel_framed(&bits).0, "a");
    }

    #[test]
    fn test_sentinel_capacity() {
        assert_eq!(sentinel_capacity(100 * 100 * 3), 3748);
        assert_eq!(sentinel_capacity(20000), 2498);
        assert_eq!(sentinel_capacity(10), 0);
    }

    #[test]
    fn test_bytes_bits_helpers() {
        let bytes = [0x00, 0x7F, 0x80, 0xFF];
        assert_eq!(bytes_from_bits(&bits_from_bytes(&bytes)), bytes);
    }
}
