//! Least-significant-bit embedding over permuted slots.
//!
//! Shared by the image plain-bit strategy (one slot per channel byte) and
//! the audio codec (one slot per 16-bit sample).

use crate::encoding::{
    decode_sentinel_framed, frame_with_sentinel, sentinel_capacity, sentinel_framed_len,
};
use crate::error::{Error, Result};
use crate::placement::{select, PlacementKey};
use log::{debug, warn};

/// A storage value whose lowest bit can carry one payload bit.
pub(crate) trait LsbSlot: Copy {
    fn lsb(self) -> u8;
    fn with_lsb(self, bit: u8) -> Self;
}

impl LsbSlot for u8 {
    fn lsb(self) -> u8 {
        self & 1
    }

    fn with_lsb(self, bit: u8) -> Self {
        (self & 0xFE) | (bit & 1)
    }
}

impl LsbSlot for i16 {
    fn lsb(self) -> u8 {
        (self as u16 & 1) as u8
    }

    fn with_lsb(self, bit: u8) -> Self {
        ((self as u16 & 0xFFFE) | u16::from(bit & 1)) as i16
    }
}

/// Characters that fit into `slots`.
pub(crate) fn capacity(slots: usize) -> usize {
    sentinel_capacity(slots)
}

/// Hide a sentinel-framed message in pseudo-randomly chosen slots.
pub(crate) fn hide<T: LsbSlot>(slots: &mut [T], message: &str, password: Option<&[u8]>) -> Result<()> {
    let length = message.chars().count();
    let capacity = capacity(slots.len());
    if length > capacity {
        return Err(Error::MessageTooLong { length, capacity });
    }

    let bits = frame_with_sentinel(message)?;
    let key = PlacementKey::for_hide(password, length);
    let indices = select(slots.len(), key, bits.len())?;
    debug!(
        "lsb: writing {} bits into {} slots (seed {})",
        bits.len(),
        slots.len(),
        key.seed()
    );

    for (&index, &bit) in indices.iter().zip(&bits) {
        slots[index] = slots[index].with_lsb(bit);
    }
    Ok(())
}

/// Read a sentinel-framed message back from the same slot permutation.
///
/// With `expected_length` exactly `length * 8 + 16` bits are read, otherwise
/// every slot is visited. Without a stop marker the decoded bits are
/// returned as they are.
pub(crate) fn extract<T: LsbSlot>(
    slots: &[T],
    password: Option<&[u8]>,
    expected_length: Option<usize>,
) -> Result<String> {
    let total = slots.len();
    let count = expected_length
        .map(|length| sentinel_framed_len(length).min(total))
        .unwrap_or(total);

    let key = PlacementKey::for_extract(password, expected_length, total);
    let bits: Vec<u8> = select(total, key, count)?
        .into_iter()
        .map(|index| slots[index].lsb())
        .collect();

    let (text, found) = decode_sentinel_framed(&bits);
    if !found {
        warn!("lsb: no stop marker in {} bits, returning raw decode", bits.len());
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_u8_slot() {
        assert_eq!(0b1010_1010u8.with_lsb(1), 0b1010_1011);
        assert_eq!(0b1010_1011u8.with_lsb(0), 0b1010_1010);
        assert_eq!(7u8.lsb(), 1);
    }

    #[test]
    fn test_i16_slot_uses_unsigned_view() {
        assert_eq!((-1i16).with_lsb(0), -2);
        assert_eq!((-2i16).with_lsb(1), -1);
        assert_eq!(i16::MIN.with_lsb(1), i16::MIN + 1);
        assert_eq!((-3i16).lsb(), 1);
        assert_eq!(100i16.with_lsb(1), 101);
    }

    #[test]
    fn test_roundtrip_with_password() {
        let mut slots: Vec<u8> = (0..4000).map(|i| (i * 7 % 256) as u8).collect();
        hide(&mut slots, "hello world", Some(b"secret")).unwrap();
        assert_eq!(extract(&slots, Some(b"secret"), None).unwrap(), "hello world");
    }

    #[test]
    fn test_roundtrip_without_password_needs_length() {
        let mut slots: Vec<i16> = (0..2000).map(|i| (i * 31 % 2000) as i16 - 1000).collect();
        hide(&mut slots, "fragile", None).unwrap();

        // The fallback seed is the message length, so the extractor must know it.
        assert_eq!(extract(&slots, None, Some(7)).unwrap(), "fragile");
        assert_ne!(extract(&slots, None, None).unwrap(), "fragile");
    }

    #[test]
    fn test_only_lowest_bits_change() {
        let original: Vec<u8> = (0..1000).map(|i| (i % 256) as u8).collect();
        let mut slots = original.clone();
        hide(&mut slots, "abc", Some(b"k")).unwrap();
        for (a, b) in original.iter().zip(&slots) {
            assert_eq!(a & 0xFE, b & 0xFE);
        }
    }

    #[test]
    fn test_message_too_long() {
        let mut slots = vec![0u8; 100];
        // (100 - 16) / 8 = 10
        assert!(hide(&mut slots, "0123456789", Some(b"k")).is_ok());
        assert!(matches!(
            hide(&mut slots, "0123456789a", Some(b"k")),
            Err(Error::MessageTooLong {
                length: 11,
                capacity: 10
            })
        ));
    }

    #[test]
    fn test_tiny_carrier() {
        let mut slots = vec![0u8; 10];
        assert!(matches!(
            hide(&mut slots, "", None),
            Err(Error::CarrierTooSmall {
                needed: 16,
                available: 10
            })
        ));
    }
}
