//! Length-prefixed framing.
//!
//! A 32-bit big-endian byte count followed by that many bytes, no stop
//! marker. Used by the video and text carriers for encrypted payloads.

use crate::config::LENGTH_PREFIX_BITS;
use crate::encoding::bits::{bits_from_bytes, bytes_from_bits};
use crate::error::{Error, Result};

/// Frame a payload as bits: length prefix then payload.
pub fn frame_length_prefixed(payload: &[u8]) -> Result<Vec<u8>> {
    let length = u32::try_from(payload.len()).map_err(|_| Error::MessageTooLong {
        length: payload.len(),
        capacity: u32::MAX as usize,
    })?;

    let mut bytes = Vec::with_capacity(4 + payload.len());
    bytes.extend_from_slice(&length.to_be_bytes());
    bytes.extend_from_slice(payload);
    Ok(bits_from_bytes(&bytes))
}

/// Total framed bit count for a payload of `len` bytes.
pub fn length_prefixed_bits(len: usize) -> usize {
    LENGTH_PREFIX_BITS + len * 8
}

/// Read the declared byte count from the first 32 bits.
///
/// Returns `None` when fewer than 32 bits are present.
pub fn read_length_prefix(bits: &[u8]) -> Option<usize> {
    if bits.len() < LENGTH_PREFIX_BITS {
        return None;
    }
    let bytes = bytes_from_bits(&bits[..LENGTH_PREFIX_BITS]);
    let mut prefix = [0u8; 4];
    prefix.copy_from_slice(&bytes);
    Some(u32::from_be_bytes(prefix) as usize)
}

/// Decode a length-prefixed frame.
///
/// Fails with [`Error::TruncatedPayload`] if the prefix is incomplete or the
/// stream holds fewer bytes than declared. Bits past the payload are ignored.
pub fn unframe_length_prefixed(bits: &[u8]) -> Result<Vec<u8>> {
    let declared = read_length_prefix(bits).ok_or(Error::TruncatedPayload {
        declared: 0,
        available: 0,
    })?;

    let body = &bits[LENGTH_PREFIX_BITS..];
    let available = body.len() / 8;
    if available < declared {
        return Err(Error::TruncatedPayload {
            declared,
            available,
        });
    }

    Ok(bytes_from_bits(&body[..declared * 8]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_is_big_endian() {
        let bits = frame_length_prefixed(&[0xAA; 258]).unwrap();
        // 258 = 0x00000102
        let prefix = bytes_from_bits(&bits[..32]);
        assert_eq!(prefix, vec![0x00, 0x00, 0x01, 0x02]);
        assert_eq!(bits.len(), length_prefixed_bits(258));
    }

    #[test]
    fn test_unframe_roundtrip_with_trailing_bits() {
        let payload = b"ciphertext bytes";
        let mut bits = frame_length_prefixed(payload).unwrap();
        bits.extend_from_slice(&[1, 1, 0, 1, 0, 0, 1, 0, 1]);

        assert_eq!(unframe_length_prefixed(&bits).unwrap(), payload);
    }

    #[test]
    fn test_truncated_payload() {
        let bits = frame_length_prefixed(&[1, 2, 3, 4]).unwrap();
        match unframe_length_prefixed(&bits[..bits.len() - 9]) {
            Err(Error::TruncatedPayload {
                declared,
                available,
            }) => {
                assert_eq!(declared, 4);
                assert_eq!(available, 2);
            }
            other => panic!("expected TruncatedPayload, got {other:?}"),
        }
    }

    #[test]
    fn test_short_prefix() {
        assert_eq!(read_length_prefix(&[1; 31]), None);
        assert!(unframe_length_prefixed(&[0; 12]).is_err());
    }

    #[test]
    fn test_empty_payload() {
        let bits = frame_length_prefixed(&[]).unwrap();
        assert_eq!(bits.len(), 32);
        assert_eq!(unframe_length_prefixed(&bits).unwrap(), Vec::<u8>::new());
    }
}
