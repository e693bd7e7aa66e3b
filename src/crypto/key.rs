//! Key material normalization.

use crate::config::cipher_params;

/// Fit caller key material of any length to an AES-256 key.
///
/// Material longer than 32 bytes is truncated; shorter material is
/// right-padded with ASCII `'0'`.
pub fn normalize_key(material: &[u8]) -> [u8; cipher_params::KEY_LENGTH] {
    let mut key = [cipher_params::KEY_PAD_BYTE; cipher_params::KEY_LENGTH];
    let len = material.len().min(cipher_params::KEY_LENGTH);
    key[..len].copy_from_slice(&material[..len]);
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_key_padded() {
        let key = normalize_key(b"abc");
        assert_eq!(&key[..3], b"abc");
        assert!(key[3..].iter().all(|&b| b == b'0'));
    }

    #[test]
    fn test_long_key_truncated() {
        let material: Vec<u8> = (0..40).collect();
        let key = normalize_key(&material);
        assert_eq!(&key[..], &material[..32]);
    }

    #[test]
    fn test_empty_key() {
        assert_eq!(normalize_key(b""), [b'0'; 32]);
    }
}
