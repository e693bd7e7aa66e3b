//! Key-driven slot permutation.
//!
//! Random-placement embedders scatter payload bits over a pseudo-random
//! permutation of the carrier's slots. The permutation comes from a
//! ChaCha20 stream seeded with a 32-bit placement key, shuffled with a
//! forward Fisher-Yates pass, so any prefix of the permutation can be
//! produced without shuffling the rest.
//!
//! Ranges are drawn as `u32` so the same seed yields the same order on
//! 32-bit and 64-bit targets.

use crate::error::{Error, Result};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use sha2::{Digest, Sha256};

/// Seed that selects one permutation of the carrier slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlacementKey(u32);

impl PlacementKey {
    /// Use a raw seed value.
    pub fn from_seed(seed: u32) -> Self {
        Self(seed)
    }

    /// SHA-256 of the password read as a big-endian integer, reduced mod 2^32.
    pub fn from_password(password: &[u8]) -> Self {
        let digest = Sha256::digest(password);
        let mut low = [0u8; 4];
        low.copy_from_slice(&digest[digest.len() - 4..]);
        Self(u32::from_be_bytes(low))
    }

    /// Key used when hiding: the password, else the message length.
    pub fn for_hide(password: Option<&[u8]>, message_chars: usize) -> Self {
        match password {
            Some(password) => Self::from_password(password),
            None => Self(message_chars as u32),
        }
    }

    /// Key used when extracting: the password, else the expected message
    /// length, else the total slot count.
    ///
    /// Without a password the extractor must know the length the message
    /// had when it was hidden, or it lands on a different permutation.
    pub fn for_extract(
        password: Option<&[u8]>,
        expected_length: Option<usize>,
        total_slots: usize,
    ) -> Self {
        match (password, expected_length) {
            (Some(password), _) => Self::from_password(password),
            (None, Some(length)) => Self(length as u32),
            (None, None) => Self(total_slots as u32),
        }
    }

    pub fn seed(&self) -> u32 {
        self.0
    }
}

/// Full permutation of `0..total_slots` for `key`.
pub fn permutation(total_slots: usize, key: PlacementKey) -> Result<Vec<usize>> {
    select(total_slots, key, total_slots)
}

/// First `count` indices of `permutation(total_slots, key)`.
pub fn select(total_slots: usize, key: PlacementKey, count: usize) -> Result<Vec<usize>> {
    if count > total_slots {
        return Err(Error::CarrierTooSmall {
            needed: count,
            available: total_slots,
        });
    }
    if u32::try_from(total_slots).is_err() {
        return Err(Error::UnsupportedFormat(format!(
            "{} slots exceed the placement range",
            total_slots
        )));
    }

    let mut slots: Vec<usize> = (0..total_slots).collect();
    let mut rng = ChaCha20Rng::seed_from_u64(u64::from(key.seed()));
    let steps = count.min(total_slots.saturating_sub(1));
    for i in 0..steps {
        let j = rng.gen_range(i as u32..total_slots as u32) as usize;
        slots.swap(i, j);
    }
    slots.truncate(count);
    Ok(slots)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic() {
        let key = PlacementKey::from_seed(42);
        let a = permutation(1000, key).unwrap();
        let b = permutation(1000, key).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_is_permutation() {
        let mut slots = permutation(30_000, PlacementKey::from_password(b"secret")).unwrap();
        assert_eq!(slots.len(), 30_000);
        slots.sort_unstable();
        assert!(slots.iter().enumerate().all(|(i, &s)| i == s));
    }

    #[test]
    fn test_select_is_prefix() {
        let key = PlacementKey::from_seed(7);
        let full = permutation(500, key).unwrap();
        let head = select(500, key, 120).unwrap();
        assert_eq!(head, &full[..120]);
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = permutation(256, PlacementKey::from_seed(1)).unwrap();
        let b = permutation(256, PlacementKey::from_seed(2)).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_select_too_many() {
        assert!(matches!(
            select(10, PlacementKey::from_seed(0), 11),
            Err(Error::CarrierTooSmall {
                needed: 11,
                available: 10
            })
        ));
    }

    #[test]
    fn test_password_seed_is_low_digest_word() {
        let digest = Sha256::digest(b"secret");
        let expected = u32::from_be_bytes([digest[28], digest[29], digest[30], digest[31]]);
        assert_eq!(PlacementKey::from_password(b"secret").seed(), expected);
        assert_ne!(
            PlacementKey::from_password(b"secret"),
            PlacementKey::from_password(b"wrong")
        );
    }

    #[test]
    fn test_fallback_seeds() {
        assert_eq!(PlacementKey::for_hide(None, 11).seed(), 11);
        assert_eq!(PlacementKey::for_extract(None, Some(11), 30_000).seed(), 11);
        assert_eq!(PlacementKey::for_extract(None, None, 30_000).seed(), 30_000);
        assert_eq!(
            PlacementKey::for_extract(Some(b"pw"), Some(11), 30_000),
            PlacementKey::from_password(b"pw")
        );
    }

    #[test]
    fn test_empty_and_single() {
        assert!(permutation(0, PlacementKey::from_seed(3)).unwrap().is_empty());
        assert_eq!(permutation(1, PlacementKey::from_seed(3)).unwrap(), vec![0]);
    }
}
