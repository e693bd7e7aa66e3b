//! AES-256-CBC encryption with PKCS#7 padding.
//!
//! There is no authentication tag: a corrupted blob that still unpads
//! cleanly decrypts to garbage instead of failing.

use crate::config::cipher_params::{IV_LENGTH, KEY_LENGTH};
use crate::crypto::key::normalize_key;
use crate::error::{Error, Result};
use aes::Aes256;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand::RngCore;

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// AES block size in bytes.
const BLOCK_SIZE: usize = 16;

/// AES-256-CBC cipher wrapper.
pub struct Cipher {
    key: [u8; KEY_LENGTH],
}

impl Cipher {
    /// Create a cipher from key material of any length.
    pub fn new(material: &[u8]) -> Self {
        Self {
            key: normalize_key(material),
        }
    }

    /// Encrypt data with a fresh random IV.
    ///
    /// Returns: iv (16 bytes) || ciphertext
    pub fn encrypt(&self, plaintext: &[u8]) -> Vec<u8> {
        let mut iv = [0u8; IV_LENGTH];
        rand::thread_rng().fill_bytes(&mut iv);
        self.encrypt_with_iv(plaintext, &iv)
    }

    /// Encrypt data with a caller-chosen IV.
    pub fn encrypt_with_iv(&self, plaintext: &[u8], iv: &[u8; IV_LENGTH]) -> Vec<u8> {
        let ciphertext = Aes256CbcEnc::new(&self.key.into(), &(*iv).into())
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext);

        let mut result = Vec::with_capacity(IV_LENGTH + ciphertext.len());
        result.extend_from_slice(iv);
        result.extend_from_slice(&ciphertext);
        result
    }

    /// Size of the blob `encrypt` produces for `plain_len` bytes.
    pub fn blob_len(plain_len: usize) -> usize {
        IV_LENGTH + (plain_len / BLOCK_SIZE + 1) * BLOCK_SIZE
    }

    /// Largest plaintext whose blob fits in `blob_len` bytes.
    pub fn max_plaintext_len(blob_len: usize) -> usize {
        let blocks = blob_len.saturating_sub(IV_LENGTH) / BLOCK_SIZE;
        (blocks * BLOCK_SIZE).saturating_sub(1)
    }

    /// Decrypt data that was encrypted with `encrypt`.
    ///
    /// Expects: iv (16 bytes) || ciphertext
    pub fn decrypt(&self, blob: &[u8]) -> Result<Vec<u8>> {
        if blob.len() < IV_LENGTH + BLOCK_SIZE || (blob.len() - IV_LENGTH) % BLOCK_SIZE != 0 {
            return Err(Error::DecryptionFailed);
        }

        let (iv, ciphertext) = blob.split_at(IV_LENGTH);
        let mut iv_block = [0u8; IV_LENGTH];
        iv_block.copy_from_slice(iv);

        Aes256CbcDec::new(&self.key.into(), &iv_block.into())
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
            .map_err(|_| Error::DecryptionFailed)
    }
}

/// Encrypt with caller key material.
pub fn encrypt_with_key(plaintext: &[u8], key: &[u8]) -> Vec<u8> {
    Cipher::new(key).encrypt(plaintext)
}

/// Decrypt with caller key material.
pub fn decrypt_with_key(blob: &[u8], key: &[u8]) -> Result<Vec<u8>> {
    Cipher::new(key).decrypt(blob)
}

/// Encrypt a message and armor the blob as base64 text.
///
/// The result is plain ASCII, so it passes the single-byte bit framer
/// whatever the message contains.
pub fn seal(message: &str, key: &[u8]) -> String {
    STANDARD.encode(encrypt_with_key(message.as_bytes(), key))
}

/// Reverse `seal`. Any base64, padding or UTF-8 failure is a decryption failure.
pub fn unseal(armored: &str, key: &[u8]) -> Result<String> {
    let blob = STANDARD
        .decode(armored.trim())
        .map_err(|_| Error::DecryptionFailed)?;
    let plaintext = decrypt_with_key(&blob, key)?;
    String::from_utf8(plaintext).map_err(|_| Error::DecryptionFailed)
}

/// Length in characters of `seal` output for a plaintext of `plain_len` bytes.
pub fn sealed_length(plain_len: usize) -> usize {
    Cipher::blob_len(plain_len).div_ceil(3) * 4
}
