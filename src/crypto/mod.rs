//! Cryptographic operations for stegkit.
//!
//! This module provides:
//! - AES-256-CBC encryption with PKCS#7 padding (IV prepended to the blob)
//! - Base64 sealing used for image and audio payloads
//! - Key material normalization to 32 bytes

mod cipher;
mod key;

pub use cipher::{
    decrypt_with_key, encrypt_with_key, seal, sealed_length, unseal, Cipher,
};
pub use key::normalize_key;
