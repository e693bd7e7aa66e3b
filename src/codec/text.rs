//! Zero-width character codec for plain text.
//!
//! The message is encrypted, length-prefixed, and every bit becomes one of
//! two invisible code points. The run is appended after the cover text, which
//! is left byte-for-byte intact.

use crate::codec::video::plaintext_capacity;
use crate::codec::{commit_output, utf8_ignoring_errors, CarrierKind, Codec};
use crate::config::{TextConfig, LENGTH_PREFIX_BITS};
use crate::crypto::{decrypt_with_key, encrypt_with_key};
use crate::encoding::bits::bytes_from_bits;
use crate::encoding::{frame_length_prefixed, read_length_prefix};
use crate::error::{Error, Result};
use log::info;
use std::path::{Path, PathBuf};

/// Text carrier codec.
#[derive(Debug, Clone, Default)]
pub struct TextCodec {
    config: TextConfig,
}

impl TextCodec {
    pub fn new(config: TextConfig) -> Self {
        Self { config }
    }

    /// Append the encrypted message to `cover` as zero-width characters.
    pub fn encode(&self, cover: &str, message: &str, key: &[u8]) -> Result<String> {
        let blob = encrypt_with_key(message.as_bytes(), key);
        let bits = frame_length_prefixed(&blob)?;

        let mut stego = String::with_capacity(cover.len() + bits.len() * 3);
        stego.push_str(cover);
        stego.extend(bits.iter().map(|&bit| self.symbol(bit)));
        Ok(stego)
    }

    /// Recover a message from text carrying zero-width characters.
    ///
    /// Everything except the two marker code points is ignored. Returns an
    /// empty string if fewer than 32 marker bits are present or the declared
    /// length is zero or exceeds what is available.
    pub fn decode(&self, stego: &str, key: &[u8]) -> Result<String> {
        let bits: Vec<u8> = stego.chars().filter_map(|c| self.bit(c)).collect();

        let Some(declared) = read_length_prefix(&bits) else {
            return Ok(String::new());
        };
        let body = &bits[LENGTH_PREFIX_BITS..];
        if declared == 0 || declared * 8 > body.len() {
            return Ok(String::new());
        }

        let blob = bytes_from_bits(&body[..declared * 8]);
        Ok(utf8_ignoring_errors(&decrypt_with_key(&blob, key)?))
    }

    /// The cover text with every marker character removed.
    pub fn strip(&self, stego: &str) -> String {
        stego.chars().filter(|&c| self.bit(c).is_none()).collect()
    }

    fn symbol(&self, bit: u8) -> char {
        if bit == 0 {
            self.config.zero
        } else {
            self.config.one
        }
    }

    fn bit(&self, c: char) -> Option<u8> {
        if c == self.config.zero {
            Some(0)
        } else if c == self.config.one {
            Some(1)
        } else {
            None
        }
    }
}

fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| Error::carrier_read(path, e))
}

impl Codec for TextCodec {
    fn kind(&self) -> CarrierKind {
        CarrierKind::Text
    }

    fn name(&self) -> &'static str {
        "text-zw"
    }

    /// Text grows to fit; the only bound is the 32-bit length prefix.
    fn capacity(&self, carrier: &Path) -> Result<usize> {
        read_text(carrier)?;
        Ok(plaintext_capacity(
            LENGTH_PREFIX_BITS + u32::MAX as usize * 8,
        ))
    }

    fn hide(
        &self,
        carrier: &Path,
        message: &str,
        output: &Path,
        key: Option<&[u8]>,
    ) -> Result<PathBuf> {
        let key = key.ok_or(Error::MissingKey("text-zw"))?;
        let cover = read_text(carrier)?;
        let stego = self.encode(&cover, message, key)?;
        let written = commit_output(output, |staging| {
            std::fs::write(staging, stego.as_bytes()).map_err(|e| Error::output_write(staging, e))
        })?;
        info!(
            "text-zw: appended {} marker characters to {}",
            stego.chars().count() - cover.chars().count(),
            written.display()
        );
        Ok(written)
    }

    fn extract(
        &self,
        carrier: &Path,
        key: Option<&[u8]>,
        _expected_length: Option<usize>,
    ) -> Result<String> {
        let key = key.ok_or(Error::MissingKey("text-zw"))?;
        let stego = read_text(carrier)?;
        self.decode(&stego, key)
    }
}
