//! Frame-sequence video codec.
//!
//! The message is encrypted, length-prefixed and written one bit per pixel
//! into the LSB of a single channel, walking frames in order and each frame
//! row by row. Placement is sequential so the extractor can re-walk the
//! same order: one pass for the 32-bit length, a second pass from the first
//! frame for the ciphertext.

pub mod frames;

use crate::codec::{commit_output, utf8_ignoring_errors, CarrierKind, Codec};
use crate::config::{VideoConfig, LENGTH_PREFIX_BITS};
use crate::crypto::{decrypt_with_key, encrypt_with_key, Cipher};
use crate::encoding::bits::bytes_from_bits;
use crate::encoding::{frame_length_prefixed, read_length_prefix};
use crate::error::{Error, Result};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};

pub use self::frames::{
    write_sequence, FrameSink, FrameSource, PngSequenceReader, PngSequenceWriter,
    SequenceManifest,
};

/// Largest plaintext, in bytes, whose encrypted frame fits in `budget_bits`.
pub(crate) fn plaintext_capacity(budget_bits: usize) -> usize {
    let blob_bytes = budget_bits.saturating_sub(LENGTH_PREFIX_BITS) / 8;
    Cipher::max_plaintext_len(blob_bytes)
}

/// Video carrier codec.
#[derive(Debug, Clone, Default)]
pub struct VideoCodec {
    config: VideoConfig,
}

impl VideoCodec {
    pub fn new(config: VideoConfig) -> Self {
        Self { config }
    }

    /// Stream `source` into `sink`, writing `bits` into the carrier channel.
    ///
    /// Fails with [`Error::MessageTooLong`] before any frame is written if
    /// the bits exceed one per pixel across all frames.
    pub fn embed_frames(
        &self,
        source: &mut dyn FrameSource,
        sink: &mut dyn FrameSink,
        bits: &[u8],
    ) -> Result<()> {
        let (width, height) = source.dimensions();
        let budget = width as usize * height as usize * source.frame_count();
        if bits.len() > budget {
            return Err(Error::MessageTooLong {
                length: bits.len() / 8,
                capacity: budget / 8,
            });
        }

        let channel = self.config.channel;
        let mut next = bits.iter();
        source.rewind()?;
        while let Some(mut frame) = source.next_frame()? {
            for pixel in frame.chunks_exact_mut(3) {
                let Some(&bit) = next.next() else {
                    break;
                };
                pixel[channel] = (pixel[channel] & 0xFE) | bit;
            }
            sink.write_frame(&frame)?;
        }
        sink.finish()
    }

    /// Read `count` carrier bits after skipping the first `skip`, starting
    /// from the first frame. Stops early if the frames run out.
    pub fn read_bits(
        &self,
        source: &mut dyn FrameSource,
        skip: usize,
        count: usize,
    ) -> Result<Vec<u8>> {
        let channel = self.config.channel;
        let mut bits = Vec::with_capacity(count);
        let mut position = 0usize;

        source.rewind()?;
        while bits.len() < count {
            let Some(frame) = source.next_frame()? else {
                break;
            };
            let pixels = frame.as_raw().len() / 3;
            if position + pixels <= skip {
                position += pixels;
                continue;
            }
            let start = skip.saturating_sub(position);
            for pixel in frame.as_raw().chunks_exact(3).skip(start) {
                if bits.len() == count {
                    break;
                }
                bits.push(pixel[channel] & 1);
            }
            position += pixels;
        }
        Ok(bits)
    }

    /// Two-pass extraction of the encrypted payload.
    ///
    /// Returns `Ok(None)` when the declared length is zero or larger than the
    /// carrier can hold.
    pub fn read_payload(&self, source: &mut dyn FrameSource) -> Result<Option<Vec<u8>>> {
        let (width, height) = source.dimensions();
        let budget = width as usize * height as usize * source.frame_count();

        let prefix = self.read_bits(source, 0, LENGTH_PREFIX_BITS)?;
        let Some(declared) = read_length_prefix(&prefix) else {
            return Ok(None);
        };
        if declared == 0 || declared > budget.saturating_sub(LENGTH_PREFIX_BITS) / 8 {
            warn!("video: declared length {} outside carrier budget", declared);
            return Ok(None);
        }

        let body = self.read_bits(source, LENGTH_PREFIX_BITS, declared * 8)?;
        if body.len() < declared * 8 {
            return Err(Error::TruncatedPayload {
                declared,
                available: body.len() / 8,
            });
        }
        Ok(Some(bytes_from_bits(&body)))
    }
}

impl Codec for VideoCodec {
    fn kind(&self) -> CarrierKind {
        CarrierKind::Video
    }

    fn name(&self) -> &'static str {
        "video-lsb"
    }

    fn capacity(&self, carrier: &Path) -> Result<usize> {
        let reader = PngSequenceReader::open(carrier)?;
        let budget = reader.manifest().bit_budget();
        debug!("video-lsb: {} bit budget", budget);
        Ok(plaintext_capacity(budget))
    }

    fn hide(
        &self,
        carrier: &Path,
        message: &str,
        output: &Path,
        key: Option<&[u8]>,
    ) -> Result<PathBuf> {
        let key = key.ok_or(Error::MissingKey("video-lsb"))?;
        let mut reader = PngSequenceReader::open(carrier)?;

        let budget = reader.manifest().bit_budget();
        let blob = encrypt_with_key(message.as_bytes(), key);
        let bits = frame_length_prefixed(&blob)?;
        if bits.len() > budget {
            return Err(Error::MessageTooLong {
                length: message.len(),
                capacity: plaintext_capacity(budget),
            });
        }

        let (width, height) = reader.dimensions();
        let fps = reader.fps();
        let written = commit_output(output, |staging| {
            let mut writer = PngSequenceWriter::create(staging, width, height, fps)?;
            self.embed_frames(&mut reader, &mut writer, &bits)
        })?;
        info!(
            "video-lsb: hid {} ciphertext bytes in {}",
            blob.len(),
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
        let key = key.ok_or(Error::MissingKey("video-lsb"))?;
        let mut reader = PngSequenceReader::open(carrier)?;
        match self.read_payload(&mut reader)? {
            Some(blob) => Ok(utf8_ignoring_errors(&decrypt_with_key(&blob, key)?)),
            None => Ok(String::new()),
        }
    }
}
