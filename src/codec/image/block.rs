//! Block-transform strategy.
//!
//! Each channel plane is cut into non-overlapping square blocks, visited in
//! raster order, channel by channel (R, G, B). One bit goes into the sign of
//! a fixed mid-frequency coefficient of each block. Partial blocks at the
//! right and bottom edges are not used.

use super::{to_planes, write_plane, ImageStrategy};
use crate::config::{ImageConfig, STOP_SEQUENCE};
use crate::encoding::{frame_with_sentinel, from_bits, sentinel_capacity};
use crate::error::{Error, Result};
use crate::transform::{embed_in_sign, read_sign, BlockDct};
use image::RgbImage;
use log::{debug, warn};

pub(super) struct BlockStrategy {
    dct: BlockDct,
    coefficient: usize,
    strength: f64,
}

impl BlockStrategy {
    pub(super) fn new(config: &ImageConfig) -> Self {
        let (row, col) = config.embed_coefficient;
        Self {
            dct: BlockDct::new(config.block_size),
            coefficient: row * config.block_size + col,
            strength: f64::from(config.embed_strength),
        }
    }

    fn blocks(&self, image: &RgbImage) -> (usize, usize) {
        let n = self.dct.size();
        (image.width() as usize / n, image.height() as usize / n)
    }

    fn read_block(&self, plane: &[f64], width: usize, bx: usize, by: usize) -> Vec<f64> {
        let n = self.dct.size();
        let mut block = Vec::with_capacity(n * n);
        for y in 0..n {
            let start = (by * n + y) * width + bx * n;
            block.extend_from_slice(&plane[start..start + n]);
        }
        block
    }

    fn write_block(&self, plane: &mut [f64], width: usize, bx: usize, by: usize, block: &[f64]) {
        let n = self.dct.size();
        for y in 0..n {
            let start = (by * n + y) * width + bx * n;
            plane[start..start + n].copy_from_slice(&block[y * n..(y + 1) * n]);
        }
    }
}

impl ImageStrategy for BlockStrategy {
    fn capacity(&self, image: &RgbImage) -> usize {
        let (bw, bh) = self.blocks(image);
        sentinel_capacity(bw * bh * 3)
    }

    fn embed(&self, image: &mut RgbImage, message: &str, _password: Option<&[u8]>) -> Result<()> {
        let bits = frame_with_sentinel(message)?;
        let (bw, bh) = self.blocks(image);
        if bits.len() > bw * bh * 3 {
            return Err(Error::CarrierTooSmall {
                needed: bits.len(),
                available: bw * bh * 3,
            });
        }

        let width = image.width() as usize;
        let mut planes = to_planes(image);
        let mut next = bits.iter();

        'channels: for (channel, plane) in planes.iter_mut().enumerate() {
            for by in 0..bh {
                for bx in 0..bw {
                    let Some(&bit) = next.next() else {
                        write_plane(image, channel, plane);
                        break 'channels;
                    };
                    let mut coeffs = self.dct.forward(&self.read_block(plane, width, bx, by));
                    coeffs[self.coefficient] =
                        embed_in_sign(coeffs[self.coefficient], bit, self.strength);
                    let block = self.dct.inverse(&coeffs);
                    self.write_block(plane, width, bx, by, &block);
                }
            }
            write_plane(image, channel, plane);
        }

        debug!("dct: wrote {} bits into {}x{} blocks", bits.len(), bw, bh);
        Ok(())
    }

    fn recover(
        &self,
        image: &RgbImage,
        _password: Option<&[u8]>,
        _expected_length: Option<usize>,
    ) -> Result<String> {
        let (bw, bh) = self.blocks(image);
        let width = image.width() as usize;
        let planes = to_planes(image);
        let mut bits = Vec::new();

        for plane in &planes {
            for by in 0..bh {
                for bx in 0..bw {
                    let coeffs = self.dct.forward(&self.read_block(plane, width, bx, by));
                    bits.push(read_sign(coeffs[self.coefficient]));
                    if bits.ends_with(&STOP_SEQUENCE) {
                        bits.truncate(bits.len() - STOP_SEQUENCE.len());
                        return Ok(from_bits(&bits));
                    }
                }
            }
        }

        warn!("dct: no stop marker in {} blocks, returning raw decode", bits.len());
        Ok(from_bits(&bits))
    }
}
