//! Wavelet-subband strategy.
//!
//! One Haar level per channel; bits go into the horizontal and then the
//! vertical detail subband, one coefficient out of every `stride` in each
//! subband's row-major order. The approximation and diagonal subbands are
//! never touched.
//!
//! The reported capacity, `(H * W * 3 / 4 - 16) / 8`, is an upper estimate.
//! The real budget is `3 * 2 * ceil(subband_len / stride)` bits; a message
//! that passes the estimate but not the real budget fails with
//! [`Error::CarrierTooSmall`].

use super::{to_planes, write_plane, ImageStrategy};
use crate::config::{ImageConfig, STOP_SEQUENCE};
use crate::encoding::{frame_with_sentinel, from_bits, sentinel_capacity};
use crate::error::{Error, Result};
use crate::transform::{embed_in_sign, haar, read_sign};
use image::RgbImage;
use log::{debug, warn};

pub(super) struct WaveletStrategy {
    stride: usize,
    strength: f64,
}

impl WaveletStrategy {
    pub(super) fn new(config: &ImageConfig) -> Self {
        Self {
            stride: config.wavelet_stride,
            strength: f64::from(config.embed_strength),
        }
    }

    /// Bits that really fit: two detail subbands per channel.
    fn slot_count(&self, image: &RgbImage) -> usize {
        let (sw, sh) = haar::subband_dims(image.width() as usize, image.height() as usize);
        3 * 2 * (sw * sh).div_ceil(self.stride)
    }
}

impl ImageStrategy for WaveletStrategy {
    fn capacity(&self, image: &RgbImage) -> usize {
        let pixels = image.width() as usize * image.height() as usize;
        sentinel_capacity(pixels * 3 / 4)
    }

    fn embed(&self, image: &mut RgbImage, message: &str, _password: Option<&[u8]>) -> Result<()> {
        let bits = frame_with_sentinel(message)?;
        let available = self.slot_count(image);
        if bits.len() > available {
            return Err(Error::CarrierTooSmall {
                needed: bits.len(),
                available,
            });
        }

        let (width, height) = (image.width() as usize, image.height() as usize);
        let planes = to_planes(image);
        let mut next = bits.iter().peekable();

        for (channel, mut plane) in planes.into_iter().enumerate() {
            if next.peek().is_none() {
                break;
            }
            let mut bands = haar::forward(&plane, width, height);
            for detail in [&mut bands.horizontal, &mut bands.vertical] {
                for coefficient in detail.iter_mut().step_by(self.stride) {
                    let Some(&bit) = next.next() else {
                        break;
                    };
                    *coefficient = embed_in_sign(*coefficient, bit, self.strength);
                }
            }
            haar::inverse(&bands, &mut plane, width);
            write_plane(image, channel, &plane);
        }

        debug!(
            "dwt: wrote {} of {} available detail slots",
            bits.len(),
            available
        );
        Ok(())
    }

    fn recover(
        &self,
        image: &RgbImage,
        _password: Option<&[u8]>,
        _expected_length: Option<usize>,
    ) -> Result<String> {
        let (width, height) = (image.width() as usize, image.height() as usize);
        let mut bits = Vec::new();

        for plane in to_planes(image) {
            let bands = haar::forward(&plane, width, height);
            for detail in [&bands.horizontal, &bands.vertical] {
                for &coefficient in detail.iter().step_by(self.stride) {
                    bits.push(read_sign(coefficient));
                    if bits.ends_with(&STOP_SEQUENCE) {
                        bits.truncate(bits.len() - STOP_SEQUENCE.len());
                        return Ok(from_bits(&bits));
                    }
                }
            }
        }

        warn!("dwt: no stop marker in {} coefficients, returning raw decode", bits.len());
        Ok(from_bits(&bits))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::image::test_support::textured;

    #[test]
    fn test_roundtrip_odd_dimensions() {
        let strategy = WaveletStrategy::new(&ImageConfig::default());
        let mut image = textured(67, 45);
        strategy.embed(&mut image, "odd sized carrier", None).unwrap();
        assert_eq!(
            strategy.recover(&image, None, None).unwrap(),
            "odd sized carrier"
        );
    }

    #[test]
    fn test_slot_count() {
        let strategy = WaveletStrategy::new(&ImageConfig::default());
        // 50 x 50 subbands, 2500 / 4 = 625 per subband
        assert_eq!(strategy.slot_count(&textured(100, 100)), 3750);
        // 5 x 3 subbands -> ceil(15 / 4) = 4
        assert_eq!(strategy.slot_count(&textured(11, 7)), 24);
    }

    #[test]
    fn test_estimate_exceeds_real_budget() {
        let strategy = WaveletStrategy::new(&ImageConfig::default());
        let mut image = textured(40, 40);
        let capacity = strategy.capacity(&image);
        let message = "m".repeat(capacity);
        assert!(matches!(
            strategy.embed(&mut image, &message, None),
            Err(Error::CarrierTooSmall { .. })
        ));
    }
}
