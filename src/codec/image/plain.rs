//! Plain-bit strategy: LSB of key-selected channel bytes.

use super::ImageStrategy;
use crate::codec::lsb;
use crate::error::Result;
use image::RgbImage;

/// Every channel byte of the flattened image is one slot.
pub(super) struct PlainStrategy;

impl ImageStrategy for PlainStrategy {
    fn capacity(&self, image: &RgbImage) -> usize {
        lsb::capacity(image.as_raw().len())
    }

    fn embed(&self, image: &mut RgbImage, message: &str, password: Option<&[u8]>) -> Result<()> {
        lsb::hide(image, message, password)
    }

    fn recover(
        &self,
        image: &RgbImage,
        password: Option<&[u8]>,
        expected_length: Option<usize>,
    ) -> Result<String> {
        lsb::extract(image.as_raw(), password, expected_length)
    }
}
