//! Raster image codec with three interchangeable strategies.
//!
//! - [`ImageMethod::Lsb`]: plain-bit placement over a key-driven permutation
//!   of every channel byte
//! - [`ImageMethod::Dct`]: one bit per 8×8 block in the sign of a
//!   mid-frequency DCT coefficient
//! - [`ImageMethod::Dwt`]: bits in the signs of Haar detail coefficients
//!
//! Every carrier is converted to 8-bit RGB before anything else, so
//! grayscale, indexed and alpha images are upconverted and their capacity
//! is that of the RGB version. Output is always written as PNG.

mod block;
mod plain;
mod wavelet;

use crate::codec::{commit_output, CarrierKind, Codec};
use crate::config::ImageConfig;
use crate::error::{Error, Result};
use image::{ImageFormat, ImageReader, RgbImage};
use log::{debug, info};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use self::block::BlockStrategy;
use self::plain::PlainStrategy;
use self::wavelet::WaveletStrategy;

/// Embedding strategy for image carriers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageMethod {
    Lsb,
    Dct,
    Dwt,
}

impl ImageMethod {
    pub const ALL: [ImageMethod; 3] = [ImageMethod::Lsb, ImageMethod::Dct, ImageMethod::Dwt];

    pub fn as_str(&self) -> &'static str {
        match self {
            ImageMethod::Lsb => "lsb",
            ImageMethod::Dct => "dct",
            ImageMethod::Dwt => "dwt",
        }
    }
}

impl fmt::Display for ImageMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "lsb" => Ok(ImageMethod::Lsb),
            "dct" => Ok(ImageMethod::Dct),
            "dwt" => Ok(ImageMethod::Dwt),
            other => Err(Error::InvalidMethod(format!(
                "{} (expected lsb, dct or dwt)",
                other
            ))),
        }
    }
}

/// One way of placing sentinel-framed bits into an RGB image.
trait ImageStrategy {
    /// Characters that fit into `image`.
    fn capacity(&self, image: &RgbImage) -> usize;

    /// Embed a message that already passed the capacity check.
    fn embed(&self, image: &mut RgbImage, message: &str, password: Option<&[u8]>) -> Result<()>;

    /// Read a message back.
    fn recover(
        &self,
        image: &RgbImage,
        password: Option<&[u8]>,
        expected_length: Option<usize>,
    ) -> Result<String>;
}

/// Image carrier codec bound to one strategy.
#[derive(Debug, Clone)]
pub struct ImageCodec {
    method: ImageMethod,
    config: ImageConfig,
}

impl ImageCodec {
    pub fn new(method: ImageMethod, config: ImageConfig) -> Self {
        Self { method, config }
    }

    pub fn method(&self) -> ImageMethod {
        self.method
    }

    fn strategy(&self) -> Box<dyn ImageStrategy> {
        match self.method {
            ImageMethod::Lsb => Box::new(PlainStrategy),
            ImageMethod::Dct => Box::new(BlockStrategy::new(&self.config)),
            ImageMethod::Dwt => Box::new(WaveletStrategy::new(&self.config)),
        }
    }

    /// Characters that fit into an in-memory image.
    pub fn image_capacity(&self, image: &RgbImage) -> usize {
        self.strategy().capacity(image)
    }

    /// Hide a message in an in-memory image.
    pub fn embed(&self, image: &mut RgbImage, message: &str, password: Option<&[u8]>) -> Result<()> {
        let strategy = self.strategy();
        let length = message.chars().count();
        let capacity = strategy.capacity(image);
        if length > capacity {
            return Err(Error::MessageTooLong { length, capacity });
        }
        strategy.embed(image, message, password)
    }

    /// Recover a message from an in-memory image.
    pub fn recover(
        &self,
        image: &RgbImage,
        password: Option<&[u8]>,
        expected_length: Option<usize>,
    ) -> Result<String> {
        self.strategy().recover(image, password, expected_length)
    }
}

/// Open an image carrier as 8-bit RGB.
///
/// The format is sniffed from the file contents, not the extension, since
/// outputs are PNG whatever they are named.
pub fn load_rgb(path: &Path) -> Result<RgbImage> {
    let image = ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(|e| Error::carrier_read(path, e))?
        .decode()
        .map_err(|e| Error::carrier_read(path, e))?;
    Ok(image.into_rgb8())
}

/// Save an RGB image losslessly as PNG, whatever the path's extension.
pub fn save_png(image: &RgbImage, path: &Path) -> Result<()> {
    image
        .save_with_format(path, ImageFormat::Png)
        .map_err(|e| Error::output_write(path, e))
}

impl Codec for ImageCodec {
    fn kind(&self) -> CarrierKind {
        CarrierKind::Image
    }

    fn name(&self) -> &'static str {
        match self.method {
            ImageMethod::Lsb => "image-lsb",
            ImageMethod::Dct => "image-dct",
            ImageMethod::Dwt => "image-dwt",
        }
    }

    fn capacity(&self, carrier: &Path) -> Result<usize> {
        let image = load_rgb(carrier)?;
        let capacity = self.image_capacity(&image);
        debug!(
            "{}: {}x{} carrier holds {} characters",
            self.name(),
            image.width(),
            image.height(),
            capacity
        );
        Ok(capacity)
    }

    fn hide(
        &self,
        carrier: &Path,
        message: &str,
        output: &Path,
        key: Option<&[u8]>,
    ) -> Result<PathBuf> {
        let mut image = load_rgb(carrier)?;
        self.embed(&mut image, message, key)?;
        let written = commit_output(output, |staging| save_png(&image, staging))?;
        info!(
            "{}: hid {} characters in {}",
            self.name(),
            message.chars().count(),
            written.display()
        );
        Ok(written)
    }

    fn extract(
        &self,
        carrier: &Path,
        key: Option<&[u8]>,
        expected_length: Option<usize>,
    ) -> Result<String> {
        let image = load_rgb(carrier)?;
        self.recover(&image, key, expected_length)
    }
}

/// Split an RGB image into three `f64` planes.
pub(crate) fn to_planes(image: &RgbImage) -> [Vec<f64>; 3] {
    let mut planes: [Vec<f64>; 3] = Default::default();
    let pixels = (image.width() * image.height()) as usize;
    for plane in planes.iter_mut() {
        plane.reserve(pixels);
    }
    for pixel in image.as_raw().chunks_exact(3) {
        for (plane, &value) in planes.iter_mut().zip(pixel) {
            plane.push(f64::from(value));
        }
    }
    planes
}

/// Write one plane back into a channel, clipping to [0, 255] and rounding.
pub(crate) fn write_plane(image: &mut RgbImage, channel: usize, plane: &[f64]) {
    for (pixel, &value) in image.chunks_exact_mut(3).zip(plane) {
        pixel[channel] = value.clamp(0.0, 255.0).round() as u8;
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use image::{Rgb, RgbImage};

    /// Smooth mid-range gradient with light noise, clear of the clipping bounds.
    pub fn textured(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            let noise = (x * 7 + y * 13 + (x * y) % 11) % 9;
            Rgb([
                (90 + x * 60 / width + noise) as u8,
                (100 + y * 50 / height + noise) as u8,
                (120 + (x + y) % 16 + noise) as u8,
            ])
        })
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::textured;
    use super::*;

    #[test]
    fn test_method_parse() {
        assert_eq!("DCT".parse::<ImageMethod>().unwrap(), ImageMethod::Dct);
        assert!(matches!(
            "fft".parse::<ImageMethod>(),
            Err(Error::InvalidMethod(_))
        ));
    }

    #[test]
    fn test_capacities_100x100() {
        let image = textured(100, 100);
        let config = ImageConfig::default();

        let lsb = ImageCodec::new(ImageMethod::Lsb, config.clone());
        let dct = ImageCodec::new(ImageMethod::Dct, config.clone());
        let dwt = ImageCodec::new(ImageMethod::Dwt, config);

        assert_eq!(lsb.image_capacity(&image), 3748);
        // 12 x 12 blocks x 3 channels = 432 bits
        assert_eq!(dct.image_capacity(&image), 52);
        // 100 * 100 * 3 / 4 = 7500 bits
        assert_eq!(dwt.image_capacity(&image), 935);
    }

    #[test]
    fn test_every_method_roundtrips_in_memory() {
        for method in ImageMethod::ALL {
            let codec = ImageCodec::new(method, ImageConfig::default());
            let mut image = textured(96, 64);
            codec.embed(&mut image, "hello world", Some(b"secret")).unwrap();
            assert_eq!(
                codec.recover(&image, Some(b"secret"), None).unwrap(),
                "hello world",
                "method {method}"
            );
        }
    }

    #[test]
    fn test_output_name_does_not_decide_format() {
        let dir = tempfile::TempDir::new().unwrap();
        let carrier = dir.path().join("cover.png");
        textured(64, 64).save(&carrier).unwrap();

        for method in [ImageMethod::Lsb, ImageMethod::Dct] {
            let codec = ImageCodec::new(method, ImageConfig::default());
            for name in ["stego.jpg", "stego"] {
                let output = dir.path().join(format!("{}_{}", method, name));
                codec.hide(&carrier, "named", &output, Some(b"k")).unwrap();
                assert!(has_png_magic(&output), "{}", output.display());
                assert_eq!(
                    codec.extract(&output, Some(b"k"), None).unwrap(),
                    "named",
                    "{}",
                    output.display()
                );
            }
        }
    }

    fn has_png_magic(path: &Path) -> bool {
        std::fs::read(path)
            .map(|bytes| bytes.starts_with(b"\x89PNG\r\n\x1a\n"))
            .unwrap_or(false)
    }

    #[test]
    fn test_planes_roundtrip() {
        let image = textured(9, 7);
        let planes = to_planes(&image);
        let mut copy = RgbImage::new(9, 7);
        for (channel, plane) in planes.iter().enumerate() {
            write_plane(&mut copy, channel, plane);
        }
        assert_eq!(copy, image);
    }
}
