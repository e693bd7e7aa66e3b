//! Configuration constants and types for stegkit.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// End-of-payload marker for sentinel-framed bit streams (`1111111111111110`).
pub const STOP_SEQUENCE: [u8; 16] = [1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 0];

/// Width of the big-endian byte count in length-prefixed frames.
pub const LENGTH_PREFIX_BITS: usize = 32;

/// Side of the square blocks used by the block-transform strategy.
pub const DEFAULT_BLOCK_SIZE: usize = 8;

/// Coefficient (row, col) perturbed inside each transform block.
pub const DEFAULT_EMBED_COEFFICIENT: (usize, usize) = (4, 4);

/// Magnitude added to a coefficient when a bit is written.
pub const DEFAULT_EMBED_STRENGTH: f32 = 10.0;

/// Only every n-th detail coefficient carries a bit in the wavelet strategy.
pub const DEFAULT_WAVELET_STRIDE: usize = 4;

/// Directory under which default output paths are built.
pub const DEFAULT_OUTPUT_ROOT: &str = "samples";

/// Zero-width code points used as binary digits in text carriers.
pub mod zero_width {
    /// ZERO WIDTH SPACE encodes a 0 bit.
    pub const ZERO: char = '\u{200B}';

    /// ZERO WIDTH NON-JOINER encodes a 1 bit.
    pub const ONE: char = '\u{200C}';
}

/// AES-256-CBC parameters.
pub mod cipher_params {
    /// Key length in bytes (256 bits).
    pub const KEY_LENGTH: usize = 32;

    /// IV length in bytes (one AES block).
    pub const IV_LENGTH: usize = 16;

    /// Byte used to right-pad short key material (ASCII `'0'`).
    pub const KEY_PAD_BYTE: u8 = b'0';
}

/// Names of the per-kind output directories.
pub mod output_dirs {
    pub const IMAGE: &str = "stego_images";
    pub const AUDIO: &str = "stego_audio";
    pub const VIDEO: &str = "stego_video";
    pub const TEXT: &str = "stego_txt";

    /// Prefix marking a written file as a stego artifact.
    pub const PREFIX: &str = "stego_";
}

/// Top-level configuration shared by all codecs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StegoConfig {
    /// Block side for the block-transform image strategy.
    pub block_size: usize,

    /// Coefficient position perturbed in each block.
    pub embed_coefficient: (usize, usize),

    /// Embedding strength for coefficient perturbation.
    pub embed_strength: f32,

    /// Step between used coefficients in the wavelet strategy.
    pub wavelet_stride: usize,

    /// Root for default output paths.
    pub output_root: PathBuf,
}

impl Default for StegoConfig {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            embed_coefficient: DEFAULT_EMBED_COEFFICIENT,
            embed_strength: DEFAULT_EMBED_STRENGTH,
            wavelet_stride: DEFAULT_WAVELET_STRIDE,
            output_root: PathBuf::from(DEFAULT_OUTPUT_ROOT),
        }
    }
}

impl StegoConfig {
    /// Create a configuration with custom transform settings.
    pub fn new(block_size: usize, embed_strength: f32, wavelet_stride: usize) -> Self {
        Self {
            block_size,
            embed_strength,
            wavelet_stride,
            ..Self::default()
        }
    }

    /// Load a configuration from a JSON file. Missing fields take defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.block_size < 2 {
            return Err(Error::Config("Block size must be at least 2".to_string()));
        }
        let (row, col) = self.embed_coefficient;
        if row >= self.block_size || col >= self.block_size {
            return Err(Error::Config(format!(
                "Embed coefficient ({}, {}) lies outside a {}x{} block",
                row, col, self.block_size, self.block_size
            )));
        }
        if !(self.embed_strength.is_finite() && self.embed_strength > 0.0) {
            return Err(Error::Config(
                "Embed strength must be a positive number".to_string(),
            ));
        }
        if self.wavelet_stride == 0 {
            return Err(Error::Config(
                "Wavelet stride must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Image codec configuration derived from StegoConfig.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageConfig {
    pub block_size: usize,
    pub embed_coefficient: (usize, usize),
    pub embed_strength: f32,
    pub wavelet_stride: usize,
}

impl From<&StegoConfig> for ImageConfig {
    fn from(config: &StegoConfig) -> Self {
        Self {
            block_size: config.block_size,
            embed_coefficient: config.embed_coefficient,
            embed_strength: config.embed_strength,
            wavelet_stride: config.wavelet_stride,
        }
    }
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self::from(&StegoConfig::default())
    }
}

/// Video codec configuration. Bits go into one channel of every pixel.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoConfig {
    /// Color channel index that carries payload bits.
    pub channel: usize,
}

impl From<&StegoConfig> for VideoConfig {
    fn from(_config: &StegoConfig) -> Self {
        Self::default()
    }
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self { channel: 0 }
    }
}

/// Text codec configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct TextConfig {
    pub zero: char,
    pub one: char,
}

impl From<&StegoConfig> for TextConfig {
    fn from(_config: &StegoConfig) -> Self {
        Self::default()
    }
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            zero: zero_width::ZERO,
            one: zero_width::ONE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = StegoConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.block_size, 8);
        assert_eq!(config.embed_coefficient, (4, 4));
        assert_eq!(config.embed_strength, 10.0);
    }

    #[test]
    fn test_coefficient_outside_block_rejected() {
        let config = StegoConfig::new(4, 10.0, 4);
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_zero_stride_rejected() {
        let config = StegoConfig::new(8, 10.0, 0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_partial_json() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "embed_strength": 12.5 }"#).unwrap();

        let config = StegoConfig::load(&path).unwrap();
        assert_eq!(config.embed_strength, 12.5);
        assert_eq!(config.block_size, DEFAULT_BLOCK_SIZE);
    }

    #[test]
    fn test_stop_sequence_shape() {
        assert_eq!(STOP_SEQUENCE.len(), 16);
        assert_eq!(STOP_SEQUENCE[15], 0);
        assert!(STOP_SEQUENCE[..15].iter().all(|&b| b == 1));
    }
}
