//! Method dispatch and the high-level hide/extract entry points.
//!
//! [`Stego`] owns a validated [`StegoConfig`] and nothing else; every call
//! builds the codec it needs, so one instance can be shared freely by a
//! long-lived caller.

use crate::codec::{
    AudioCodec, CarrierKind, Codec, ImageCodec, ImageMethod, TextCodec, VideoCodec,
};
use crate::config::{output_dirs, StegoConfig};
use crate::crypto::{seal, sealed_length, unseal, Cipher};
use crate::error::{Error, Result};
use log::{debug, info};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Every embedding method, tagged by carrier kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    ImageLsb,
    ImageDct,
    ImageDwt,
    AudioLsb,
    VideoLsb,
    TextZeroWidth,
}

impl Method {
    pub const ALL: [Method; 6] = [
        Method::ImageLsb,
        Method::ImageDct,
        Method::ImageDwt,
        Method::AudioLsb,
        Method::VideoLsb,
        Method::TextZeroWidth,
    ];

    /// Tag used on the command line.
    pub fn tag(&self) -> &'static str {
        match self {
            Method::ImageLsb => "image-lsb",
            Method::ImageDct => "image-dct",
            Method::ImageDwt => "image-dwt",
            Method::AudioLsb => "audio-lsb",
            Method::VideoLsb => "video-lsb",
            Method::TextZeroWidth => "text-zw",
        }
    }

    pub fn kind(&self) -> CarrierKind {
        match self {
            Method::ImageLsb | Method::ImageDct | Method::ImageDwt => CarrierKind::Image,
            Method::AudioLsb => CarrierKind::Audio,
            Method::VideoLsb => CarrierKind::Video,
            Method::TextZeroWidth => CarrierKind::Text,
        }
    }

    /// Video and text always encrypt, so they cannot run without key material.
    pub fn requires_key(&self) -> bool {
        matches!(self, Method::VideoLsb | Method::TextZeroWidth)
    }

    /// Image and audio payloads are sentinel-framed characters and get
    /// sealed (encrypted then base64 armored) when a key is supplied.
    pub fn seals_payload(&self) -> bool {
        matches!(self.kind(), CarrierKind::Image | CarrierKind::Audio)
    }

    /// Build the codec for this method.
    pub fn codec(&self, config: &StegoConfig) -> Box<dyn Codec> {
        match self {
            Method::ImageLsb => Box::new(ImageCodec::new(ImageMethod::Lsb, config.into())),
            Method::ImageDct => Box::new(ImageCodec::new(ImageMethod::Dct, config.into())),
            Method::ImageDwt => Box::new(ImageCodec::new(ImageMethod::Dwt, config.into())),
            Method::AudioLsb => Box::new(AudioCodec::new()),
            Method::VideoLsb => Box::new(VideoCodec::new(config.into())),
            Method::TextZeroWidth => Box::new(TextCodec::new(config.into())),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.tag())
    }
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        Method::ALL
            .into_iter()
            .find(|method| method.tag() == wanted)
            .ok_or_else(|| {
                let known: Vec<&str> = Method::ALL.iter().map(Method::tag).collect();
                Error::InvalidMethod(format!("{} (expected one of: {})", s, known.join(", ")))
            })
    }
}

/// Largest plaintext, in bytes, whose sealed form fits in `armored_chars`.
pub fn sealed_capacity(armored_chars: usize) -> usize {
    if armored_chars < sealed_length(0) {
        return 0;
    }
    Cipher::max_plaintext_len(armored_chars / 4 * 3)
}

/// Steganography facade.
#[derive(Debug, Clone, Default)]
pub struct Stego {
    config: StegoConfig,
}

impl Stego {
    /// Create a facade after validating `config`.
    pub fn new(config: StegoConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &StegoConfig {
        &self.config
    }

    /// Raw carrier capacity for `method`.
    ///
    /// For image and audio this counts sentinel-framed characters, which is
    /// what an unkeyed hide can use; see [`Stego::message_capacity`] for the
    /// keyed figure.
    pub fn capacity(&self, carrier: &Path, method: Method) -> Result<usize> {
        method.codec(&self.config).capacity(carrier)
    }

    /// Largest message, in bytes, that `hide` accepts with or without a key.
    pub fn message_capacity(&self, carrier: &Path, method: Method, keyed: bool) -> Result<usize> {
        let raw = self.capacity(carrier, method)?;
        if keyed && method.seals_payload() {
            Ok(sealed_capacity(raw))
        } else {
            Ok(raw)
        }
    }

    /// Hide `message` in `carrier`, writing to `output` or the default path.
    pub fn hide(
        &self,
        carrier: &Path,
        message: &str,
        output: Option<&Path>,
        method: Method,
        key: Option<&[u8]>,
    ) -> Result<PathBuf> {
        if method.requires_key() && key.is_none() {
            return Err(Error::MissingKey(method.tag()));
        }
        let output = match output {
            Some(path) => path.to_path_buf(),
            None => self.default_output_path(method.kind(), carrier),
        };
        let codec = method.codec(&self.config);

        let written = match key.filter(|_| method.seals_payload()) {
            Some(key) => {
                let capacity = codec.capacity(carrier)?;
                let armored_len = sealed_length(message.len());
                debug!(
                    "{}: sealed payload is {} characters, carrier holds {}",
                    method, armored_len, capacity
                );
                if armored_len > capacity {
                    return Err(Error::MessageTooLong {
                        length: message.len(),
                        capacity: sealed_capacity(capacity),
                    });
                }
                let armored = seal(message, key);
                codec.hide(carrier, &armored, &output, Some(key))?
            }
            None => codec.hide(carrier, message, &output, key)?,
        };

        info!("{}: wrote {}", method, written.display());
        Ok(written)
    }

    /// Recover a message hidden with `method`.
    ///
    /// `expected_length` only matters for unkeyed image and audio carriers,
    /// where it seeds the slot permutation and bounds the read.
    pub fn extract(
        &self,
        carrier: &Path,
        method: Method,
        key: Option<&[u8]>,
        expected_length: Option<usize>,
    ) -> Result<String> {
        if method.requires_key() && key.is_none() {
            return Err(Error::MissingKey(method.tag()));
        }
        let codec = method.codec(&self.config);

        match key.filter(|_| method.seals_payload()) {
            Some(key) => {
                let armored = codec.extract(carrier, Some(key), None)?;
                if armored.is_empty() {
                    return Ok(String::new());
                }
                unseal(&armored, key)
            }
            None => codec.extract(carrier, key, expected_length),
        }
    }

    /// Conventional output location for a carrier of `kind`.
    ///
    /// Images always become PNG; other kinds keep the carrier's file name.
    pub fn default_output_path(&self, kind: CarrierKind, carrier: &Path) -> PathBuf {
        let stem = carrier
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "carrier".to_string());
        let name = carrier
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "carrier".to_string());

        let (dir, file) = match kind {
            CarrierKind::Image => (output_dirs::IMAGE, format!("{}.png", stem)),
            CarrierKind::Audio => (output_dirs::AUDIO, format!("{}.wav", stem)),
            CarrierKind::Video => (output_dirs::VIDEO, name),
            CarrierKind::Text => (output_dirs::TEXT, name),
        };
        self.config
            .output_root
            .join(dir)
            .join(format!("{}{}", output_dirs::PREFIX, file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_tags_roundtrip() {
        for method in Method::ALL {
            assert_eq!(method.tag().parse::<Method>().unwrap(), method);
        }
        assert_eq!(" Image-DCT ".parse::<Method>().unwrap(), Method::ImageDct);
    }

    #[test]
    fn test_unknown_method() {
        assert!(matches!(
            "image-fft".parse::<Method>(),
            Err(Error::InvalidMethod(_))
        ));
    }

    #[test]
    fn test_codec_names_match_tags() {
        let config = StegoConfig::default();
        for method in Method::ALL {
            let codec = method.codec(&config);
            assert_eq!(codec.name(), method.tag());
            assert_eq!(codec.kind(), method.kind());
        }
    }

    #[test]
    fn test_sealed_capacity_inverts_sealed_length() {
        assert_eq!(sealed_capacity(43), 0);
        assert_eq!(sealed_capacity(44), 15);
        assert_eq!(sealed_capacity(63), 15);
        assert_eq!(sealed_capacity(64), 31);
        for chars in [44, 100, 3748, 2498] {
            let plain = sealed_capacity(chars);
            assert!(sealed_length(plain) <= chars);
            assert!(sealed_length(plain + 1) > chars);
        }
    }

    #[test]
    fn test_default_output_paths() {
        let stego = Stego::default();
        assert_eq!(
            stego.default_output_path(CarrierKind::Image, Path::new("in/photo.jpg")),
            PathBuf::from("samples/stego_images/stego_photo.png")
        );
        assert_eq!(
            stego.default_output_path(CarrierKind::Audio, Path::new("tone.wav")),
            PathBuf::from("samples/stego_audio/stego_tone.wav")
        );
        assert_eq!(
            stego.default_output_path(CarrierKind::Video, Path::new("clips/walk")),
            PathBuf::from("samples/stego_video/stego_walk")
        );
        assert_eq!(
            stego.default_output_path(CarrierKind::Text, Path::new("note.txt")),
            PathBuf::from("samples/stego_txt/stego_note.txt")
        );
    }

    #[test]
    fn test_keyless_text_rejected() {
        let stego = Stego::default();
        assert!(matches!(
            stego.hide(Path::new("note.txt"), "x", None, Method::TextZeroWidth, None),
            Err(Error::MissingKey("text-zw"))
        ));
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(Stego::new(StegoConfig::new(8, 10.0, 0)).is_err());
    }
}
