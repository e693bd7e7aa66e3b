//! 16-bit mono PCM WAV codec.
//!
//! Plain-bit placement over the sample array: one payload bit in the lowest
//! bit of each key-selected sample. Any other sample width, sample format or
//! channel count is rejected before anything is written.

use crate::codec::{commit_output, lsb, CarrierKind, Codec};
use crate::error::{Error, Result};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use log::{debug, info};
use std::path::{Path, PathBuf};

/// A decoded mono 16-bit PCM stream.
#[derive(Debug, Clone, PartialEq)]
pub struct PcmAudio {
    pub spec: WavSpec,
    pub samples: Vec<i16>,
}

impl PcmAudio {
    /// Read a WAV file, rejecting anything but 16-bit integer mono.
    pub fn read(path: &Path) -> Result<Self> {
        let mut reader = WavReader::open(path).map_err(|e| Error::carrier_read(path, e))?;
        let spec = reader.spec();
        check_spec(&spec)?;

        let samples = reader
            .samples::<i16>()
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| Error::carrier_read(path, e))?;
        Ok(Self { spec, samples })
    }

    /// Write the stream with its original header parameters.
    pub fn write(&self, path: &Path) -> Result<()> {
        let mut writer = WavWriter::create(path, self.spec).map_err(|e| Error::output_write(path, e))?;
        for &sample in &self.samples {
            writer
                .write_sample(sample)
                .map_err(|e| Error::output_write(path, e))?;
        }
        writer.finalize().map_err(|e| Error::output_write(path, e))
    }
}

fn check_spec(spec: &WavSpec) -> Result<()> {
    if spec.channels != 1 || spec.bits_per_sample != 16 || spec.sample_format != SampleFormat::Int {
        return Err(Error::UnsupportedFormat(format!(
            "only 16-bit mono PCM is supported, got {} channel(s) of {}-bit {:?}",
            spec.channels, spec.bits_per_sample, spec.sample_format
        )));
    }
    Ok(())
}

/// Audio carrier codec.
#[derive(Debug, Clone, Default)]
pub struct AudioCodec;

impl AudioCodec {
    pub fn new() -> Self {
        Self
    }

    /// Hide a message in decoded samples.
    pub fn embed(&self, audio: &mut PcmAudio, message: &str, password: Option<&[u8]>) -> Result<()> {
        lsb::hide(&mut audio.samples, message, password)
    }

    /// Recover a message from decoded samples.
    pub fn recover(
        &self,
        audio: &PcmAudio,
        password: Option<&[u8]>,
        expected_length: Option<usize>,
    ) -> Result<String> {
        lsb::extract(&audio.samples, password, expected_length)
    }
}

impl Codec for AudioCodec {
    fn kind(&self) -> CarrierKind {
        CarrierKind::Audio
    }

    fn name(&self) -> &'static str {
        "audio-lsb"
    }

    fn capacity(&self, carrier: &Path) -> Result<usize> {
        let audio = PcmAudio::read(carrier)?;
        let capacity = lsb::capacity(audio.samples.len());
        debug!(
            "audio-lsb: {} samples hold {} characters",
            audio.samples.len(),
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
        let mut audio = PcmAudio::read(carrier)?;
        self.embed(&mut audio, message, key)?;
        let written = commit_output(output, |staging| audio.write(staging))?;
        info!(
            "audio-lsb: hid {} characters in {}",
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
        let audio = PcmAudio::read(carrier)?;
        self.recover(&audio, key, expected_length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn mono16(samples: usize) -> PcmAudio {
        PcmAudio {
            spec: WavSpec {
                channels: 1,
                sample_rate: 8000,
                bits_per_sample: 16,
                sample_format: SampleFormat::Int,
            },
            samples: (0..samples)
                .map(|i| ((i as f64 * 0.05).sin() * 12000.0) as i16)
                .collect(),
        }
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = TempDir::new().unwrap();
        let carrier = dir.path().join("tone.wav");
        let output = dir.path().join("out/stego_tone.wav");
        mono16(20_000).write(&carrier).unwrap();

        let codec = AudioCodec::new();
        assert_eq!(codec.capacity(&carrier).unwrap(), 2498);

        codec
            .hide(&carrier, "audio secret", &output, Some(b"pw"))
            .unwrap();
        assert_eq!(
            codec.extract(&output, Some(b"pw"), None).unwrap(),
            "audio secret"
        );

        let before = PcmAudio::read(&carrier).unwrap();
        let after = PcmAudio::read(&output).unwrap();
        assert_eq!(before.spec, after.spec);
        assert_eq!(before.samples.len(), after.samples.len());
        for (a, b) in before.samples.iter().zip(&after.samples) {
            assert!((i32::from(*a) - i32::from(*b)).abs() <= 1);
        }
    }

    #[test]
    fn test_stereo_rejected_without_output() {
        let dir = TempDir::new().unwrap();
        let carrier = dir.path().join("stereo.wav");
        let output = dir.path().join("stego_stereo.wav");

        let mut audio = mono16(1000);
        audio.spec.channels = 2;
        audio.write(&carrier).unwrap();

        let codec = AudioCodec::new();
        assert!(matches!(
            codec.capacity(&carrier),
            Err(Error::UnsupportedFormat(_))
        ));
        assert!(matches!(
            codec.hide(&carrier, "x", &output, None),
            Err(Error::UnsupportedFormat(_))
        ));
        assert!(!output.exists());
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let codec = AudioCodec::new();
        assert!(matches!(
            codec.capacity(Path::new("/nonexistent/audio.wav")),
            Err(Error::CarrierRead { .. })
        ));
    }
}
