//! Lossless frame-sequence container.
//!
//! A sequence is a directory holding `sequence.json` and one PNG per frame
//! named `frame_000000.png`, `frame_000001.png`, ... PNG keeps every bit of
//! every channel, which LSB payloads depend on.

use crate::codec::image::{load_rgb, save_png};
use crate::error::{Error, Result};
use image::RgbImage;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Manifest file name inside a sequence directory.
pub const MANIFEST_FILE: &str = "sequence.json";

/// Sequence-level metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceManifest {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub frame_count: usize,
}

impl SequenceManifest {
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(MANIFEST_FILE);
        let raw = std::fs::read_to_string(&path).map_err(|e| Error::carrier_read(&path, e))?;
        serde_json::from_str(&raw).map_err(|e| Error::carrier_read(&path, e))
    }

    pub fn save(&self, dir: &Path) -> Result<()> {
        let path = dir.join(MANIFEST_FILE);
        let json = serde_json::to_string_pretty(self).map_err(|e| Error::output_write(&path, e))?;
        std::fs::write(&path, json).map_err(|e| Error::output_write(&path, e))
    }

    /// One bit per pixel of one channel across all frames.
    pub fn bit_budget(&self) -> usize {
        self.width as usize * self.height as usize * self.frame_count
    }
}

/// Source of decoded frames that can restart from the first frame.
pub trait FrameSource {
    /// Frame (width, height).
    fn dimensions(&self) -> (u32, u32);

    /// Number of frames in the sequence.
    fn frame_count(&self) -> usize;

    /// Frames per second.
    fn fps(&self) -> f64;

    /// Restart from the first frame.
    fn rewind(&mut self) -> Result<()>;

    /// Next frame in decode order, `None` at the end.
    fn next_frame(&mut self) -> Result<Option<RgbImage>>;
}

/// Destination for frames, written in order.
pub trait FrameSink {
    fn write_frame(&mut self, frame: &RgbImage) -> Result<()>;

    /// Flush sequence metadata. Must be called once after the last frame.
    fn finish(&mut self) -> Result<()>;
}

/// Reads a PNG frame-sequence directory one frame at a time.
#[derive(Debug)]
pub struct PngSequenceReader {
    manifest: SequenceManifest,
    frames: Vec<PathBuf>,
    cursor: usize,
}

impl PngSequenceReader {
    pub fn open(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            return Err(Error::carrier_read(
                dir,
                format!("{} is not a frame sequence directory", dir.display()),
            ));
        }
        let manifest = SequenceManifest::load(dir)?;

        let mut frames: Vec<PathBuf> = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| is_frame_file(path))
            .collect();
        frames.sort();

        if frames.len() != manifest.frame_count {
            return Err(Error::carrier_read(
                dir,
                format!(
                    "manifest declares {} frames, found {}",
                    manifest.frame_count,
                    frames.len()
                ),
            ));
        }

        Ok(Self {
            manifest,
            frames,
            cursor: 0,
        })
    }

    pub fn manifest(&self) -> &SequenceManifest {
        &self.manifest
    }
}

fn is_frame_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    name.starts_with("frame_") && name.ends_with(".png")
}

fn frame_file_name(index: usize) -> String {
    format!("frame_{:06}.png", index)
}

impl FrameSource for PngSequenceReader {
    fn dimensions(&self) -> (u32, u32) {
        (self.manifest.width, self.manifest.height)
    }

    fn frame_count(&self) -> usize {
        self.manifest.frame_count
    }

    fn fps(&self) -> f64 {
        self.manifest.fps
    }

    fn rewind(&mut self) -> Result<()> {
        self.cursor = 0;
        Ok(())
    }

    fn next_frame(&mut self) -> Result<Option<RgbImage>> {
        let Some(path) = self.frames.get(self.cursor) else {
            return Ok(None);
        };
        let frame = load_rgb(path)?;
        if frame.dimensions() != self.dimensions() {
            return Err(Error::UnsupportedFormat(format!(
                "frame {} is {}x{}, sequence is {}x{}",
                path.display(),
                frame.width(),
                frame.height(),
                self.manifest.width,
                self.manifest.height
            )));
        }
        self.cursor += 1;
        Ok(Some(frame))
    }
}

/// Writes frames as a PNG frame-sequence directory.
#[derive(Debug)]
pub struct PngSequenceWriter {
    dir: PathBuf,
    manifest: SequenceManifest,
}

impl PngSequenceWriter {
    pub fn create(dir: &Path, width: u32, height: u32, fps: f64) -> Result<Self> {
        std::fs::create_dir_all(dir).map_err(|e| Error::output_write(dir, e))?;
        Ok(Self {
            dir: dir.to_path_buf(),
            manifest: SequenceManifest {
                width,
                height,
                fps,
                frame_count: 0,
            },
        })
    }
}

impl FrameSink for PngSequenceWriter {
    fn write_frame(&mut self, frame: &RgbImage) -> Result<()> {
        if frame.dimensions() != (self.manifest.width, self.manifest.height) {
            return Err(Error::UnsupportedFormat(format!(
                "frame is {}x{}, sequence is {}x{}",
                frame.width(),
                frame.height(),
                self.manifest.width,
                self.manifest.height
            )));
        }
        let path = self.dir.join(frame_file_name(self.manifest.frame_count));
        save_png(frame, &path)?;
        self.manifest.frame_count += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.manifest.save(&self.dir)
    }
}

/// Write a whole sequence in one call.
pub fn write_sequence(dir: &Path, fps: f64, frames: &[RgbImage]) -> Result<()> {
    let (width, height) = frames.first().map(|f| f.dimensions()).unwrap_or((0, 0));
    let mut writer = PngSequenceWriter::create(dir, width, height, fps)?;
    for frame in frames {
        writer.write_frame(frame)?;
    }
    writer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use tempfile::TempDir;

    fn frame(seed: u8) -> RgbImage {
        RgbImage::from_fn(6, 4, |x, y| Rgb([seed, x as u8, y as u8]))
    }

    #[test]
    fn test_write_then_read() {
        let dir = TempDir::new().unwrap();
        let seq = dir.path().join("clip");
        write_sequence(&seq, 24.0, &[frame(1), frame(2), frame(3)]).unwrap();

        let mut reader = PngSequenceReader::open(&seq).unwrap();
        assert_eq!(reader.dimensions(), (6, 4));
        assert_eq!(reader.frame_count(), 3);
        assert_eq!(reader.manifest().bit_budget(), 72);

        assert_eq!(reader.next_frame().unwrap().unwrap(), frame(1));
        assert_eq!(reader.next_frame().unwrap().unwrap(), frame(2));
        reader.rewind().unwrap();
        assert_eq!(reader.next_frame().unwrap().unwrap(), frame(1));
        reader.next_frame().unwrap();
        reader.next_frame().unwrap();
        assert!(reader.next_frame().unwrap().is_none());
    }

    #[test]
    fn test_missing_frame_detected() {
        let dir = TempDir::new().unwrap();
        let seq = dir.path().join("clip");
        write_sequence(&seq, 24.0, &[frame(1), frame(2)]).unwrap();
        std::fs::remove_file(seq.join(frame_file_name(1))).unwrap();

        assert!(matches!(
            PngSequenceReader::open(&seq),
            Err(Error::CarrierRead { .. })
        ));
    }

    #[test]
    fn test_mismatched_frame_rejected() {
        let dir = TempDir::new().unwrap();
        let mut writer = PngSequenceWriter::create(dir.path(), 6, 4, 30.0).unwrap();
        assert!(writer.write_frame(&RgbImage::new(5, 4)).is_err());
    }
}
