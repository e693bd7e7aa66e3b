//! Carrier codecs.
//!
//! Every carrier type implements [`Codec`]: capacity accounting, hiding into
//! a new output carrier and extracting back. Codecs hold only their
//! immutable configuration, so one instance can serve any number of calls.

pub mod audio;
pub mod image;
pub(crate) mod lsb;
pub mod text;
pub mod video;

use crate::error::{Error, Result};
use std::fmt;
use std::path::{Path, PathBuf};

pub use self::audio::AudioCodec;
pub use self::image::{ImageCodec, ImageMethod};
pub use self::text::TextCodec;
pub use self::video::VideoCodec;

/// Kind of host medium.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CarrierKind {
    Image,
    Audio,
    Video,
    Text,
}

impl fmt::Display for CarrierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CarrierKind::Image => "image",
            CarrierKind::Audio => "audio",
            CarrierKind::Video => "video",
            CarrierKind::Text => "text",
        };
        f.pad(name)
    }
}

/// Capability shared by all carrier codecs.
pub trait Codec {
    /// Kind of carrier this codec reads and writes.
    fn kind(&self) -> CarrierKind;

    /// Short method name (for logging).
    fn name(&self) -> &'static str;

    /// Maximum message length, in characters, the carrier can hold.
    fn capacity(&self, carrier: &Path) -> Result<usize>;

    /// Hide `message` in a copy of `carrier` written to `output`.
    ///
    /// The input carrier is never modified. Missing parent directories of
    /// `output` are created.
    fn hide(
        &self,
        carrier: &Path,
        message: &str,
        output: &Path,
        key: Option<&[u8]>,
    ) -> Result<PathBuf>;

    /// Recover a hidden message. Returns an empty string when the carrier
    /// holds no recognizable payload.
    fn extract(
        &self,
        carrier: &Path,
        key: Option<&[u8]>,
        expected_length: Option<usize>,
    ) -> Result<String>;
}

/// Write an output carrier through a staging path.
///
/// `write` receives a sibling staging path; on success the staged file or
/// directory is renamed onto `output`, on failure it is removed. A failed
/// hide therefore never leaves a half-written carrier at `output`.
pub(crate) fn commit_output<F>(output: &Path, write: F) -> Result<PathBuf>
where
    F: FnOnce(&Path) -> Result<()>,
{
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| Error::output_write(parent, e))?;
    }

    let staging = staging_path(output);
    let guard = StagingGuard::new(staging.clone());
    write(&staging)?;

    if output.is_dir() {
        std::fs::remove_dir_all(output).map_err(|e| Error::output_write(output, e))?;
    }
    std::fs::rename(&staging, output).map_err(|e| Error::output_write(output, e))?;
    guard.disarm();

    Ok(output.to_path_buf())
}

fn staging_path(output: &Path) -> PathBuf {
    let name = output
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    output.with_file_name(format!(".{}.partial", name))
}

/// Removes a staging path on drop unless disarmed.
struct StagingGuard {
    path: Option<PathBuf>,
}

impl StagingGuard {
    fn new(path: PathBuf) -> Self {
        Self { path: Some(path) }
    }

    fn disarm(mut self) {
        self.path = None;
    }
}

impl Drop for StagingGuard {
    fn drop(&mut self) {
        if let Some(path) = self.path.take() {
            let _ = if path.is_dir() {
                std::fs::remove_dir_all(&path)
            } else {
                std::fs::remove_file(&path)
            };
        }
    }
}

/// Keep the valid UTF-8 runs of `bytes`, dropping invalid sequences.
pub(crate) fn utf8_ignoring_errors(bytes: &[u8]) -> String {
    let mut text = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        text.push_str(chunk.valid());
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_commit_creates_parents() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("a/b/out.txt");

        let written = commit_output(&output, |staging| {
            std::fs::write(staging, b"data").map_err(|e| Error::output_write(staging, e))
        })
        .unwrap();

        assert_eq!(written, output);
        assert_eq!(std::fs::read(&output).unwrap(), b"data");
        assert!(!dir.path().join("a/b/.out.txt.partial").exists());
    }

    #[test]
    fn test_failed_write_leaves_nothing() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("out.txt");

        let result = commit_output(&output, |staging| {
            std::fs::write(staging, b"half").unwrap();
            Err(Error::UnsupportedFormat("boom".to_string()))
        });

        assert!(result.is_err());
        assert!(!output.exists());
        assert!(!dir.path().join(".out.txt.partial").exists());
    }

    #[test]
    fn test_utf8_ignoring_errors() {
        assert_eq!(utf8_ignoring_errors(b"pi\xffng"), "ping");
        assert_eq!(utf8_ignoring_errors("h\u{e9}".as_bytes()), "h\u{e9}");
    }
}
