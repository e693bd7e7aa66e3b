//! Error types for stegkit.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for stegkit operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed cause kept behind I/O and decode failures.
pub type Cause = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur while hiding or extracting a message.
#[derive(Error, Debug)]
pub enum Error {
    /// Carrier layout the codec cannot work with (sample width, channels, mode).
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Message plus framing does not fit the carrier.
    #[error("Message too long: {length} characters, capacity is {capacity}")]
    MessageTooLong { length: usize, capacity: usize },

    /// Not enough storage slots for random or coefficient placement.
    #[error("Carrier too small: need {needed} slots, have {available}")]
    CarrierTooSmall { needed: usize, available: usize },

    /// Carrier could not be opened or parsed.
    #[error("Cannot read carrier {path}: {source}")]
    CarrierRead {
        path: PathBuf,
        #[source]
        source: Cause,
    },

    /// Output carrier could not be written.
    #[error("Cannot write output {path}: {source}")]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: Cause,
    },

    /// Padding or key mismatch on decrypt.
    #[error("Decryption failed: wrong key or corrupted data")]
    DecryptionFailed,

    /// Length-prefixed frame declares more bytes than the bit stream holds.
    #[error("Truncated payload: declared {declared} bytes, only {available} available")]
    TruncatedPayload { declared: usize, available: usize },

    /// Character outside the single-byte range of the bit framer.
    #[error("Unsupported character {character:?} at position {position}: only code points up to U+00FF can be framed")]
    EncodingUnsupported { character: char, position: usize },

    /// The method needs key material and none was given.
    #[error("Method {0} requires a key or password")]
    MissingKey(&'static str),

    /// Unknown method tag.
    #[error("Invalid method: {0}")]
    InvalidMethod(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Wrap a carrier read failure, keeping the original cause.
    pub fn carrier_read(path: impl Into<PathBuf>, source: impl Into<Cause>) -> Self {
        Error::CarrierRead {
            path: path.into(),
            source: source.into(),
        }
    }

    /// Wrap an output write failure, keeping the original cause.
    pub fn output_write(path: impl Into<PathBuf>, source: impl Into<Cause>) -> Self {
        Error::OutputWrite {
            path: path.into(),
            source: source.into(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Config(e.to_string())
    }
}
