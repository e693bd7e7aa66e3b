//! stegkit
//!
//! Hide secret messages inside ordinary carrier files so that the carrier
//! still looks and sounds unchanged.
//!
//! # Features
//!
//! - **Images**: key-permuted LSB, 8×8 DCT sign embedding and Haar wavelet
//!   sign embedding, always written back as lossless PNG
//! - **Audio**: key-permuted LSB over 16-bit mono PCM WAV samples
//! - **Video**: sequential LSB over one color channel of a PNG frame sequence
//! - **Text**: zero-width characters appended after the cover text
//! - **AES-256-CBC**: video and text payloads are always encrypted; image and
//!   audio payloads are sealed whenever key material is supplied
//!
//! # Architecture
//!
//! ```text
//! Message → [Encrypt (AES-256-CBC)] → Frame (sentinel | length prefix)
//!         → Place (permutation | sequential | transform sign) → Write carrier
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use stegkit::{Method, Stego};
//! use std::path::Path;
//!
//! let stego = Stego::default();
//! let written = stego
//!     .hide(
//!         Path::new("photo.png"),
//!         "meet at noon",
//!         None,
//!         Method::ImageLsb,
//!         Some(b"secret"),
//!     )
//!     .unwrap();
//!
//! let message = stego
//!     .extract(&written, Method::ImageLsb, Some(b"secret"), None)
//!     .unwrap();
//! assert_eq!(message, "meet at noon");
//! ```

pub mod codec;
pub mod config;
pub mod crypto;
pub mod encoding;
pub mod error;
pub mod placement;
pub mod stego;
pub mod transform;

pub use codec::{CarrierKind, Codec};
pub use config::StegoConfig;
pub use error::{Error, Result};
pub use stego::{Method, Stego};
