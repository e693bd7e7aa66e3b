//! Bit-stream framing for payloads.
//!
//! Two conventions coexist:
//! - sentinel-terminated character bits (image and audio carriers)
//! - length-prefixed encrypted bytes (video and text carriers)

pub mod bits;
mod framing;

pub use bits::{
    decode_sentinel_framed, find_sentinel, frame_with_sentinel, from_bits, sentinel_capacity,
    sentinel_framed_len, to_bits,
};
pub use framing::{
    frame_length_prefixed, length_prefixed_bits, read_length_prefix, unframe_length_prefixed,
};
