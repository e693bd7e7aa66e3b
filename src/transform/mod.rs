//! Frequency transforms used by the image strategies.

mod dct;
pub mod haar;

pub use dct::BlockDct;
pub use haar::Subbands;

/// Force a coefficient to carry `bit` in its sign.
///
/// The magnitude is pushed outward by `strength`: a 1 becomes
/// `|c| + strength`, a 0 becomes `-(|c| + strength)`. Reading back needs only
/// the sign, and the margin absorbs rounding to integer samples.
pub fn embed_in_sign(coefficient: f64, bit: u8, strength: f64) -> f64 {
    let magnitude = coefficient.abs() + strength;
    if bit == 1 {
        magnitude
    } else {
        -magnitude
    }
}

/// Read the bit carried by a coefficient: positive is 1, anything else 0.
pub fn read_sign(coefficient: f64) -> u8 {
    u8::from(coefficient > 0.0)
}
