//! One-level separable Haar wavelet decomposition.
//!
//! For each 2×2 pixel cell `[a b; c d]`:
//!
//! ```text
//! approx     = (a + b + c + d) / 2
//! horizontal = (a + b - c - d) / 2
//! vertical   = (a - b + c - d) / 2
//! diagonal   = (a - b - c + d) / 2
//! ```
//!
//! The transform is orthonormal. On odd dimensions the last row or column
//! is left out of the decomposition and passes through unchanged.

/// The four subbands of a one-level decomposition, each row-major.
#[derive(Debug, Clone)]
pub struct Subbands {
    /// Subband width (half the even part of the plane width).
    pub width: usize,
    /// Subband height.
    pub height: usize,
    pub approx: Vec<f64>,
    pub horizontal: Vec<f64>,
    pub vertical: Vec<f64>,
    pub diagonal: Vec<f64>,
}

impl Subbands {
    /// Coefficients per subband.
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Subband dimensions for a plane of the given size.
pub fn subband_dims(width: usize, height: usize) -> (usize, usize) {
    (width / 2, height / 2)
}

/// Decompose a row-major plane.
pub fn forward(plane: &[f64], width: usize, height: usize) -> Subbands {
    debug_assert_eq!(plane.len(), width * height);
    let (sw, sh) = subband_dims(width, height);
    let mut bands = Subbands {
        width: sw,
        height: sh,
        approx: vec![0.0; sw * sh],
        horizontal: vec![0.0; sw * sh],
        vertical: vec![0.0; sw * sh],
        diagonal: vec![0.0; sw * sh],
    };

    for y in 0..sh {
        for x in 0..sw {
            let top = 2 * y * width + 2 * x;
            let bottom = top + width;
            let (a, b) = (plane[top], plane[top + 1]);
            let (c, d) = (plane[bottom], plane[bottom + 1]);

            let i = y * sw + x;
            bands.approx[i] = (a + b + c + d) / 2.0;
            bands.horizontal[i] = (a + b - c - d) / 2.0;
            bands.vertical[i] = (a - b + c - d) / 2.0;
            bands.diagonal[i] = (a - b - c + d) / 2.0;
        }
    }
    bands
}

/// Reconstruct the even part of `plane` from its subbands.
pub fn inverse(bands: &Subbands, plane: &mut [f64], width: usize) {
    for y in 0..bands.height {
        for x in 0..bands.width {
            let i = y * bands.width + x;
            let (ll, h) = (bands.approx[i], bands.horizontal[i]);
            let (v, d) = (bands.vertical[i], bands.diagonal[i]);

            let top = 2 * y * width + 2 * x;
            let bottom = top + width;
            plane[top] = (ll + h + v + d) / 2.0;
            plane[top + 1] = (ll + h - v - d) / 2.0;
            plane[bottom] = (ll - h + v - d) / 2.0;
            plane[bottom + 1] = (ll - h - v + d) / 2.0;
        }
    }
}
