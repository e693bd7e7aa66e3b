//! Orthonormal 2D DCT-II over square blocks.

/// Separable orthonormal DCT for `n`×`n` blocks with a precomputed basis.
///
/// `basis[k * n + x] = a(k) * cos((2x + 1) * k * PI / 2n)` with
/// `a(0) = sqrt(1/n)` and `a(k > 0) = sqrt(2/n)`.
#[derive(Debug, Clone)]
pub struct BlockDct {
    n: usize,
    basis: Vec<f64>,
}

impl BlockDct {
    pub fn new(n: usize) -> Self {
        let mut basis = vec![0.0; n * n];
        let scale0 = (1.0 / n as f64).sqrt();
        let scale = (2.0 / n as f64).sqrt();
        for k in 0..n {
            let a = if k == 0 { scale0 } else { scale };
            for x in 0..n {
                let angle = (2 * x + 1) as f64 * k as f64 * std::f64::consts::PI / (2 * n) as f64;
                basis[k * n + x] = a * angle.cos();
            }
        }
        Self { n, basis }
    }

    pub fn size(&self) -> usize {
        self.n
    }

    /// Forward transform of a row-major block.
    pub fn forward(&self, block: &[f64]) -> Vec<f64> {
        let n = self.n;
        debug_assert_eq!(block.len(), n * n);

        // Rows: temp[r][k] = sum_x block[r][x] * basis[k][x]
        let mut temp = vec![0.0; n * n];
        for r in 0..n {
            for k in 0..n {
                let mut sum = 0.0;
                for x in 0..n {
                    sum += block[r * n + x] * self.basis[k * n + x];
                }
                temp[r * n + k] = sum;
            }
        }

        // Columns: out[u][k] = sum_r temp[r][k] * basis[u][r]
        let mut out = vec![0.0; n * n];
        for u in 0..n {
            for k in 0..n {
                let mut sum = 0.0;
                for r in 0..n {
                    sum += temp[r * n + k] * self.basis[u * n + r];
                }
                out[u * n + k] = sum;
            }
        }
        out
    }

    /// Inverse transform back to a row-major block of samples.
    pub fn inverse(&self, coeffs: &[f64]) -> Vec<f64> {
        let n = self.n;
        debug_assert_eq!(coeffs.len(), n * n);

        // Columns: temp[y][k] = sum_u coeffs[u][k] * basis[u][y]
        let mut temp = vec![0.0; n * n];
        for y in 0..n {
            for k in 0..n {
                let mut sum = 0.0;
                for u in 0..n {
                    sum += coeffs[u * n + k] * self.basis[u * n + y];
                }
                temp[y * n + k] = sum;
            }
        }

        // Rows: out[y][x] = sum_k temp[y][k] * basis[k][x]
        let mut out = vec![0.0; n * n];
        for y in 0..n {
            for x in 0..n {
                let mut sum = 0.0;
                for k in 0..n {
                    sum += temp[y * n + k] * self.basis[k * n + x];
                }
                out[y * n + x] = sum;
            }
        }
        out
    }
}
