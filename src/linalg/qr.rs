//! Householder QR decomposition and least-squares solve.

use super::require_column;
use crate::error::{MatrixError, Result};
use crate::primitives::Matrix;

/// Householder QR decomposition of an `m x n` matrix.
///
/// Reflectors are kept explicitly; `r` holds the upper trapezoid.
#[derive(Debug, Clone)]
pub struct HouseholderQr {
    m: usize,
    n: usize,
    r: Vec<f64>,
    /// Reflector `k` acts on rows `k..m`. `None` when the column was
    /// already zero below the diagonal.
    reflectors: Vec<Option<Vec<f64>>>,
}

impl HouseholderQr {
    /// Factors a matrix of any shape.
    #[must_use]
    pub fn factor(a: &Matrix) -> Self {
        let (m, n) = a.shape();
        let mut r = a.as_slice().to_vec();
        let steps = m.min(n);
        let mut reflectors = Vec::with_capacity(steps);

        for k in 0..steps {
            let norm = (k..m).map(|i| r[i * n + k].powi(2)).sum::<f64>().sqrt();
            let x0 = r[k * n + k];
            let alpha = if x0 >= 0.0 { -norm } else { norm };
            let mut v: Vec<f64> = (k..m).map(|i| r[i * n + k]).collect();
            v[0] -= alpha;
            let vnorm2: f64 = v.iter().map(|x| x * x).sum();
            if vnorm2 == 0.0 {
                reflectors.push(None);
                continue;
            }
            for j in k..n {
                let dot: f64 = v.iter().enumerate().map(|(t, vt)| vt * r[(k + t) * n + j]).sum();
                let f = 2.0 * dot / vnorm2;
                for (t, vt) in v.iter().enumerate() {
                    r[(k + t) * n + j] -= f * vt;
                }
            }
            reflectors.push(Some(v));
        }

        Self { m, n, r, reflectors }
    }

    /// Applies `Q^T` to a vector of length `m`.
    fn apply_qt(&self, b: &mut [f64]) {
        for (k, reflector) in self.reflectors.iter().enumerate() {
            let Some(v) = reflector else { continue };
            let vnorm2: f64 = v.iter().map(|x| x * x).sum();
            let dot: f64 = v.iter().zip(&b[k..]).map(|(vt, bt)| vt * bt).sum();
            let f = 2.0 * dot / vnorm2;
            for (bt, vt) in b[k..].iter_mut().zip(v) {
                *bt -= f * vt;
            }
        }
    }

    /// Solves `A x = b` in the least-squares sense.
    ///
    /// Tall systems get the least-squares solution. Wide systems get the
    /// basic solution where the trailing `n - m` unknowns are zero.
    ///
    /// # Errors
    ///
    /// Returns an error if `b` is not an `m x 1` column, or
    /// [`MatrixError::SingularMatrix`] when a diagonal of `R` is exactly
    /// zero.
    pub fn solve(&self, b: &Matrix) -> Result<Matrix> {
        require_column("qr solve", b, self.m)?;
        let (m, n) = (self.m, self.n);
        let mut c = b.as_slice().to_vec();
        self.apply_qt(&mut c);

        let rank = m.min(n);
        let mut x = vec![0.0; n];
        for i in (0..rank).rev() {
            let diag = self.r[i * n + i];
            if diag == 0.0 {
                return Err(MatrixError::SingularMatrix { pivot: diag });
            }
            let sum: f64 = (i + 1..rank).map(|j| self.r[i * n + j] * x[j]).sum();
            x[i] = (c[i] - sum) / diag;
        }
        Ok(Matrix::column_vector(&x))
    }
}
