//! Small fixed-size helpers for 3D work.
//!
//! Vectors are `[f64; 3]` (or `[f64; 4]`) and 3x3 matrices are row-major
//! `[[f64; 3]; 3]`.

use crate::error::{MatrixError, Result};
use crate::primitives::Matrix;

/// Returns the 3x3 skew-symmetric matrix `[v]x` with `[v]x w = v x w`.
///
/// ```
/// use matrixlib::tools::skew_symmetric;
///
/// let s = skew_symmetric([1.0, 2.0, 3.0]);
/// assert_eq!(s.row(0), &[0.0, -3.0, 2.0]);
/// ```
#[must_use]
pub fn skew_symmetric(v: [f64; 3]) -> Matrix {
    let mut m = Matrix::default();
    vector_to_skew_symmetric(&mut m, v);
    m
}

/// Writes the skew-symmetric matrix of `v` into `m`, reshaping it to 3x3.
pub fn vector_to_skew_symmetric(m: &mut Matrix, v: [f64; 3]) {
    let [x, y, z] = v;
    m.reshape(3, 3);
    m.as_mut_slice().copy_from_slice(&[
        0.0, -z, y, //
        z, 0.0, -x, //
        -y, x, 0.0,
    ]);
}

/// Computes `[a]x [b]x`, which equals `b a^T - (a . b) I`.
#[must_use]
pub fn tilde_times_tilde(a: [f64; 3], b: [f64; 3]) -> [[f64; 3]; 3] {
    let dot: f64 = a.iter().zip(&b).map(|(x, y)| x * y).sum();
    let mut m = [[0.0; 3]; 3];
    for (i, row) in m.iter_mut().enumerate() {
        for (j, value) in row.iter_mut().enumerate() {
            *value = b[i] * a[j];
        }
        row[i] -= dot;
    }
    m
}

/// Outer product `v v^T`.
#[must_use]
pub fn mult_outer3(v: [f64; 3]) -> [[f64; 3]; 3] {
    let mut m = [[0.0; 3]; 3];
    for (i, row) in m.iter_mut().enumerate() {
        for (j, value) in row.iter_mut().enumerate() {
            *value = v[i] * v[j];
        }
    }
    m
}

/// Zeroes `m` and sets its diagonal to `values`.
pub fn set_diagonal3(m: &mut [[f64; 3]; 3], values: [f64; 3]) {
    *m = [[0.0; 3]; 3];
    for (i, v) in values.into_iter().enumerate() {
        m[i][i] = v;
    }
}

fn mult_tuple<const N: usize>(m: &Matrix, v: &mut [f64; N]) -> Result<()> {
    if m.shape() != (N, N) {
        return Err(MatrixError::shape_mismatch("mult_tuple", (N, N), m.shape()));
    }
    let input = *v;
    for (i, out) in v.iter_mut().enumerate() {
        *out = m.row(i).iter().zip(&input).map(|(a, b)| a * b).sum();
    }
    Ok(())
}

/// Replaces `v` with `m v` for a 3x3 `m`.
///
/// # Errors
///
/// Returns [`MatrixError::DimensionMismatch`] unless `m` is 3x3.
pub fn mult_tuple3(m: &Matrix, v: &mut [f64; 3]) -> Result<()> {
    mult_tuple(m, v)
}

/// Replaces `v` with `m v` for a 4x4 `m`.
///
/// # Errors
///
/// Returns [`MatrixError::DimensionMismatch`] unless `m` is 4x4.
pub fn mult_tuple4(m: &Matrix, v: &mut [f64; 4]) -> Result<()> {
    mult_tuple(m, v)
}
