//! Dense factorizations backing the solvers.
//!
//! - [`Lu`]: LU with partial pivoting (`invert`, `solve`)
//! - [`FullPivLu`]: LU with full pivoting and a rank test (`solve_check`)
//! - [`Cholesky`]: LLT for symmetric positive definite systems
//! - [`HouseholderQr`]: least squares for rectangular systems

mod cholesky;
mod lu;
mod qr;

pub use cholesky::Cholesky;
pub use lu::{FullPivLu, Lu};
pub use qr::HouseholderQr;

use crate::error::{MatrixError, Result};
use crate::primitives::Matrix;

/// Returns the symmetric matrix whose upper triangle is that of `m`.
///
/// The strictly lower triangle of `m` is ignored.
///
/// # Errors
///
/// Returns an error if `m` is not square.
///
/// # Examples
///
/// ```
/// use matrixlib::linalg::symmetric_from_upper;
/// use matrixlib::Matrix;
///
/// let m = Matrix::from_vec(2, 2, vec![1.0, 2.0, 99.0, 3.0]).unwrap();
/// let s = symmetric_from_upper(&m).unwrap();
/// assert_eq!(s.as_slice(), &[1.0, 2.0, 2.0, 3.0]);
/// ```
pub fn symmetric_from_upper(m: &Matrix) -> Result<Matrix> {
    let mut s = Matrix::default();
    symmetric_from_upper_into(m, &mut s)?;
    Ok(s)
}

/// Writes the symmetric matrix built from the upper triangle of `m` into
/// `out`, reusing its storage.
///
/// # Errors
///
/// Returns an error if `m` is not square.
pub fn symmetric_from_upper_into(m: &Matrix, out: &mut Matrix) -> Result<()> {
    let n = require_square("symmetric_from_upper", m)?;
    out.set_from(m);
    for i in 0..n {
        for j in 0..i {
            *out.at_mut(i, j) = m.at(j, i);
        }
    }
    Ok(())
}

pub(crate) fn require_square(context: &str, m: &Matrix) -> Result<usize> {
    let (rows, cols) = m.shape();
    if rows != cols {
        return Err(MatrixError::DimensionMismatch {
            expected: format!("{context}: square matrix"),
            actual: format!("{rows}x{cols}"),
        });
    }
    Ok(rows)
}

pub(crate) fn require_column(context: &str, b: &Matrix, rows: usize) -> Result<()> {
    if b.shape() != (rows, 1) {
        return Err(MatrixError::shape_mismatch(context, (rows, 1), b.shape()));
    }
    Ok(())
}
