//! Common operations as free functions.
//!
//! Each function writes its result into a caller-provided matrix and
//! reshapes it, so one output buffer can serve calls of varying size.
//!
//! ```
//! use matrixlib::{ops, Matrix};
//!
//! let a = Matrix::from_vec(2, 3, vec![1.0, 0.0, 2.0, 0.0, 1.0, 1.0]).unwrap();
//! let b = Matrix::from_vec(1, 3, vec![0.0, 0.0, 1.0]).unwrap();
//! let mut c = Matrix::default();
//! ops::project_on_nullspace(&a, &b, &mut c, 1e-4).unwrap();
//! assert!(c[(0, 2)].abs() < 1e-6);
//! ```

use crate::error::{MatrixError, Result};
use crate::linalg::{require_column, Cholesky, HouseholderQr};
use crate::primitives::Matrix;

/// Computes `c = a * b`.
///
/// # Errors
///
/// Returns an error if `a.n_cols() != b.n_rows()`.
pub fn mult(a: &Matrix, b: &Matrix, c: &mut Matrix) -> Result<()> {
    c.mult(a, b)
}

/// Computes the quadratic form `c = a^T * b * a`.
///
/// # Errors
///
/// Returns an error if `b` is not square with `a.n_rows()` rows.
pub fn mult_quad(a: &Matrix, b: &Matrix, c: &mut Matrix) -> Result<()> {
    c.mult_quad(a, b)
}

/// Computes `inv = a^-1` by LU decomposition.
///
/// # Errors
///
/// Returns an error if `a` is not square or exactly singular.
pub fn invert(a: &Matrix, inv: &mut Matrix) -> Result<()> {
    inv.invert(a)
}

/// Solves `a x = b` for square `a` by LU decomposition.
///
/// # Errors
///
/// Returns an error if `a` is not square, `b` is not a matching column, or
/// `a` is exactly singular.
pub fn solve(a: &Matrix, b: &Matrix, x: &mut Matrix) -> Result<()> {
    x.solve(a, b)
}

/// Solves `a x = b` after an invertibility check.
///
/// Returns `Ok(false)` and fills `x` with `NaN` if `a` is rank deficient.
///
/// # Errors
///
/// Returns an error if `a` is not square or `b` is not a matching column.
pub fn solve_check(a: &Matrix, b: &Matrix, x: &mut Matrix) -> Result<bool> {
    x.solve_check(a, b)
}

/// Solves `a x = b` in the least-squares sense by Householder QR.
///
/// `a` may have any shape; `x` is reshaped to `a.n_cols() x 1`.
///
/// # Errors
///
/// Returns an error if `b` is not an `a.n_rows() x 1` column.
pub fn solve_robust(a: &Matrix, b: &Matrix, x: &mut Matrix) -> Result<()> {
    require_column("solve_robust", b, a.n_rows())?;
    let solution = HouseholderQr::factor(a).solve(b)?;
    x.set_from(&solution);
    Ok(())
}

/// Damped least-squares solve: `x = a^T (a a^T + alpha^2 I)^-1 b`.
///
/// # Errors
///
/// Returns an error if `b` is not an `a.n_rows() x 1` column, or
/// [`MatrixError::NotPositiveDefinite`] when `a a^T + alpha^2 I` is not
/// positive definite (rank-deficient `a` with `alpha == 0`).
pub fn solve_damped(a: &Matrix, b: &Matrix, alpha: f64, x: &mut Matrix) -> Result<()> {
    require_column("solve_damped", b, a.n_rows())?;
    let mut outer = Matrix::default();
    outer.mult_trans_b(a, a)?;
    add_to_diagonal(&mut outer, alpha * alpha);
    let y = Cholesky::factor(&outer)?.solve_vector(b)?;
    x.mult_trans_a(a, &y)
}

/// Projects `a` onto the nullspace of `b`, so that `b c^T` vanishes.
///
/// Computes `c = a (I - (b^T b + alpha^2 I)^-1 b^T b)`. A positive `alpha`
/// damps the projection near singular configurations of `b`.
///
/// # Errors
///
/// Returns an error if `a.n_cols() != b.n_cols()`, or
/// [`MatrixError::NotPositiveDefinite`] when `b^T b + alpha^2 I` is not
/// positive definite.
pub fn project_on_nullspace(a: &Matrix, b: &Matrix, c: &mut Matrix, alpha: f64) -> Result<()> {
    if a.n_cols() != b.n_cols() {
        return Err(MatrixError::dimension_mismatch(
            "project_on_nullspace columns",
            a.n_cols(),
            b.n_cols(),
        ));
    }
    let n = a.n_cols();
    let mut btb = Matrix::default();
    btb.mult_trans_a(b, b)?;
    let mut outer = btb.clone();
    add_to_diagonal(&mut outer, alpha * alpha);

    let mut projector = Matrix::identity(n);
    let correction = Cholesky::factor(&outer)?.solve_matrix(&btb)?;
    projector.subtract_equals(&correction)?;
    c.mult(a, &projector)
}

fn add_to_diagonal(m: &mut Matrix, value: f64) {
    let n = m.n_rows().min(m.n_cols());
    for i in 0..n {
        m[(i, i)] += value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_a() -> Matrix {
        Matrix::from_vec(3, 4, vec![
            1.0, 2.0, 0.0, -1.0, //
            0.5, 0.0, 3.0, 1.0, //
            -2.0, 1.0, 1.0, 0.0,
        ])
        .expect("valid 3x4")
    }

    fn sample_b() -> Matrix {
        Matrix::from_vec(2, 4, vec![
            1.0, 0.0, 1.0, 0.0, //
            0.0, 1.0, 0.0, 2.0,
        ])
        .expect("valid 2x4")
    }

    #[test]
    fn test_solve_robust_square_matches_solve() {
        let a = Matrix::from_vec(3, 3, vec![4.0, -2.0, 1.0, -2.0, 4.0, -2.0, 1.0, -2.0, 4.0])
            .expect("valid 3x3");
        let b = Matrix::column_vector(&[11.0, -16.0, 17.0]);
        let mut x_lu = Matrix::default();
        let mut x_qr = Matrix::default();
        solve(&a, &b, &mut x_lu).expect("nonsingular");
        solve_robust(&a, &b, &mut x_qr).expect("full rank");
        assert!(x_lu.is_approx(&x_qr, 1e-10));
    }

    #[test]
    fn test_solve_robust_rejects_wrong_rhs() {
        let mut x = Matrix::default();
        assert!(solve_robust(&Matrix::identity(3), &Matrix::zeros(3, 2), &mut x).is_err());
    }

    #[test]
    fn test_solve_damped_zero_damping_reaches_exact_solution() {
        let a = sample_b();
        let b = Matrix::column_vector(&[1.0, 2.0]);
        let mut x = Matrix::default();
        solve_damped(&a, &b, 0.0, &mut x).expect("full row rank");
        assert_eq!(x.shape(), (4, 1));
        let mut ax = Matrix::default();
        ax.mult(&a, &x).expect("conforming");
        assert!(ax.is_approx(&b, 1e-10));
    }

    #[test]
    fn test_solve_damped_shrinks_solution() {
        let a = sample_b();
        let b = Matrix::column_vector(&[1.0, 2.0]);
        let mut exact = Matrix::default();
        let mut damped = Matrix::default();
        solve_damped(&a, &b, 0.0, &mut exact).expect("full row rank");
        solve_damped(&a, &b, 1.0, &mut damped).expect("damped");
        let norm = |m: &Matrix| m.as_slice().iter().map(|v| v * v).sum::<f64>();
        assert!(norm(&damped) < norm(&exact));
    }

    #[test]
    fn test_project_on_nullspace_annihilates_b() {
        let a = sample_a();
        let b = sample_b();
        let mut c = Matrix::default();
        project_on_nullspace(&a, &b, &mut c, 1e-3).expect("damped");
        assert_eq!(c.shape(), (3, 4));
        let mut bct = Matrix::default();
        bct.mult_trans_b(&b, &c).expect("conforming");
        assert!(bct.is_approx(&Matrix::zeros(2, 3), 1e-4));
    }

    #[test]
    fn test_project_on_nullspace_dimension_mismatch() {
        let mut c = Matrix::default();
        let err = project_on_nullspace(&sample_a(), &Matrix::zeros(2, 3), &mut c, 0.1).unwrap_err();
        assert!(matches!(err, MatrixError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_project_on_nullspace_undamped_singular() {
        let mut c = Matrix::default();
        let err = project_on_nullspace(&sample_a(), &sample_b(), &mut c, 0.0).unwrap_err();
        assert!(matches!(err, MatrixError::NotPositiveDefinite { .. }));
    }
}
