//! Inversion and linear solves.

use super::Matrix;
use crate::config::SolverConfig;
use crate::error::Result;
use crate::linalg::{require_column, require_square, FullPivLu, Lu};

impl Matrix {
    /// Computes `self = a^-1` by LU decomposition with partial pivoting.
    ///
    /// `self` and `a` are distinct borrows, so inverting in place needs a
    /// copy of `a`.
    ///
    /// # Errors
    ///
    /// Returns an error if `a` is not square, or
    /// [`MatrixError::SingularMatrix`](crate::MatrixError::SingularMatrix)
    /// when a pivot is exactly zero.
    pub fn invert(&mut self, a: &Matrix) -> Result<()> {
        Lu::factor(a)?.inverse_into(self);
        Ok(())
    }

    /// Solves `a x = b` for a column `b`, writing `x` into `self`.
    ///
    /// # Errors
    ///
    /// Returns an error if `a` is not square, `b` is not an `n x 1` column,
    /// or `a` is exactly singular.
    ///
    /// # Examples
    ///
    /// ```
    /// use matrixlib::Matrix;
    ///
    /// let a = Matrix::from_vec(2, 2, vec![3.0, 1.0, 1.0, 2.0]).unwrap();
    /// let b = Matrix::column_vector(&[9.0, 8.0]);
    /// let mut x = Matrix::default();
    /// x.solve(&a, &b).unwrap();
    /// assert!(x.is_approx(&Matrix::column_vector(&[2.0, 3.0]), 1e-12));
    /// ```
    pub fn solve(&mut self, a: &Matrix, b: &Matrix) -> Result<()> {
        let n = require_square("solve", a)?;
        require_column("solve", b, n)?;
        let x = Lu::factor(a)?.solve(b)?;
        self.set_from(&x);
        Ok(())
    }

    /// Solves `a x = b` after checking that `a` is invertible.
    ///
    /// Returns `Ok(false)` and fills `self` (reshaped to `n x 1`) with `NaN`
    /// when a full-pivot LU decomposition finds `a` rank deficient.
    ///
    /// # Errors
    ///
    /// Returns an error if `a` is not square or `b` is not an `n x 1`
    /// column.
    pub fn solve_check(&mut self, a: &Matrix, b: &Matrix) -> Result<bool> {
        self.solve_check_with(&SolverConfig::default(), a, b)
    }

    /// [`solve_check`](Self::solve_check) with the configured rank threshold.
    ///
    /// # Errors
    ///
    /// Same as [`solve_check`](Self::solve_check).
    pub fn solve_check_with(
        &mut self,
        config: &SolverConfig,
        a: &Matrix,
        b: &Matrix,
    ) -> Result<bool> {
        let n = require_square("solve_check", a)?;
        require_column("solve_check", b, n)?;
        let lu = FullPivLu::factor(a)?;
        let threshold = config.rank_threshold_for(n);
        if !lu.is_invertible(threshold) {
            tracing::debug!(
                n,
                rank = lu.rank(threshold),
                threshold,
                "solve_check: matrix not invertible"
            );
            self.reshape(n, 1);
            self.fill(f64::NAN);
            return Ok(false);
        }
        let x = lu.solve(b)?;
        self.set_from(&x);
        Ok(true)
    }
}
