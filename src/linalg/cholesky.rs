//! Cholesky (LLT) decomposition.

use super::{require_column, require_square};
use crate::error::{MatrixError, Result};
use crate::primitives::Matrix;

/// Cholesky decomposition `A = L L^T` of a symmetric positive definite
/// matrix. Only the lower triangle of `A` is read.
#[derive(Debug, Clone, Default)]
pub struct Cholesky {
    n: usize,
    l: Vec<f64>,
}

impl Cholesky {
    /// Factors a symmetric positive definite matrix.
    ///
    /// # Errors
    ///
    /// Returns an error if `a` is not square, or
    /// [`MatrixError::NotPositiveDefinite`] when a diagonal term is not
    /// strictly positive during factorization.
    pub fn factor(a: &Matrix) -> Result<Self> {
        let mut llt = Self::default();
        llt.refactor(a)?;
        Ok(llt)
    }

    /// Factors `a` into the storage of `self`, reusing its buffer.
    ///
    /// On error `self` is left as the factorization of an empty matrix.
    ///
    /// # Errors
    ///
    /// Same as [`factor`](Self::factor).
    pub fn refactor(&mut self, a: &Matrix) -> Result<()> {
        let n = require_square("cholesky", a)?;
        self.n = 0;
        let l = &mut self.l;
        l.clear();
        l.resize(n * n, 0.0);
        for j in 0..n {
            let sum: f64 = (0..j).map(|k| l[j * n + k] * l[j * n + k]).sum();
            let diag = a.at(j, j) - sum;
            if diag.is_nan() || diag <= 0.0 {
                l.clear();
                return Err(MatrixError::NotPositiveDefinite { index: j });
            }
            let ljj = diag.sqrt();
            l[j * n + j] = ljj;
            for i in j + 1..n {
                let sum: f64 = (0..j).map(|k| l[i * n + k] * l[j * n + k]).sum();
                l[i * n + j] = (a.at(i, j) - sum) / ljj;
            }
        }
        self.n = n;
        Ok(())
    }

    fn solve_slice(&self, b: &mut [f64]) {
        let n = self.n;
        for i in 0..n {
            let sum: f64 = (0..i).map(|k| self.l[i * n + k] * b[k]).sum();
            b[i] = (b[i] - sum) / self.l[i * n + i];
        }
        for i in (0..n).rev() {
            let sum: f64 = (i + 1..n).map(|k| self.l[k * n + i] * b[k]).sum();
            b[i] = (b[i] - sum) / self.l[i * n + i];
        }
    }

    /// Solves `A x = b` for a column vector `b`.
    ///
    /// # Errors
    ///
    /// Returns an error if `b` is not an `n x 1` column.
    pub fn solve_vector(&self, b: &Matrix) -> Result<Matrix> {
        require_column("cholesky solve", b, self.n)?;
        let mut x = b.clone();
        self.solve_slice(x.as_mut_slice());
        Ok(x)
    }

    /// Solves `A X = B`.
    ///
    /// # Errors
    ///
    /// Returns an error if `b` does not have `n` rows.
    pub fn solve_matrix(&self, b: &Matrix) -> Result<Matrix> {
        let mut x = b.clone();
        self.solve_matrix_in_place(&mut x)?;
        Ok(x)
    }

    /// Solves `A X = B` in place, overwriting `b` with `X`.
    ///
    /// Substitutes whole rows at a time, so no temporary is needed.
    ///
    /// # Errors
    ///
    /// Returns an error if `b` does not have `n` rows.
    pub fn solve_matrix_in_place(&self, b: &mut Matrix) -> Result<()> {
        let n = self.n;
        if b.n_rows() != n {
            return Err(MatrixError::dimension_mismatch("cholesky solve rows", n, b.n_rows()));
        }
        let cols = b.n_cols();
        let data = b.as_mut_slice();
        // L Y = B
        for i in 0..n {
            let (done, rest) = data.split_at_mut(i * cols);
            let row = &mut rest[..cols];
            for k in 0..i {
                let factor = self.l[i * n + k];
                for (o, v) in row.iter_mut().zip(&done[k * cols..(k + 1) * cols]) {
                    *o -= factor * v;
                }
            }
            let diag = self.l[i * n + i];
            for o in row.iter_mut() {
                *o /= diag;
            }
        }
        // L^T X = Y
        for i in (0..n).rev() {
            let (head, solved) = data.split_at_mut((i + 1) * cols);
            let row = &mut head[i * cols..];
            for k in i + 1..n {
                let factor = self.l[k * n + i];
                let src = &solved[(k - i - 1) * cols..(k - i) * cols];
                for (o, v) in row.iter_mut().zip(src) {
                    *o -= factor * v;
                }
            }
            let diag = self.l[i * n + i];
            for o in row.iter_mut() {
                *o /= diag;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spd() -> Matrix {
        Matrix::from_vec(3, 3, vec![4.0, 12.0, -16.0, 12.0, 37.0, -43.0, -16.0, -43.0, 98.0])
            .expect("valid 3x3")
    }

    #[test]
    fn test_cholesky_factor_known() {
        let chol = Cholesky::factor(&spd()).expect("positive definite");
        // L = [2 0 0; 6 1 0; -8 5 3]
        assert!((chol.l[0] - 2.0).abs() < 1e-12);
        assert!((chol.l[3] - 6.0).abs() < 1e-12);
        assert!((chol.l[4] - 1.0).abs() < 1e-12);
        assert!((chol.l[6] + 8.0).abs() < 1e-12);
        assert!((chol.l[7] - 5.0).abs() < 1e-12);
        assert!((chol.l[8] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_cholesky_solve_vector() {
        let a = spd();
        let b = Matrix::column_vector(&[1.0, 2.0, 3.0]);
        let x = Cholesky::factor(&a)
            .expect("positive definite")
            .solve_vector(&b)
            .expect("column rhs");
        let mut ax = Matrix::default();
        ax.mult(&a, &x).expect("conforming");
        assert!(ax.is_approx(&b, 1e-9));
    }

    #[test]
    fn test_cholesky_solve_matrix_identity_gives_inverse() {
        let a = spd();
        let inv = Cholesky::factor(&a)
            .expect("positive definite")
            .solve_matrix(&Matrix::identity(3))
            .expect("matching rows");
        let mut product = Matrix::default();
        product.mult(&a, &inv).expect("conforming");
        assert!(product.is_approx(&Matrix::identity(3), 1e-9));
    }

    #[test]
    fn test_cholesky_solve_matrix_in_place_matches_vector_solves() {
        let chol = Cholesky::factor(&spd()).expect("positive definite");
        let b = Matrix::from_vec(3, 2, vec![1.0, -1.0, 2.0, 0.5, 3.0, 4.0]).expect("valid 3x2");
        let mut x = b.clone();
        chol.solve_matrix_in_place(&mut x).expect("matching rows");
        for j in 0..2 {
            let column = Matrix::column_vector(&[b[(0, j)], b[(1, j)], b[(2, j)]]);
            let xj = chol.solve_vector(&column).expect("column rhs");
            for i in 0..3 {
                assert!((x[(i, j)] - xj[(i, 0)]).abs() < 1e-9);
            }
        }
        assert!(chol.solve_matrix_in_place(&mut Matrix::zeros(2, 2)).is_err());
    }

    #[test]
    fn test_cholesky_refactor_reuses_storage() {
        let mut chol = Cholesky::factor(&spd()).expect("positive definite");
        let small = Matrix::from_vec(2, 2, vec![4.0, 2.0, 2.0, 5.0]).expect("valid 2x2");
        chol.refactor(&small).expect("positive definite");
        let x = chol.solve_vector(&Matrix::column_vector(&[6.0, 7.0])).expect("column rhs");
        assert!(x.is_approx(&Matrix::column_vector(&[1.0, 1.0]), 1e-12));

        let indefinite = Matrix::from_vec(2, 2, vec![1.0, 2.0, 2.0, 1.0]).expect("valid 2x2");
        assert!(chol.refactor(&indefinite).is_err());
        assert!(chol.solve_vector(&Matrix::column_vector(&[1.0, 1.0])).is_err());
    }

    #[test]
    fn test_cholesky_rejects_indefinite() {
        let a = Matrix::from_vec(2, 2, vec![1.0, 2.0, 2.0, 1.0]).expect("valid 2x2");
        let err = Cholesky::factor(&a).unwrap_err();
        assert!(matches!(err, MatrixError::NotPositiveDefinite { index: 1 }));
    }
}
