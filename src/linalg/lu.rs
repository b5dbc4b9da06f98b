//! LU decompositions with partial and full pivoting.

use super::{require_column, require_square};
use crate::error::{MatrixError, Result};
use crate::primitives::Matrix;

/// LU decomposition `P A = L U` with partial (row) pivoting.
///
/// `L` has a unit diagonal and shares storage with `U`. The row exchanges
/// are kept in the order they were made, so they can be replayed on a
/// right-hand side without a temporary.
#[derive(Debug, Clone, Default)]
pub struct Lu {
    n: usize,
    lu: Vec<f64>,
    /// Row exchanged with row `k` at elimination step `k`.
    pivots: Vec<usize>,
}

impl Lu {
    /// Factors a square matrix.
    ///
    /// # Errors
    ///
    /// Returns an error if `a` is not square, or
    /// [`MatrixError::SingularMatrix`] when a pivot is exactly zero.
    pub fn factor(a: &Matrix) -> Result<Self> {
        let mut lu = Self::default();
        lu.refactor(a)?;
        Ok(lu)
    }

    /// Factors `a` into the storage of `self`, reusing its buffers.
    ///
    /// On error `self` is left as the factorization of an empty matrix.
    ///
    /// # Errors
    ///
    /// Same as [`factor`](Self::factor).
    pub fn refactor(&mut self, a: &Matrix) -> Result<()> {
        let n = require_square("lu", a)?;
        self.n = 0;
        self.pivots.clear();
        self.lu.clear();
        self.lu.extend_from_slice(a.as_slice());
        let lu = &mut self.lu;

        for k in 0..n {
            let mut p = k;
            let mut best = lu[k * n + k].abs();
            for i in k + 1..n {
                let v = lu[i * n + k].abs();
                if v > best {
                    best = v;
                    p = i;
                }
            }
            if lu[p * n + k] == 0.0 {
                self.pivots.clear();
                return Err(MatrixError::SingularMatrix { pivot: 0.0 });
            }
            if p != k {
                for j in 0..n {
                    lu.swap(k * n + j, p * n + j);
                }
            }
            self.pivots.push(p);

            let pivot = lu[k * n + k];
            for i in k + 1..n {
                let factor = lu[i * n + k] / pivot;
                lu[i * n + k] = factor;
                for j in k + 1..n {
                    lu[i * n + j] -= factor * lu[k * n + j];
                }
            }
        }

        self.n = n;
        Ok(())
    }

    /// Dimension of the factored matrix.
    #[must_use]
    pub fn dim(&self) -> usize {
        self.n
    }

    /// Returns `true` when every pivot satisfies
    /// `|u_kk| > threshold * max_j |u_jj|`.
    ///
    /// Partial pivoting only guarantees nonzero pivots, so a matrix can
    /// factor and still be numerically singular. This is a cheap check for
    /// that case; [`FullPivLu::rank`] is the reliable one.
    #[must_use]
    pub fn is_well_conditioned(&self, threshold: f64) -> bool {
        let n = self.n;
        let max_pivot = (0..n).map(|k| self.lu[k * n + k].abs()).fold(0.0, f64::max);
        let cutoff = threshold * max_pivot;
        (0..n).all(|k| self.lu[k * n + k].abs() > cutoff)
    }

    /// Solves `A x = b` for one right-hand side, overwriting `b` with `x`.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::DimensionMismatch`] if `b.len()` differs from
    /// the factored dimension.
    pub fn solve_in_place(&self, b: &mut [f64]) -> Result<()> {
        let n = self.n;
        if b.len() != n {
            return Err(MatrixError::dimension_mismatch("lu solve", n, b.len()));
        }
        for (k, &p) in self.pivots.iter().enumerate() {
            b.swap(k, p);
        }
        for i in 0..n {
            let sum: f64 = (0..i).map(|j| self.lu[i * n + j] * b[j]).sum();
            b[i] -= sum;
        }
        for i in (0..n).rev() {
            let sum: f64 = (i + 1..n).map(|j| self.lu[i * n + j] * b[j]).sum();
            b[i] = (b[i] - sum) / self.lu[i * n + i];
        }
        Ok(())
    }

    /// Solves `A x = b` for a column vector `b`.
    ///
    /// # Errors
    ///
    /// Returns an error if `b` is not an `n x 1` column.
    pub fn solve(&self, b: &Matrix) -> Result<Matrix> {
        require_column("lu solve", b, self.n)?;
        let mut x = b.clone();
        self.solve_in_place(x.as_mut_slice())?;
        Ok(x)
    }

    /// Returns `A^-1`.
    #[must_use]
    pub fn inverse(&self) -> Matrix {
        let mut inv = Matrix::default();
        self.inverse_into(&mut inv);
        inv
    }

    /// Writes `A^-1` into `out`, reshaping it to `n x n`.
    ///
    /// Works row-wise on `P I`, so `out` is the only storage touched.
    pub fn inverse_into(&self, out: &mut Matrix) {
        let n = self.n;
        out.reshape_zeroed(n, n);
        let data = out.as_mut_slice();
        for i in 0..n {
            data[i * n + i] = 1.0;
        }
        for (k, &p) in self.pivots.iter().enumerate() {
            if p != k {
                for j in 0..n {
                    data.swap(k * n + j, p * n + j);
                }
            }
        }
        // Unit lower triangle: row i -= l_ij * row j for j < i.
        for i in 0..n {
            let (done, rest) = data.split_at_mut(i * n);
            let row = &mut rest[..n];
            for j in 0..i {
                let factor = self.lu[i * n + j];
                if factor != 0.0 {
                    for (o, v) in row.iter_mut().zip(&done[j * n..(j + 1) * n]) {
                        *o -= factor * v;
                    }
                }
            }
        }
        // Upper triangle, from the bottom row up.
        for i in (0..n).rev() {
            let (head, solved) = data.split_at_mut((i + 1) * n);
            let row = &mut head[i * n..];
            for j in i + 1..n {
                let factor = self.lu[i * n + j];
                if factor != 0.0 {
                    let src = &solved[(j - i - 1) * n..(j - i) * n];
                    for (o, v) in row.iter_mut().zip(src) {
                        *o -= factor * v;
                    }
                }
            }
            let diag = self.lu[i * n + i];
            for o in row.iter_mut() {
                *o /= diag;
            }
        }
    }

    /// Returns `det(A)`.
    #[must_use]
    pub fn determinant(&self) -> f64 {
        let swaps = self.pivots.iter().enumerate().filter(|&(k, &p)| k != p).count();
        let sign = if swaps % 2 == 0 { 1.0 } else { -1.0 };
        (0..self.n).map(|i| self.lu[i * self.n + i]).product::<f64>() * sign
    }
}

/// LU decomposition `P A Q = L U` with full (row and column) pivoting.
///
/// Used where a reliable invertibility test is needed: the number of
/// pivots above a relative threshold gives the numerical rank.
#[derive(Debug, Clone)]
pub struct FullPivLu {
    n: usize,
    lu: Vec<f64>,
    row_perm: Vec<usize>,
    col_perm: Vec<usize>,
    /// Number of pivots that are not exactly zero.
    nonzero_pivots: usize,
    max_pivot: f64,
}

impl FullPivLu {
    /// Factors a square matrix. Never fails on singular input.
    ///
    /// # Errors
    ///
    /// Returns an error if `a` is not square.
    pub fn factor(a: &Matrix) -> Result<Self> {
        let n = require_square("full_piv_lu", a)?;
        let mut lu = a.as_slice().to_vec();
        let mut row_perm: Vec<usize> = (0..n).collect();
        let mut col_perm: Vec<usize> = (0..n).collect();
        let mut nonzero_pivots = n;
        let mut max_pivot = 0.0_f64;

        for k in 0..n {
            let (mut p, mut q, mut best) = (k, k, 0.0_f64);
            for i in k..n {
                for j in k..n {
                    let v = lu[i * n + j].abs();
                    if v > best {
                        best = v;
                        p = i;
                        q = j;
                    }
                }
            }
            if best == 0.0 {
                nonzero_pivots = k;
                break;
            }
            max_pivot = max_pivot.max(best);

            if p != k {
                for j in 0..n {
                    lu.swap(k * n + j, p * n + j);
                }
                row_perm.swap(k, p);
            }
            if q != k {
                for i in 0..n {
                    lu.swap(i * n + k, i * n + q);
                }
                col_perm.swap(k, q);
            }

            let pivot = lu[k * n + k];
            for i in k + 1..n {
                let factor = lu[i * n + k] / pivot;
                lu[i * n + k] = factor;
                for j in k + 1..n {
                    lu[i * n + j] -= factor * lu[k * n + j];
                }
            }
        }

        Ok(Self {
            n,
            lu,
            row_perm,
            col_perm,
            nonzero_pivots,
            max_pivot,
        })
    }

    /// Number of pivots with `|p| > threshold * |p_max|`.
    #[must_use]
    pub fn rank(&self, threshold: f64) -> usize {
        let cutoff = threshold * self.max_pivot;
        (0..self.nonzero_pivots)
            .filter(|&k| self.lu[k * self.n + k].abs() > cutoff)
            .count()
    }

    /// Returns `true` if the matrix has full rank at `threshold`.
    #[must_use]
    pub fn is_invertible(&self, threshold: f64) -> bool {
        self.rank(threshold) == self.n
    }

    /// Solves `A x = b` for a column vector `b`.
    ///
    /// The result is only meaningful when
    /// [`is_invertible`](Self::is_invertible) holds.
    ///
    /// # Errors
    ///
    /// Returns an error if `b` is not an `n x 1` column.
    pub fn solve(&self, b: &Matrix) -> Result<Matrix> {
        require_column("full_piv_lu solve", b, self.n)?;
        let n = self.n;
        let rhs = b.as_slice();
        let mut z: Vec<f64> = self.row_perm.iter().map(|&p| rhs[p]).collect();
        for i in 0..n {
            let sum: f64 = (0..i).map(|j| self.lu[i * n + j] * z[j]).sum();
            z[i] -= sum;
        }
        for i in (0..n).rev() {
            let sum: f64 = (i + 1..n).map(|j| self.lu[i * n + j] * z[j]).sum();
            z[i] = (z[i] - sum) / self.lu[i * n + i];
        }
        let mut x = vec![0.0; n];
        for (i, &c) in self.col_perm.iter().enumerate() {
            x[c] = z[i];
        }
        Ok(Matrix::column_vector(&x))
    }
}
