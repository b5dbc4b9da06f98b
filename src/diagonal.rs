//! Products with diagonal matrices.
//!
//! A diagonal operand is passed as a [`Diagonal`], which lets the same
//! operation take a dense (possibly rectangular) matrix, a vector of
//! diagonal entries or a scaled identity. Only the diagonal entries are
//! touched, so each product costs `O(rows * cols)` rather than a full dense
//! multiply.
//!
//! ```
//! use matrixlib::diagonal::{mult_inner, Diagonal};
//! use matrixlib::Matrix;
//!
//! // H = J^T W J for a 2-row task Jacobian with weights (2, 3).
//! let j = Matrix::from_vec(2, 2, vec![1.0, 0.0, 1.0, 1.0]).unwrap();
//! let w = Matrix::column_vector(&[2.0, 3.0]);
//! let mut h = Matrix::default();
//! mult_inner(&j, Diagonal::Vector(&w), &mut h).unwrap();
//! assert_eq!(h.as_slice(), &[5.0, 3.0, 3.0, 3.0]);
//! ```

use crate::error::{MatrixError, Result};
use crate::primitives::Matrix;

/// A diagonal matrix operand.
#[derive(Debug, Clone, Copy)]
pub enum Diagonal<'a> {
    /// A dense matrix whose main diagonal is used. It may be rectangular;
    /// entries past `min(rows, cols)` are zero.
    Matrix(&'a Matrix),
    /// A vector (row or column) of diagonal entries, read as the square
    /// matrix `diag(v)`.
    Vector(&'a Matrix),
    /// A scaled identity whose size conforms to the other operand.
    Scalar(f64),
}

impl Diagonal<'_> {
    /// Shape of the diagonal operand; a scalar takes the `n x n` shape.
    fn shape(&self, n: usize) -> Result<(usize, usize)> {
        match self {
            Self::Matrix(d) => Ok(d.shape()),
            Self::Vector(v) if v.is_vector() => Ok((v.num_elements(), v.num_elements())),
            Self::Vector(v) => Err(MatrixError::invalid(format!(
                "diagonal vector must have a single row or column, got {}x{}",
                v.n_rows(),
                v.n_cols()
            ))),
            Self::Scalar(_) => Ok((n, n)),
        }
    }

    /// Entry `i` of the diagonal, for `i < min(rows, cols)`.
    fn value(&self, i: usize) -> f64 {
        match self {
            Self::Matrix(d) => d[(i, i)],
            Self::Vector(v) => v.as_slice()[i],
            Self::Scalar(s) => *s,
        }
    }

    /// Resolves the operand against the dimension it must match on one
    /// side. Returns `(rows, cols)`.
    fn conform(
        &self,
        context: &str,
        rows: Option<usize>,
        cols: Option<usize>,
    ) -> Result<(usize, usize)> {
        let n = rows.or(cols).unwrap_or(0);
        let shape = self.shape(n)?;
        if let Some(r) = rows {
            if shape.0 != r {
                return Err(MatrixError::dimension_mismatch(context, r, shape.0));
            }
        }
        if let Some(c) = cols {
            if shape.1 != c {
                return Err(MatrixError::dimension_mismatch(context, c, shape.1));
            }
        }
        Ok(shape)
    }
}

/// Replaces each diagonal entry of `m` with its reciprocal.
///
/// Off-diagonal entries are left as they are.
pub fn invert_diagonal(m: &mut Matrix) {
    for i in 0..m.n_rows().min(m.n_cols()) {
        m[(i, i)] = 1.0 / m[(i, i)];
    }
}

/// Writes the inverse of the diagonal matrix `m` into `out`.
///
/// `out` is reshaped to `m`'s shape and its off-diagonal entries are zero.
pub fn invert_diagonal_into(m: &Matrix, out: &mut Matrix) {
    out.reshape_zeroed(m.n_rows(), m.n_cols());
    for i in 0..m.n_rows().min(m.n_cols()) {
        out[(i, i)] = 1.0 / m[(i, i)];
    }
}

/// `D B` into a fresh matrix.
fn pre_mult_new(d: Diagonal<'_>, b: &Matrix) -> Result<Matrix> {
    let (rows, inner) = d.conform("pre_mult inner dimension", None, Some(b.n_rows()))?;
    let mut out = Matrix::zeros(rows, b.n_cols());
    for i in 0..rows.min(inner) {
        let w = d.value(i);
        for j in 0..b.n_cols() {
            out[(i, j)] = w * b[(i, j)];
        }
    }
    Ok(out)
}

/// Computes `out = D B`.
///
/// # Errors
///
/// Returns an error if the diagonal's column count differs from
/// `b.n_rows()`.
pub fn pre_mult(d: Diagonal<'_>, b: &Matrix, out: &mut Matrix) -> Result<()> {
    let product = pre_mult_new(d, b)?;
    out.set_from(&product);
    Ok(())
}

/// Adds `D B` into the block of `out` at (row, col).
///
/// # Errors
///
/// Returns an error if the operands do not conform or the block does not
/// fit.
pub fn pre_mult_add_block(
    d: Diagonal<'_>,
    b: &Matrix,
    out: &mut Matrix,
    row: usize,
    col: usize,
) -> Result<()> {
    pre_mult_add_block_scaled(1.0, d, b, out, row, col)
}

/// Adds `scale * D B` into the block of `out` at (row, col).
///
/// # Errors
///
/// Returns an error if the operands do not conform or the block does not
/// fit.
pub fn pre_mult_add_block_scaled(
    scale: f64,
    d: Diagonal<'_>,
    b: &Matrix,
    out: &mut Matrix,
    row: usize,
    col: usize,
) -> Result<()> {
    let product = pre_mult_new(d, b)?;
    out.accumulate_block("pre_mult_add_block", scale, &product, row, col)
}

/// Computes `out = A D`.
///
/// # Errors
///
/// Returns an error if the diagonal's row count differs from `a.n_cols()`.
pub fn post_mult(a: &Matrix, d: Diagonal<'_>, out: &mut Matrix) -> Result<()> {
    let (inner, cols) = d.conform("post_mult inner dimension", Some(a.n_cols()), None)?;
    out.reshape_zeroed(a.n_rows(), cols);
    for i in 0..a.n_rows() {
        for j in 0..inner.min(cols) {
            out[(i, j)] = a[(i, j)] * d.value(j);
        }
    }
    Ok(())
}

/// Computes `out = A^T D`.
///
/// # Errors
///
/// Returns an error if the diagonal's row count differs from `a.n_rows()`.
pub fn post_mult_trans_a(a: &Matrix, d: Diagonal<'_>, out: &mut Matrix) -> Result<()> {
    let (inner, cols) = d.conform("post_mult_trans_a inner dimension", Some(a.n_rows()), None)?;
    out.reshape_zeroed(a.n_cols(), cols);
    for i in 0..a.n_cols() {
        for j in 0..inner.min(cols) {
            out[(i, j)] = a[(j, i)] * d.value(j);
        }
    }
    Ok(())
}

/// `J^T W J` into a fresh matrix, computing the upper triangle and
/// mirroring it.
fn inner_new(j: &Matrix, w: Diagonal<'_>) -> Result<Matrix> {
    let tasks = j.n_rows();
    w.conform("mult_inner weight", Some(tasks), Some(tasks))?;
    let n = j.n_cols();
    let mut out = Matrix::zeros(n, n);
    for m in 0..tasks {
        let weight = w.value(m);
        let jm = j.row(m);
        for (r, &jr) in jm.iter().enumerate() {
            let scaled = weight * jr;
            for (c, &jc) in jm.iter().enumerate().skip(r) {
                out[(r, c)] += scaled * jc;
            }
        }
    }
    for r in 0..n {
        for c in 0..r {
            out[(r, c)] = out[(c, r)];
        }
    }
    Ok(out)
}

/// Computes `out = J^T W J`.
///
/// # Errors
///
/// Returns an error unless `W` is square with `j.n_rows()` rows.
pub fn mult_inner(j: &Matrix, w: Diagonal<'_>, out: &mut Matrix) -> Result<()> {
    let product = inner_new(j, w)?;
    out.set_from(&product);
    Ok(())
}

/// Computes `out = J W J^T`.
///
/// # Errors
///
/// Returns an error unless `W` is square with `j.n_cols()` rows.
pub fn mult_outer(j: &Matrix, w: Diagonal<'_>, out: &mut Matrix) -> Result<()> {
    let tasks = j.n_cols();
    w.conform("mult_outer weight", Some(tasks), Some(tasks))?;
    let n = j.n_rows();
    out.reshape_zeroed(n, n);
    for r in 0..n {
        for c in r..n {
            let value: f64 = (0..tasks).map(|m| j[(r, m)] * w.value(m) * j[(c, m)]).sum();
            out[(r, c)] = value;
            out[(c, r)] = value;
        }
    }
    Ok(())
}

/// Computes `out += J^T W J`.
///
/// # Errors
///
/// Returns an error unless `W` conforms and `out` is `j.n_cols()` square.
pub fn mult_add_inner(j: &Matrix, w: Diagonal<'_>, out: &mut Matrix) -> Result<()> {
    mult_add_inner_scaled(1.0, j, w, out)
}

/// Computes `out += scale * J^T W J`.
///
/// # Errors
///
/// Returns an error unless `W` conforms and `out` is `j.n_cols()` square.
pub fn mult_add_inner_scaled(
    scale: f64,
    j: &Matrix,
    w: Diagonal<'_>,
    out: &mut Matrix,
) -> Result<()> {
    let n = j.n_cols();
    if out.shape() != (n, n) {
        return Err(MatrixError::shape_mismatch("mult_add_inner output", (n, n), out.shape()));
    }
    let product = inner_new(j, w)?;
    out.accumulate_block("mult_add_inner", scale, &product, 0, 0)
}

/// Adds `J^T W J` into the block of `out` at (row, col).
///
/// # Errors
///
/// Returns an error if `W` does not conform or the block does not fit.
pub fn mult_add_block_inner(
    j: &Matrix,
    w: Diagonal<'_>,
    out: &mut Matrix,
    row: usize,
    col: usize,
) -> Result<()> {
    mult_add_block_inner_scaled(1.0, j, w, out, row, col)
}

/// Adds `scale * J^T W J` into the block of `out` at (row, col).
///
/// # Errors
///
/// Returns an error if `W` does not conform or the block does not fit.
pub fn mult_add_block_inner_scaled(
    scale: f64,
    j: &Matrix,
    w: Diagonal<'_>,
    out: &mut Matrix,
    row: usize,
    col: usize,
) -> Result<()> {
    let product = inner_new(j, w)?;
    out.accumulate_block("mult_add_block_inner", scale, &product, row, col)
}

/// `op(A) W B` into a fresh matrix, where `op(A)` is `A` or `A^T`.
fn inner_diagonal_new(
    context: &str,
    a: &Matrix,
    trans_a: bool,
    w: Diagonal<'_>,
    b: &Matrix,
) -> Result<Matrix> {
    let (out_rows, a_inner) = if trans_a {
        (a.n_cols(), a.n_rows())
    } else {
        (a.n_rows(), a.n_cols())
    };
    let (p, q) = w.conform(context, Some(a_inner), None)?;
    if q != b.n_rows() {
        return Err(MatrixError::dimension_mismatch(context, q, b.n_rows()));
    }
    let mut out = Matrix::zeros(out_rows, b.n_cols());
    for m in 0..p.min(q) {
        let weight = w.value(m);
        let b_row = b.row(m);
        for i in 0..out_rows {
            let a_im = if trans_a { a[(m, i)] } else { a[(i, m)] };
            let scaled = a_im * weight;
            for (c, bv) in b_row.iter().enumerate() {
                out[(i, c)] += scaled * bv;
            }
        }
    }
    Ok(out)
}

/// Computes `out = A W B`.
///
/// # Errors
///
/// Returns an error unless `W` is `a.n_cols() x b.n_rows()`.
pub fn inner_diagonal_mult(
    a: &Matrix,
    w: Diagonal<'_>,
    b: &Matrix,
    out: &mut Matrix,
) -> Result<()> {
    let product = inner_diagonal_new("inner_diagonal_mult", a, false, w, b)?;
    out.set_from(&product);
    Ok(())
}

/// Computes `out = A^T W B`.
///
/// # Errors
///
/// Returns an error unless `W` is `a.n_rows() x b.n_rows()`.
pub fn inner_diagonal_mult_trans_a(
    a: &Matrix,
    w: Diagonal<'_>,
    b: &Matrix,
    out: &mut Matrix,
) -> Result<()> {
    let product = inner_diagonal_new("inner_diagonal_mult_trans_a", a, true, w, b)?;
    out.set_from(&product);
    Ok(())
}

/// Computes `out += A^T W B`.
///
/// # Errors
///
/// Returns an error if `W` does not conform or `out` is not
/// `a.n_cols() x b.n_cols()`.
pub fn inner_diagonal_mult_add_trans_a(
    a: &Matrix,
    w: Diagonal<'_>,
    b: &Matrix,
    out: &mut Matrix,
) -> Result<()> {
    let expected = (a.n_cols(), b.n_cols());
    if out.shape() != expected {
        return Err(MatrixError::shape_mismatch(
            "inner_diagonal_mult_add_trans_a output",
            expected,
            out.shape(),
        ));
    }
    let product = inner_diagonal_new("inner_diagonal_mult_add_trans_a", a, true, w, b)?;
    out.accumulate_block("inner_diagonal_mult_add_trans_a", 1.0, &product, 0, 0)
}

/// Adds `A^T W B` into the block of `out` at (row, col).
///
/// # Errors
///
/// Returns an error if `W` does not conform or the block does not fit.
pub fn inner_diagonal_mult_add_block_trans_a(
    a: &Matrix,
    w: Diagonal<'_>,
    b: &Matrix,
    out: &mut Matrix,
    row: usize,
    col: usize,
) -> Result<()> {
    inner_diagonal_mult_add_block_trans_a_scaled(1.0, a, w, b, out, row, col)
}

/// Adds `scale * A^T W B` into the block of `out` at (row, col).
///
/// # Errors
///
/// Returns an error if `W` does not conform or the block does not fit.
pub fn inner_diagonal_mult_add_block_trans_a_scaled(
    scale: f64,
    a: &Matrix,
    w: Diagonal<'_>,
    b: &Matrix,
    out: &mut Matrix,
    row: usize,
    col: usize,
) -> Result<()> {
    let product = inner_diagonal_new("inner_diagonal_mult_add_block_trans_a", a, true, w, b)?;
    out.accumulate_block("inner_diagonal_mult_add_block_trans_a", scale, &product, row, col)
}

#[cfg(test)]
#[path = "diagonal_tests.rs"]
mod tests;
