//! Assorted matrix utilities.
//!
//! - Filling, diagonal and query helpers (this module)
//! - Products that tolerate empty operands or target a block
//! - [`blocks`]: block copies, gathers and column-major export
//! - [`rows`]: row and column manipulation
//! - [`spatial`]: 3D helpers (skew-symmetric matrices, outer products)
//! - [`field`]: [`MatrixField`] for matrices embedded in config files

pub mod blocks;
pub mod field;
pub mod rows;
pub mod spatial;

pub use blocks::{
    add_block, extract_columns, extract_columns_to, extract_elements, extract_rows, get_block,
    set_block, to_column_major, to_column_major_block,
};
pub use field::MatrixField;
pub use rows::{
    add_row, add_row_from, add_rows, remove_column, remove_row, remove_zero_rows,
    remove_zero_rows_in, scale_column, scale_row, set_row, set_row_from, set_rows, swap_columns,
    swap_rows, zero_column, zero_row,
};
pub use spatial::{
    mult_outer3, mult_tuple3, mult_tuple4, set_diagonal3, skew_symmetric, tilde_times_tilde,
    vector_to_skew_symmetric,
};

use crate::config::SolverConfig;
use crate::error::{MatrixError, Result};
use crate::primitives::{check_block, Matrix};

/// Sets every element to `NaN`.
pub fn set_to_nan(m: &mut Matrix) {
    m.fill(f64::NAN);
}

/// Sets every element to zero.
pub fn set_to_zero(m: &mut Matrix) {
    m.zero();
}

/// Returns `true` if any element is `NaN`.
#[must_use]
pub fn contains_nan(m: &Matrix) -> bool {
    m.contains_nan()
}

/// Sets every element of column `col` to `value`.
///
/// # Errors
///
/// Returns [`MatrixError::IndexOutOfBounds`] if `col` is out of range.
pub fn fill_column(m: &mut Matrix, col: usize, value: f64) -> Result<()> {
    if col >= m.n_cols() {
        return Err(MatrixError::index_out_of_bounds(0, col, m.shape()));
    }
    for i in 0..m.n_rows() {
        m[(i, col)] = value;
    }
    Ok(())
}

/// Zeroes `m` and sets its main diagonal to `value`.
pub fn set_diagonal(m: &mut Matrix, value: f64) {
    m.zero();
    add_diagonal(m, value);
}

/// Adds `value` to each element of the main diagonal.
pub fn add_diagonal(m: &mut Matrix, value: f64) {
    for i in 0..m.n_rows().min(m.n_cols()) {
        m[(i, i)] += value;
    }
}

/// Returns the main diagonal.
#[must_use]
pub fn extract_diagonal(m: &Matrix) -> Vec<f64> {
    (0..m.n_rows().min(m.n_cols())).map(|i| m[(i, i)]).collect()
}

fn check_product_target(context: &str, a: &Matrix, b: &Matrix, c: &Matrix) -> Result<()> {
    if c.shape() != (a.n_rows(), b.n_cols()) {
        return Err(MatrixError::shape_mismatch(
            context,
            (a.n_rows(), b.n_cols()),
            c.shape(),
        ));
    }
    if a.n_cols() != b.n_rows() {
        return Err(MatrixError::dimension_mismatch(
            "inner dimension",
            a.n_cols(),
            b.n_rows(),
        ));
    }
    Ok(())
}

/// Computes `c = a * b` where the inner dimension may be zero.
///
/// `c` must already be `a.n_rows() x b.n_cols()`. An empty inner dimension
/// zeroes `c`.
///
/// # Errors
///
/// Returns an error if `c` has the wrong shape or the operands do not
/// conform.
pub fn mult_allow_empty(a: &Matrix, b: &Matrix, c: &mut Matrix) -> Result<()> {
    check_product_target("mult_allow_empty", a, b, c)?;
    if a.n_cols() == 0 {
        c.zero();
        return Ok(());
    }
    c.mult(a, b)
}

/// Computes `c += a * b` where any dimension may be zero.
///
/// # Errors
///
/// Returns an error if `c` has the wrong shape or the operands do not
/// conform.
pub fn mult_add_allow_empty(a: &Matrix, b: &Matrix, c: &mut Matrix) -> Result<()> {
    check_product_target("mult_add_allow_empty", a, b, c)?;
    if a.n_rows() == 0 || b.n_cols() == 0 || a.n_cols() == 0 {
        return Ok(());
    }
    c.mult_add(a, b)
}

/// Returns `a^T g a` as a new matrix.
///
/// # Errors
///
/// Returns an error if `g` is not square with `a.n_rows()` rows.
pub fn mult_quad_new(a: &Matrix, g: &Matrix) -> Result<Matrix> {
    let mut out = Matrix::default();
    out.mult_quad(a, g)?;
    Ok(out)
}

/// Returns `a * b` as a new matrix.
///
/// # Errors
///
/// Returns an error if the operands do not conform.
pub fn mult_new(a: &Matrix, b: &Matrix) -> Result<Matrix> {
    let mut out = Matrix::default();
    out.mult(a, b)?;
    Ok(out)
}

/// Dot product of row `row` of `a` with the column vector `b`.
///
/// # Errors
///
/// Returns an error if `b` is not an `a.n_cols() x 1` column or `row` is out
/// of range.
pub fn mult_matrix_row_vector(a: &Matrix, row: usize, b: &Matrix) -> Result<f64> {
    if b.shape() != (a.n_cols(), 1) {
        return Err(MatrixError::shape_mismatch(
            "mult_matrix_row_vector",
            (a.n_cols(), 1),
            b.shape(),
        ));
    }
    if row >= a.n_rows() {
        return Err(MatrixError::index_out_of_bounds(row, 0, a.shape()));
    }
    Ok(a.row(row).iter().zip(b.as_slice()).map(|(x, y)| x * y).sum())
}

/// Adds `a * b` into the block of `c` at (row, col).
///
/// # Errors
///
/// Returns an error if the operands do not conform or the block does not
/// fit.
pub fn mult_add_block(
    a: &Matrix,
    b: &Matrix,
    c: &mut Matrix,
    row: usize,
    col: usize,
) -> Result<()> {
    c.mult_add_block(a, b, row, col)
}

/// Adds `scalar * a * b` into the block of `c` at (row, col).
///
/// # Errors
///
/// Returns an error if the operands do not conform or the block does not
/// fit.
pub fn mult_add_block_scaled(
    scalar: f64,
    a: &Matrix,
    b: &Matrix,
    c: &mut Matrix,
    row: usize,
    col: usize,
) -> Result<()> {
    c.mult_add_block_scaled(scalar, a, b, row, col)
}

/// Adds `a^T * b` into the block of `c` at (row, col).
///
/// # Errors
///
/// Returns an error if `a.n_rows() != b.n_rows()` or the block does not fit.
pub fn mult_add_block_trans_a(
    a: &Matrix,
    b: &Matrix,
    c: &mut Matrix,
    row: usize,
    col: usize,
) -> Result<()> {
    mult_add_block_trans_a_scaled(1.0, a, b, c, row, col)
}

/// Adds `scalar * a^T * b` into the block of `c` at (row, col).
///
/// # Errors
///
/// Returns an error if `a.n_rows() != b.n_rows()` or the block does not fit.
pub fn mult_add_block_trans_a_scaled(
    scalar: f64,
    a: &Matrix,
    b: &Matrix,
    c: &mut Matrix,
    row: usize,
    col: usize,
) -> Result<()> {
    let mut product = Matrix::default();
    product.mult_trans_a(a, b)?;
    let (rows, cols) = product.shape();
    c.add_block_scaled(&product, row, col, 0, 0, rows, cols, scalar)
}

/// Sums `scalar * b^T b` into the `n x n` block of `c` at (row, col), where
/// `n = b.n_cols()`. Only the upper triangle is computed and mirrored.
fn mult_add_inner_at(scalar: f64, b: &Matrix, c: &mut Matrix, row: usize, col: usize) {
    let n = b.n_cols();
    for i in 0..n {
        for j in i..n {
            let dot: f64 = (0..b.n_rows()).map(|k| b[(k, i)] * b[(k, j)]).sum();
            let value = scalar * dot;
            c[(row + i, col + j)] += value;
            if i != j {
                c[(row + j, col + i)] += value;
            }
        }
    }
}

/// Computes `c += scalar * b^T b`.
///
/// # Errors
///
/// Returns an error unless `c` is `b.n_cols()` square.
pub fn mult_add_inner(scalar: f64, b: &Matrix, c: &mut Matrix) -> Result<()> {
    let n = b.n_cols();
    if c.shape() != (n, n) {
        return Err(MatrixError::shape_mismatch("mult_add_inner", (n, n), c.shape()));
    }
    mult_add_inner_at(scalar, b, c, 0, 0);
    Ok(())
}

/// Adds `scalar * b^T b` into the block of `c` at (row, col).
///
/// # Errors
///
/// Returns an error if the `b.n_cols()` square block does not fit.
pub fn mult_add_block_inner(
    scalar: f64,
    b: &Matrix,
    c: &mut Matrix,
    row: usize,
    col: usize,
) -> Result<()> {
    let n = b.n_cols();
    check_block("mult_add_block_inner", c.shape(), row, col, n, n)?;
    mult_add_inner_at(scalar, b, c, row, col);
    Ok(())
}

/// Computes `b = alpha * a^T`, reshaping `b`.
pub fn scale_transpose(alpha: f64, a: &Matrix, b: &mut Matrix) {
    b.set_transpose(a);
    b.scale(alpha);
}

/// Index of the first maximum of `values[start..end]`.
///
/// Returns `None` if the range is empty, out of bounds, or holds no value
/// above negative infinity.
#[must_use]
pub fn find_max_element_index(values: &[f64], start: usize, end: usize) -> Option<usize> {
    let slice = values.get(start..end)?;
    let mut best: Option<(usize, f64)> = None;
    for (offset, &v) in slice.iter().enumerate() {
        let current = best.map_or(f64::NEG_INFINITY, |(_, b)| b);
        if v > current {
            best = Some((start + offset, v));
        }
    }
    best.map(|(index, _)| index)
}

/// Copies `values[start_row..start_row + len]` into the same rows of column
/// `col`.
///
/// # Errors
///
/// Returns an error if `values` is too short, the matrix has fewer than
/// `start_row + len` rows, or `col` is out of range.
pub fn set_column_from_slice(
    m: &mut Matrix,
    col: usize,
    values: &[f64],
    start_row: usize,
    len: usize,
) -> Result<()> {
    if len == 0 {
        return Ok(());
    }
    let end = start_row + len;
    if values.len() < end {
        return Err(MatrixError::dimension_mismatch("column values length", end, values.len()));
    }
    if m.n_rows() < end {
        return Err(MatrixError::dimension_mismatch("matrix rows", end, m.n_rows()));
    }
    if col >= m.n_cols() {
        return Err(MatrixError::index_out_of_bounds(start_row, col, m.shape()));
    }
    for (i, &v) in values.iter().enumerate().take(end).skip(start_row) {
        m[(i, col)] = v;
    }
    Ok(())
}

fn check_diff(
    context: &str,
    source_len: usize,
    start_row: usize,
    n_rows: usize,
    out: &Matrix,
) -> Result<()> {
    if out.n_cols() != 1 {
        return Err(MatrixError::invalid(format!("{context}: output is not a column vector")));
    }
    if start_row + n_rows > source_len {
        return Err(MatrixError::dimension_mismatch(context, start_row + n_rows, source_len));
    }
    if out.n_rows() + 1 < n_rows {
        return Err(MatrixError::dimension_mismatch(
            "diff output rows",
            n_rows.saturating_sub(1),
            out.n_rows(),
        ));
    }
    Ok(())
}

/// Writes the `n_rows - 1` forward differences of a column vector segment
/// into the leading rows of `out`.
///
/// # Errors
///
/// Returns an error if either operand is not a column vector or the segment
/// does not fit.
pub fn diff(vector: &Matrix, start_row: usize, n_rows: usize, out: &mut Matrix) -> Result<()> {
    if vector.n_cols() != 1 {
        return Err(MatrixError::invalid("diff: input is not a column vector"));
    }
    diff_slice(vector.as_slice(), start_row, n_rows, out)
}

/// Slice form of [`diff`].
///
/// # Errors
///
/// Returns an error if `out` is not a column vector or the segment does not
/// fit.
pub fn diff_slice(values: &[f64], start_row: usize, n_rows: usize, out: &mut Matrix) -> Result<()> {
    check_diff("diff", values.len(), start_row, n_rows, out)?;
    for i in 1..n_rows {
        out[(i - 1, 0)] = values[start_row + i] - values[start_row + i - 1];
    }
    Ok(())
}

/// Computes `derivative = (new - previous) / dt`, then stores `new` into
/// `previous`.
///
/// # Errors
///
/// Returns an error if `previous` and `new` differ in shape.
pub fn numerically_differentiate(
    derivative: &mut Matrix,
    previous: &mut Matrix,
    new: &Matrix,
    dt: f64,
) -> Result<()> {
    derivative.subtract(new, previous)?;
    derivative.scale(1.0 / dt);
    previous.set_from(new);
    Ok(())
}

/// Checks that `m` is `rows x cols`.
///
/// # Errors
///
/// Returns [`MatrixError::DimensionMismatch`] otherwise.
pub fn check_dimensions(m: &Matrix, rows: usize, cols: usize) -> Result<()> {
    if m.shape() != (rows, cols) {
        return Err(MatrixError::DimensionMismatch {
            expected: format!("({rows}, {cols})"),
            actual: format!("({}, {})", m.n_rows(), m.n_cols()),
        });
    }
    Ok(())
}

/// Bitwise equality: same shape and every pair of elements compares equal
/// under [`f64::total_cmp`]. `NaN` equals `NaN`, `0.0` differs from `-0.0`.
#[must_use]
pub fn exact_equals(a: &Matrix, b: &Matrix) -> bool {
    a.shape() == b.shape()
        && a
            .as_slice()
            .iter()
            .zip(b.as_slice())
            .all(|(x, y)| x.total_cmp(y).is_eq())
}

/// Renders Rust source that rebuilds `m` under the variable name `name`.
///
/// ```
/// use matrixlib::tools::to_construction_snippet;
/// use matrixlib::Matrix;
///
/// let m = Matrix::from_vec(1, 2, vec![1.0, -0.5]).unwrap();
/// let snippet = to_construction_snippet("jacobian", &m);
/// assert!(snippet.contains("let jacobian = Matrix::from_rows(&["));
/// assert!(snippet.contains("vec![1.0, -0.5],"));
/// ```
#[must_use]
pub fn to_construction_snippet(name: &str, m: &Matrix) -> String {
    let mut out = format!("let {name} = Matrix::from_rows(&[\n");
    for i in 0..m.n_rows() {
        let row: Vec<String> = m.row(i).iter().map(|&v| rust_literal(v)).collect();
        out.push_str(&format!("    vec![{}],\n", row.join(", ")));
    }
    out.push_str("])?;");
    out
}

/// `v` as a Rust expression of type `f64`.
fn rust_literal(v: f64) -> String {
    if v.is_nan() {
        "f64::NAN".to_owned()
    } else if v == f64::INFINITY {
        "f64::INFINITY".to_owned()
    } else if v == f64::NEG_INFINITY {
        "f64::NEG_INFINITY".to_owned()
    } else {
        format!("{v:?}")
    }
}

/// Formats `m` with `precision` digits.
#[must_use]
pub fn to_formatted_string(m: &Matrix, precision: usize) -> String {
    m.to_string_with(&SolverConfig::new().with_display_precision(precision))
}

#[cfg(test)]
#[path = "tools_tests.rs"]
mod tests;
