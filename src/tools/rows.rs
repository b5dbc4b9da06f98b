//! Row and column manipulation.
//!
//! Argument order puts the matrix being modified last, matching the rest of
//! the [`tools`](crate::tools) functions that take indices first.

use crate::error::{MatrixError, Result};
use crate::primitives::Matrix;

fn require_row(m: &Matrix, row: usize) -> Result<()> {
    if row >= m.n_rows() {
        return Err(MatrixError::index_out_of_bounds(row, 0, m.shape()));
    }
    Ok(())
}

fn require_col(m: &Matrix, col: usize) -> Result<()> {
    if col >= m.n_cols() {
        return Err(MatrixError::index_out_of_bounds(0, col, m.shape()));
    }
    Ok(())
}

fn require_same_width(context: &str, values: &Matrix, m: &Matrix) -> Result<()> {
    if values.n_cols() != m.n_cols() {
        return Err(MatrixError::dimension_mismatch(context, m.n_cols(), values.n_cols()));
    }
    Ok(())
}

/// Removes row `row`, shrinking `m` by one row.
///
/// # Errors
///
/// Returns [`MatrixError::IndexOutOfBounds`] if `row` is out of range.
pub fn remove_row(m: &mut Matrix, row: usize) -> Result<()> {
    m.remove_row(row)
}

/// Removes column `col`, shrinking `m` by one column.
///
/// # Errors
///
/// Returns [`MatrixError::IndexOutOfBounds`] if `col` is out of range.
pub fn remove_column(m: &mut Matrix, col: usize) -> Result<()> {
    m.remove_column(col)
}

/// Removes every row whose absolute sum is at most `epsilon`.
///
/// A matrix without rows is left untouched.
///
/// # Errors
///
/// See [`remove_zero_rows_in`].
pub fn remove_zero_rows(m: &mut Matrix, epsilon: f64) -> Result<()> {
    match m.n_rows() {
        0 => Ok(()),
        rows => remove_zero_rows_in(m, 0, rows - 1, epsilon),
    }
}

/// Removes the zero rows among `start..=end`.
///
/// A row is zero when `sum_j |m_ij| <= epsilon`.
///
/// # Errors
///
/// Returns [`MatrixError::InvalidArgument`] if `start > end` and
/// [`MatrixError::IndexOutOfBounds`] if `end` is not a row of `m`.
pub fn remove_zero_rows_in(m: &mut Matrix, start: usize, end: usize, epsilon: f64) -> Result<()> {
    if start > end {
        return Err(MatrixError::invalid(format!(
            "start row {start} is greater than end row {end}"
        )));
    }
    require_row(m, end)?;
    for row in (start..=end).rev() {
        let magnitude: f64 = m.row(row).iter().map(|v| v.abs()).sum();
        if magnitude <= epsilon {
            m.remove_row(row)?;
        }
    }
    Ok(())
}

/// Multiplies row `row` by `alpha`.
///
/// # Errors
///
/// Returns [`MatrixError::IndexOutOfBounds`] if `row` is out of range.
pub fn scale_row(alpha: f64, row: usize, m: &mut Matrix) -> Result<()> {
    require_row(m, row)?;
    for j in 0..m.n_cols() {
        m[(row, j)] *= alpha;
    }
    Ok(())
}

/// Multiplies column `col` by `alpha`.
///
/// # Errors
///
/// Returns [`MatrixError::IndexOutOfBounds`] if `col` is out of range.
pub fn scale_column(alpha: f64, col: usize, m: &mut Matrix) -> Result<()> {
    require_col(m, col)?;
    for i in 0..m.n_rows() {
        m[(i, col)] *= alpha;
    }
    Ok(())
}

/// Copies the first row of `values` into row `row` of `m`.
///
/// # Errors
///
/// Returns an error if either row is out of range or the widths differ.
pub fn set_row(values: &Matrix, row: usize, m: &mut Matrix) -> Result<()> {
    set_row_from(0, 1.0, values, row, m)
}

/// Sets row `dest_row` of `m` to `alpha` times row `origin_row` of `values`.
///
/// # Errors
///
/// Returns an error if either row is out of range or the widths differ.
pub fn set_row_from(
    origin_row: usize,
    alpha: f64,
    values: &Matrix,
    dest_row: usize,
    m: &mut Matrix,
) -> Result<()> {
    require_row(m, dest_row)?;
    require_row(values, origin_row)?;
    require_same_width("set_row width", values, m)?;
    for (j, v) in values.row(origin_row).iter().enumerate() {
        m[(dest_row, j)] = alpha * v;
    }
    Ok(())
}

/// Copies row `origin_rows[i]` of `values` into row `dest_rows[i]` of `m`.
///
/// # Errors
///
/// Returns an error if the index lists differ in length or any copy fails.
pub fn set_rows(
    origin_rows: &[usize],
    values: &Matrix,
    dest_rows: &[usize],
    m: &mut Matrix,
) -> Result<()> {
    if origin_rows.len() != dest_rows.len() {
        return Err(MatrixError::dimension_mismatch(
            "set_rows index lists",
            origin_rows.len(),
            dest_rows.len(),
        ));
    }
    for (&origin, &dest) in origin_rows.iter().zip(dest_rows) {
        set_row_from(origin, 1.0, values, dest, m)?;
    }
    Ok(())
}

/// Adds the first row of `values` to row `row` of `m`.
///
/// # Errors
///
/// Returns an error if either row is out of range or the widths differ.
pub fn add_row(values: &Matrix, row: usize, m: &mut Matrix) -> Result<()> {
    add_row_from(0, 1.0, values, row, m)
}

/// Adds `alpha` times row `origin_row` of `values` to row `dest_row` of `m`.
///
/// # Errors
///
/// Returns an error if either row is out of range or the widths differ.
pub fn add_row_from(
    origin_row: usize,
    alpha: f64,
    values: &Matrix,
    dest_row: usize,
    m: &mut Matrix,
) -> Result<()> {
    require_row(m, dest_row)?;
    require_row(values, origin_row)?;
    require_same_width("add_row width", values, m)?;
    for (j, v) in values.row(origin_row).iter().enumerate() {
        m[(dest_row, j)] += alpha * v;
    }
    Ok(())
}

/// Adds row `origin_rows[i]` of `values` to row `dest_rows[i]` of `m`.
///
/// # Errors
///
/// Returns an error if the index lists differ in length or any addition
/// fails.
pub fn add_rows(
    origin_rows: &[usize],
    values: &Matrix,
    dest_rows: &[usize],
    m: &mut Matrix,
) -> Result<()> {
    if origin_rows.len() != dest_rows.len() {
        return Err(MatrixError::dimension_mismatch(
            "add_rows index lists",
            origin_rows.len(),
            dest_rows.len(),
        ));
    }
    for (&origin, &dest) in origin_rows.iter().zip(dest_rows) {
        add_row_from(origin, 1.0, values, dest, m)?;
    }
    Ok(())
}

/// Swaps rows `i` and `j`.
///
/// # Errors
///
/// Returns [`MatrixError::IndexOutOfBounds`] if either row is out of range.
pub fn swap_rows(i: usize, j: usize, m: &mut Matrix) -> Result<()> {
    require_row(m, i)?;
    require_row(m, j)?;
    if i == j {
        return Ok(());
    }
    let cols = m.n_cols();
    let (lo, hi) = (i.min(j), i.max(j));
    let (head, tail) = m.as_mut_slice().split_at_mut(hi * cols);
    head[lo * cols..(lo + 1) * cols].swap_with_slice(&mut tail[..cols]);
    Ok(())
}

/// Swaps columns `i` and `j`.
///
/// # Errors
///
/// Returns [`MatrixError::IndexOutOfBounds`] if either column is out of
/// range.
pub fn swap_columns(i: usize, j: usize, m: &mut Matrix) -> Result<()> {
    require_col(m, i)?;
    require_col(m, j)?;
    let cols = m.n_cols();
    for row in m.as_mut_slice().chunks_exact_mut(cols) {
        row.swap(i, j);
    }
    Ok(())
}

/// Sets row `row` to zero.
///
/// # Errors
///
/// Returns [`MatrixError::IndexOutOfBounds`] if `row` is out of range.
pub fn zero_row(row: usize, m: &mut Matrix) -> Result<()> {
    require_row(m, row)?;
    let cols = m.n_cols();
    m.as_mut_slice()[row * cols..(row + 1) * cols].fill(0.0);
    Ok(())
}

/// Sets column `col` to zero.
///
/// # Errors
///
/// Returns [`MatrixError::IndexOutOfBounds`] if `col` is out of range.
pub fn zero_column(col: usize, m: &mut Matrix) -> Result<()> {
    require_col(m, col)?;
    for i in 0..m.n_rows() {
        m[(i, col)] = 0.0;
    }
    Ok(())
}
