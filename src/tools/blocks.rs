//! Block copies, index gathers and column-major export.

use crate::error::{MatrixError, Result};
use crate::primitives::{check_block, Matrix};

/// Sets a `rows x cols` block of `dest` at (dest_row, dest_col) to `scale`
/// times the block of `src` at (src_row, src_col).
///
/// An empty block is a no-op.
///
/// # Errors
///
/// Returns an error if either block does not fit.
#[allow(clippy::too_many_arguments)]
pub fn set_block(
    dest: &mut Matrix,
    dest_row: usize,
    dest_col: usize,
    src: &Matrix,
    src_row: usize,
    src_col: usize,
    rows: usize,
    cols: usize,
    scale: f64,
) -> Result<()> {
    if rows == 0 || cols == 0 {
        return Ok(());
    }
    dest.insert_scaled(
        src,
        src_row..src_row + rows,
        src_col..src_col + cols,
        dest_row,
        dest_col,
        scale,
    )
}

/// Adds `scale` times a block of `src` into a block of `dest`. Arguments
/// mirror [`set_block`].
///
/// # Errors
///
/// Returns an error if either block does not fit.
#[allow(clippy::too_many_arguments)]
pub fn add_block(
    dest: &mut Matrix,
    dest_row: usize,
    dest_col: usize,
    src: &Matrix,
    src_row: usize,
    src_col: usize,
    rows: usize,
    cols: usize,
    scale: f64,
) -> Result<()> {
    if rows == 0 || cols == 0 {
        return Ok(());
    }
    dest.add_block_scaled(src, dest_row, dest_col, src_row, src_col, rows, cols, scale)
}

/// Gathers `input[rows[i], cols[j]]` into `out[i, j]`.
///
/// # Errors
///
/// Returns an error unless `out` is `rows.len() x cols.len()`, or if an
/// index is out of range for `input`.
pub fn get_block(out: &mut Matrix, input: &Matrix, rows: &[usize], cols: &[usize]) -> Result<()> {
    if out.shape() != (rows.len(), cols.len()) {
        return Err(MatrixError::shape_mismatch(
            "get_block output",
            (rows.len(), cols.len()),
            out.shape(),
        ));
    }
    for (i, &r) in rows.iter().enumerate() {
        for (j, &c) in cols.iter().enumerate() {
            out[(i, j)] = input.get(r, c)?;
        }
    }
    Ok(())
}

/// Copies the listed rows of `source`, in order, into consecutive rows of
/// `dest` starting at `dest_row`.
///
/// # Errors
///
/// Returns an error if a source row is out of range or the rows do not fit
/// in `dest`.
pub fn extract_rows(
    source: &Matrix,
    rows: &[usize],
    dest: &mut Matrix,
    dest_row: usize,
) -> Result<()> {
    for (offset, &row) in rows.iter().enumerate() {
        dest.insert(source, row..row + 1, 0..source.n_cols(), dest_row + offset, 0)?;
    }
    Ok(())
}

/// Copies the listed columns of `source`, in order, into consecutive
/// columns of `dest` starting at `dest_col`.
///
/// # Errors
///
/// Returns an error if a source column is out of range or the columns do
/// not fit in `dest`.
pub fn extract_columns(
    source: &Matrix,
    cols: &[usize],
    dest: &mut Matrix,
    dest_col: usize,
) -> Result<()> {
    for (offset, &col) in cols.iter().enumerate() {
        dest.insert(source, 0..source.n_rows(), col..col + 1, 0, dest_col + offset)?;
    }
    Ok(())
}

/// Copies column `src_cols[i]` of `src` into column `dst_cols[i]` of `dst`.
///
/// # Errors
///
/// Returns [`MatrixError::DimensionMismatch`] if the index lists differ in
/// length, `dst` has fewer rows than `src`, or more columns are requested
/// than `src` has.
pub fn extract_columns_to(
    src: &Matrix,
    src_cols: &[usize],
    dst: &mut Matrix,
    dst_cols: &[usize],
) -> Result<()> {
    let rows = src.n_rows();
    if dst_cols.len() > src.n_cols() {
        return Err(MatrixError::dimension_mismatch(
            "extract_columns_to column count",
            src.n_cols(),
            dst_cols.len(),
        ));
    }
    if dst.n_rows() < rows {
        return Err(MatrixError::dimension_mismatch("extract_columns_to rows", rows, dst.n_rows()));
    }
    if src_cols.len() != dst_cols.len() {
        return Err(MatrixError::dimension_mismatch(
            "extract_columns_to index lists",
            dst_cols.len(),
            src_cols.len(),
        ));
    }
    for (&from, &to) in src_cols.iter().zip(dst_cols) {
        dst.insert(src, 0..rows, from..from + 1, 0, to)?;
    }
    Ok(())
}

/// Gathers `src[indices[i], 0]` into element `i` of the vector `dst`.
///
/// # Errors
///
/// Returns [`MatrixError::InvalidArgument`] if `dst` is not a vector,
/// [`MatrixError::DimensionMismatch`] if it does not hold `indices.len()`
/// elements, and an index error if an index is out of range.
pub fn extract_elements(src: &Matrix, indices: &[usize], dst: &mut Matrix) -> Result<()> {
    if !dst.is_vector() {
        return Err(MatrixError::invalid("extract_elements: destination must be a vector"));
    }
    if dst.num_elements() != indices.len() {
        return Err(MatrixError::dimension_mismatch(
            "extract_elements destination length",
            indices.len(),
            dst.num_elements(),
        ));
    }
    for (i, &index) in indices.iter().enumerate() {
        dst.as_mut_slice()[i] = src.get(index, 0)?;
    }
    Ok(())
}

/// Writes `src` into `dest` in column-major order and returns the number of
/// values written.
///
/// # Errors
///
/// Returns an error if `dest` is too short.
pub fn to_column_major(src: &Matrix, dest: &mut [f64]) -> Result<usize> {
    let (rows, cols) = src.shape();
    to_column_major_block(src, 0, 0, rows, cols, dest, 0)
}

/// Writes the `rows x cols` block of `src` at (src_row, src_col) into
/// `dest[dest_start..]` in column-major order. Returns the number of values
/// written.
///
/// # Errors
///
/// Returns an error if the block does not fit in `src` or `dest` is too
/// short.
pub fn to_column_major_block(
    src: &Matrix,
    src_row: usize,
    src_col: usize,
    rows: usize,
    cols: usize,
    dest: &mut [f64],
    dest_start: usize,
) -> Result<usize> {
    check_block("to_column_major_block", src.shape(), src_row, src_col, rows, cols)?;
    let count = rows * cols;
    let dest_len = dest.len();
    let out = dest.get_mut(dest_start..dest_start + count).ok_or_else(|| {
        MatrixError::dimension_mismatch("column-major destination", dest_start + count, dest_len)
    })?;
    let positions =
        (src_col..src_col + cols).flat_map(|j| (src_row..src_row + rows).map(move |i| (i, j)));
    for (slot, (i, j)) in out.iter_mut().zip(positions) {
        *slot = src[(i, j)];
    }
    Ok(count)
}
