//! Block insertion, extraction and filling.

use std::ops::Range;

use super::products::check_block;
use super::Matrix;
use crate::error::{MatrixError, Result};

fn check_range(context: &str, range: &Range<usize>, len: usize) -> Result<()> {
    if range.start > range.end || range.end > len {
        return Err(MatrixError::invalid(format!(
            "{context}: range {}..{} outside 0..{len}",
            range.start, range.end
        )));
    }
    Ok(())
}

/// Copies `scale` times a block of `src` into `dst` at (dst_row, dst_col).
#[allow(clippy::too_many_arguments)]
fn copy_block(
    context: &str,
    src: &Matrix,
    rows: &Range<usize>,
    cols: &Range<usize>,
    dst: &mut Matrix,
    dst_row: usize,
    dst_col: usize,
    scale: f64,
) -> Result<()> {
    check_range(context, rows, src.rows)?;
    check_range(context, cols, src.cols)?;
    let (n_rows, n_cols) = (rows.len(), cols.len());
    check_block(context, dst.shape(), dst_row, dst_col, n_rows, n_cols)?;
    for i in 0..n_rows {
        let from = &src.data[(rows.start + i) * src.cols + cols.start..][..n_cols];
        let to = &mut dst.data[(dst_row + i) * dst.cols + dst_col..][..n_cols];
        if scale == 1.0 {
            to.copy_from_slice(from);
        } else {
            for (o, v) in to.iter_mut().zip(from) {
                *o = scale * v;
            }
        }
    }
    Ok(())
}

impl Matrix {
    /// Copies the block `src[src_rows, src_cols]` into `self` at
    /// (dst_row, dst_col).
    ///
    /// # Errors
    ///
    /// Returns an error if a range is reversed or exceeds `src`, or the
    /// block does not fit in `self`.
    ///
    /// # Examples
    ///
    /// ```
    /// use matrixlib::Matrix;
    ///
    /// let src = Matrix::from_vec(2, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
    /// let mut dst = Matrix::zeros(3, 3);
    /// dst.insert(&src, 1..2, 0..2, 0, 1).unwrap();
    /// assert_eq!(dst.row(0), &[0.0, 3.0, 4.0]);
    /// ```
    pub fn insert(
        &mut self,
        src: &Matrix,
        src_rows: Range<usize>,
        src_cols: Range<usize>,
        dst_row: usize,
        dst_col: usize,
    ) -> Result<()> {
        copy_block("insert", src, &src_rows, &src_cols, self, dst_row, dst_col, 1.0)
    }

    /// Copies all of `src` into `self` at (dst_row, dst_col).
    ///
    /// # Errors
    ///
    /// Returns an error if `src` does not fit in `self` at that position.
    pub fn insert_all(&mut self, src: &Matrix, dst_row: usize, dst_col: usize) -> Result<()> {
        copy_block(
            "insert_all",
            src,
            &(0..src.rows),
            &(0..src.cols),
            self,
            dst_row,
            dst_col,
            1.0,
        )
    }

    /// Like [`insert`](Self::insert), scaling the copied values.
    ///
    /// # Errors
    ///
    /// Same as [`insert`](Self::insert).
    pub fn insert_scaled(
        &mut self,
        src: &Matrix,
        src_rows: Range<usize>,
        src_cols: Range<usize>,
        dst_row: usize,
        dst_col: usize,
        scale: f64,
    ) -> Result<()> {
        copy_block("insert_scaled", src, &src_rows, &src_cols, self, dst_row, dst_col, scale)
    }

    /// Like [`insert_all`](Self::insert_all), scaling the copied values.
    ///
    /// # Errors
    ///
    /// Same as [`insert_all`](Self::insert_all).
    pub fn insert_all_scaled(
        &mut self,
        src: &Matrix,
        dst_row: usize,
        dst_col: usize,
        scale: f64,
    ) -> Result<()> {
        copy_block(
            "insert_all_scaled",
            src,
            &(0..src.rows),
            &(0..src.cols),
            self,
            dst_row,
            dst_col,
            scale,
        )
    }

    /// Writes a 3x3 block at (row, col).
    ///
    /// # Errors
    ///
    /// Returns an error if the block does not fit.
    pub fn insert_3x3(&mut self, row: usize, col: usize, block: &[[f64; 3]; 3]) -> Result<()> {
        self.insert_3x3_scaled(row, col, block, 1.0)
    }

    /// Writes `scale` times a 3x3 block at (row, col).
    ///
    /// # Errors
    ///
    /// Returns an error if the block does not fit.
    pub fn insert_3x3_scaled(
        &mut self,
        row: usize,
        col: usize,
        block: &[[f64; 3]; 3],
        scale: f64,
    ) -> Result<()> {
        check_block("insert_3x3", self.shape(), row, col, 3, 3)?;
        for (i, values) in block.iter().enumerate() {
            for (j, v) in values.iter().enumerate() {
                *self.at_mut(row + i, col + j) = scale * v;
            }
        }
        Ok(())
    }

    /// Writes a 3-tuple as a row segment starting at (row, col).
    ///
    /// # Errors
    ///
    /// Returns an error if the segment does not fit.
    pub fn insert_tuple_row(&mut self, row: usize, col: usize, tuple: [f64; 3]) -> Result<()> {
        check_block("insert_tuple_row", self.shape(), row, col, 1, 3)?;
        let start = row * self.cols + col;
        self.data[start..start + 3].copy_from_slice(&tuple);
        Ok(())
    }

    /// Copies the block `self[src_rows, src_cols]` into `dst` at
    /// (dst_row, dst_col).
    ///
    /// # Errors
    ///
    /// Same as [`insert`](Self::insert), with the roles of source and
    /// destination swapped.
    pub fn extract(
        &self,
        src_rows: Range<usize>,
        src_cols: Range<usize>,
        dst: &mut Matrix,
        dst_row: usize,
        dst_col: usize,
    ) -> Result<()> {
        copy_block("extract", self, &src_rows, &src_cols, dst, dst_row, dst_col, 1.0)
    }

    /// Copies all of `self` into `dst` at (dst_row, dst_col).
    ///
    /// # Errors
    ///
    /// Returns an error if `self` does not fit in `dst` at that position.
    pub fn extract_all(&self, dst: &mut Matrix, dst_row: usize, dst_col: usize) -> Result<()> {
        dst.insert_all(self, dst_row, dst_col)
    }

    /// Sets `size` diagonal entries starting at (row, col) to `value`.
    ///
    /// # Errors
    ///
    /// Returns an error if the diagonal runs past the matrix.
    pub fn fill_diagonal(&mut self, row: usize, col: usize, size: usize, value: f64) -> Result<()> {
        check_block("fill_diagonal", self.shape(), row, col, size, size)?;
        for i in 0..size {
            *self.at_mut(row + i, col + i) = value;
        }
        Ok(())
    }

    /// Sets every element of a block to `value`.
    ///
    /// # Errors
    ///
    /// Returns an error if the block does not fit.
    pub fn fill_block(
        &mut self,
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
        value: f64,
    ) -> Result<()> {
        check_block("fill_block", self.shape(), row, col, rows, cols)?;
        for i in 0..rows {
            let start = (row + i) * self.cols + col;
            self.data[start..start + cols].fill(value);
        }
        Ok(())
    }
}
