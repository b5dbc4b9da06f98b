//! Products and block arithmetic for [`Matrix`].

use super::Matrix;
use crate::error::{MatrixError, Result};

/// Shape of `m` or of `m^T`.
fn op_shape(m: &Matrix, trans: bool) -> (usize, usize) {
    if trans {
        (m.cols, m.rows)
    } else {
        (m.rows, m.cols)
    }
}

#[inline]
fn op_at(m: &Matrix, trans: bool, i: usize, j: usize) -> f64 {
    if trans {
        m.data[j * m.cols + i]
    } else {
        m.data[i * m.cols + j]
    }
}

/// Checks that `op(a) * op(b)` is defined and returns its `(m, k, n)`.
fn product_dims(
    context: &str,
    a: &Matrix,
    trans_a: bool,
    b: &Matrix,
    trans_b: bool,
) -> Result<(usize, usize, usize)> {
    let (m, k) = op_shape(a, trans_a);
    let (kb, n) = op_shape(b, trans_b);
    if k != kb {
        return Err(MatrixError::DimensionMismatch {
            expected: format!("{context}: inner dimension {k}"),
            actual: format!("{kb}"),
        });
    }
    Ok((m, k, n))
}

/// Operands of a product `scale * op(a) * op(b)`.
#[derive(Clone, Copy)]
struct Product<'a> {
    scale: f64,
    a: &'a Matrix,
    trans_a: bool,
    b: &'a Matrix,
    trans_b: bool,
}

impl Product<'_> {
    /// Writes the product into the block of `dst` at (row, col), adding to
    /// its contents when `accumulate` is set. Shapes must already be checked.
    fn write_into(self, dst: &mut Matrix, row: usize, col: usize, accumulate: bool) {
        let (m, k) = op_shape(self.a, self.trans_a);
        let n = op_shape(self.b, self.trans_b).1;
        let (a, b, scale) = (self.a, self.b, self.scale);
        let stride = dst.cols;
        for i in 0..m {
            let out = &mut dst.data[(row + i) * stride + col..][..n];
            if !accumulate {
                out.fill(0.0);
            }
            if self.trans_b {
                for (j, o) in out.iter_mut().enumerate() {
                    let brow = &b.data[j * b.cols..][..k];
                    let dot: f64 = brow
                        .iter()
                        .enumerate()
                        .map(|(p, bv)| op_at(a, self.trans_a, i, p) * bv)
                        .sum();
                    *o += scale * dot;
                }
            } else {
                for p in 0..k {
                    let s = scale * op_at(a, self.trans_a, i, p);
                    let brow = &b.data[p * b.cols..][..n];
                    for (o, bv) in out.iter_mut().zip(brow) {
                        *o += s * bv;
                    }
                }
            }
        }
    }
}

/// Checks that a `rows x cols` block at (row, col) lies inside `shape`.
pub(crate) fn check_block(
    context: &str,
    shape: (usize, usize),
    row: usize,
    col: usize,
    rows: usize,
    cols: usize,
) -> Result<()> {
    let fits_rows = row.checked_add(rows).is_some_and(|end| end <= shape.0);
    let fits_cols = col.checked_add(cols).is_some_and(|end| end <= shape.1);
    if !(fits_rows && fits_cols) {
        return Err(MatrixError::DimensionMismatch {
            expected: format!("{context}: {rows}x{cols} block at ({row}, {col})"),
            actual: format!("{}x{} matrix", shape.0, shape.1),
        });
    }
    Ok(())
}

impl Matrix {
    /// Overwrites `self` with a product, reshaping it in place.
    fn assign_product(&mut self, context: &str, product: Product<'_>) -> Result<()> {
        let (m, _, n) =
            product_dims(context, product.a, product.trans_a, product.b, product.trans_b)?;
        self.reshape_zeroed(m, n);
        product.write_into(self, 0, 0, true);
        Ok(())
    }

    /// Adds a product into the block of `self` at (row, col).
    fn accumulate_product(
        &mut self,
        context: &str,
        product: Product<'_>,
        row: usize,
        col: usize,
    ) -> Result<()> {
        let (m, _, n) =
            product_dims(context, product.a, product.trans_a, product.b, product.trans_b)?;
        check_block(context, self.shape(), row, col, m, n)?;
        product.write_into(self, row, col, true);
        Ok(())
    }

    /// Adds a product into `self`, which must already have its shape.
    fn accumulate_full(&mut self, context: &str, product: Product<'_>) -> Result<()> {
        let (m, _, n) =
            product_dims(context, product.a, product.trans_a, product.b, product.trans_b)?;
        self.require_shape(context, (m, n))?;
        product.write_into(self, 0, 0, true);
        Ok(())
    }

    /// Adds `scale * src` into the block of `self` starting at (row, col).
    pub(crate) fn accumulate_block(
        &mut self,
        context: &str,
        scale: f64,
        src: &Matrix,
        row: usize,
        col: usize,
    ) -> Result<()> {
        check_block(context, self.shape(), row, col, src.rows, src.cols)?;
        for i in 0..src.rows {
            let dst = &mut self.data[(row + i) * self.cols + col..][..src.cols];
            for (o, v) in dst.iter_mut().zip(src.row(i)) {
                *o += scale * v;
            }
        }
        Ok(())
    }

    /// Computes `self = a * b`.
    ///
    /// # Errors
    ///
    /// Returns an error if `a.n_cols() != b.n_rows()`.
    pub fn mult(&mut self, a: &Matrix, b: &Matrix) -> Result<()> {
        self.mult_scaled(1.0, a, b)
    }

    /// Computes `self = scale * a * b`.
    ///
    /// # Errors
    ///
    /// Returns an error if `a.n_cols() != b.n_rows()`.
    pub fn mult_scaled(&mut self, scale: f64, a: &Matrix, b: &Matrix) -> Result<()> {
        let product = Product { scale, a, trans_a: false, b, trans_b: false };
        self.assign_product("mult", product)
    }

    /// Computes `self = a^T * b`.
    ///
    /// # Errors
    ///
    /// Returns an error if `a.n_rows() != b.n_rows()`.
    pub fn mult_trans_a(&mut self, a: &Matrix, b: &Matrix) -> Result<()> {
        self.mult_trans_a_scaled(1.0, a, b)
    }

    /// Computes `self = scale * a^T * b`.
    ///
    /// # Errors
    ///
    /// Returns an error if `a.n_rows() != b.n_rows()`.
    pub fn mult_trans_a_scaled(&mut self, scale: f64, a: &Matrix, b: &Matrix) -> Result<()> {
        let product = Product { scale, a, trans_a: true, b, trans_b: false };
        self.assign_product("mult_trans_a", product)
    }

    /// Computes `self = a * b^T`.
    ///
    /// # Errors
    ///
    /// Returns an error if `a.n_cols() != b.n_cols()`.
    pub fn mult_trans_b(&mut self, a: &Matrix, b: &Matrix) -> Result<()> {
        self.mult_trans_b_scaled(1.0, a, b)
    }

    /// Computes `self = scale * a * b^T`.
    ///
    /// # Errors
    ///
    /// Returns an error if `a.n_cols() != b.n_cols()`.
    pub fn mult_trans_b_scaled(&mut self, scale: f64, a: &Matrix, b: &Matrix) -> Result<()> {
        let product = Product { scale, a, trans_a: false, b, trans_b: true };
        self.assign_product("mult_trans_b", product)
    }

    /// Computes `self += a * b`.
    ///
    /// # Errors
    ///
    /// Returns an error if the operands do not conform or `self` does not
    /// already have the product's shape.
    pub fn mult_add(&mut self, a: &Matrix, b: &Matrix) -> Result<()> {
        self.mult_add_scaled(1.0, a, b)
    }

    /// Computes `self += scale * a * b`.
    ///
    /// # Errors
    ///
    /// Same as [`mult_add`](Self::mult_add).
    pub fn mult_add_scaled(&mut self, scale: f64, a: &Matrix, b: &Matrix) -> Result<()> {
        let product = Product { scale, a, trans_a: false, b, trans_b: false };
        self.accumulate_full("mult_add", product)
    }

    /// Computes `self += a^T * b`.
    ///
    /// # Errors
    ///
    /// Same as [`mult_add`](Self::mult_add).
    pub fn mult_add_trans_a(&mut self, a: &Matrix, b: &Matrix) -> Result<()> {
        self.mult_add_trans_a_scaled(1.0, a, b)
    }

    /// Computes `self += scale * a^T * b`.
    ///
    /// # Errors
    ///
    /// Same as [`mult_add`](Self::mult_add).
    pub fn mult_add_trans_a_scaled(&mut self, scale: f64, a: &Matrix, b: &Matrix) -> Result<()> {
        let product = Product { scale, a, trans_a: true, b, trans_b: false };
        self.accumulate_full("mult_add_trans_a", product)
    }

    /// Computes `self += a * b^T`.
    ///
    /// # Errors
    ///
    /// Same as [`mult_add`](Self::mult_add).
    pub fn mult_add_trans_b(&mut self, a: &Matrix, b: &Matrix) -> Result<()> {
        self.mult_add_trans_b_scaled(1.0, a, b)
    }

    /// Computes `self += scale * a * b^T`.
    ///
    /// # Errors
    ///
    /// Same as [`mult_add`](Self::mult_add).
    pub fn mult_add_trans_b_scaled(&mut self, scale: f64, a: &Matrix, b: &Matrix) -> Result<()> {
        let product = Product { scale, a, trans_a: false, b, trans_b: true };
        self.accumulate_full("mult_add_trans_b", product)
    }

    /// Adds `a * b` into the block of `self` starting at (row, col).
    ///
    /// # Errors
    ///
    /// Returns an error if the operands do not conform or the product does
    /// not fit in `self` at that position.
    pub fn mult_add_block(&mut self, a: &Matrix, b: &Matrix, row: usize, col: usize) -> Result<()> {
        self.mult_add_block_scaled(1.0, a, b, row, col)
    }

    /// Adds `scale * a * b` into the block of `self` starting at (row, col).
    ///
    /// # Errors
    ///
    /// Same as [`mult_add_block`](Self::mult_add_block).
    pub fn mult_add_block_scaled(
        &mut self,
        scale: f64,
        a: &Matrix,
        b: &Matrix,
        row: usize,
        col: usize,
    ) -> Result<()> {
        let product = Product { scale, a, trans_a: false, b, trans_b: false };
        self.accumulate_product("mult_add_block", product, row, col)
    }

    /// Adds a block of `a` into a block of `self`.
    ///
    /// The `rows x cols` block of `a` at (src_row, src_col) is added to the
    /// block of `self` at (dest_row, dest_col).
    ///
    /// # Errors
    ///
    /// Returns an error if either block does not fit in its matrix.
    #[allow(clippy::too_many_arguments)]
    pub fn add_block(
        &mut self,
        a: &Matrix,
        dest_row: usize,
        dest_col: usize,
        src_row: usize,
        src_col: usize,
        rows: usize,
        cols: usize,
    ) -> Result<()> {
        self.add_block_scaled(a, dest_row, dest_col, src_row, src_col, rows, cols, 1.0)
    }

    /// Adds `scale` times a block of `a` into a block of `self`.
    ///
    /// # Errors
    ///
    /// Returns an error if either block does not fit in its matrix.
    #[allow(clippy::too_many_arguments)]
    pub fn add_block_scaled(
        &mut self,
        a: &Matrix,
        dest_row: usize,
        dest_col: usize,
        src_row: usize,
        src_col: usize,
        rows: usize,
        cols: usize,
        scale: f64,
    ) -> Result<()> {
        check_block("add_block source", a.shape(), src_row, src_col, rows, cols)?;
        check_block("add_block destination", self.shape(), dest_row, dest_col, rows, cols)?;
        for i in 0..rows {
            let src = &a.data[(src_row + i) * a.cols + src_col..][..cols];
            let dst = &mut self.data[(dest_row + i) * self.cols + dest_col..][..cols];
            for (o, v) in dst.iter_mut().zip(src) {
                *o += scale * v;
            }
        }
        Ok(())
    }

    /// Subtracts a block of `a` from a block of `self`.
    ///
    /// # Errors
    ///
    /// Returns an error if either block does not fit in its matrix.
    #[allow(clippy::too_many_arguments)]
    pub fn subtract_block(
        &mut self,
        a: &Matrix,
        dest_row: usize,
        dest_col: usize,
        src_row: usize,
        src_col: usize,
        rows: usize,
        cols: usize,
    ) -> Result<()> {
        self.add_block_scaled(a, dest_row, dest_col, src_row, src_col, rows, cols, -1.0)
    }

    /// Computes `b a` for a square `b` with `b.n_rows() == a.n_rows()`,
    /// the inner factor of `a^T b a`.
    fn quad_inner(context: &str, a: &Matrix, b: &Matrix) -> Result<Matrix> {
        if b.rows != b.cols || b.rows != a.rows {
            return Err(MatrixError::shape_mismatch(context, (a.rows, a.rows), b.shape()));
        }
        let mut ba = Matrix::default();
        ba.mult(b, a)?;
        Ok(ba)
    }

    /// Computes `self = a^T * b * a`.
    ///
    /// `b` must be square with as many rows as `a`. The inner product `b a`
    /// uses a temporary.
    ///
    /// # Errors
    ///
    /// Returns an error if `b` is not `a.n_rows()` square.
    pub fn mult_quad(&mut self, a: &Matrix, b: &Matrix) -> Result<()> {
        let ba = Self::quad_inner("mult_quad", a, b)?;
        self.mult_trans_a(a, &ba)
    }

    /// Computes `self += a^T * b * a`.
    ///
    /// # Errors
    ///
    /// Returns an error if `b` is not `a.n_rows()` square or `self` is not
    /// `a.n_cols()` square.
    pub fn mult_add_quad(&mut self, a: &Matrix, b: &Matrix) -> Result<()> {
        let ba = Self::quad_inner("mult_add_quad", a, b)?;
        self.mult_add_trans_a(a, &ba)
    }

    /// Writes `a^T * b * a` into the block of `self` at (row, col).
    ///
    /// # Errors
    ///
    /// Returns an error if the operands do not conform or the block does not
    /// fit.
    pub fn mult_quad_block(
        &mut self,
        a: &Matrix,
        b: &Matrix,
        row: usize,
        col: usize,
    ) -> Result<()> {
        let ba = Self::quad_inner("mult_quad_block", a, b)?;
        check_block("mult_quad_block", self.shape(), row, col, a.cols, a.cols)?;
        Product { scale: 1.0, a, trans_a: true, b: &ba, trans_b: false }
            .write_into(self, row, col, false);
        Ok(())
    }

    /// Adds `a^T * b * a` into the block of `self` at (row, col).
    ///
    /// # Errors
    ///
    /// Returns an error if the operands do not conform or the block does not
    /// fit.
    pub fn mult_add_quad_block(
        &mut self,
        a: &Matrix,
        b: &Matrix,
        row: usize,
        col: usize,
    ) -> Result<()> {
        let ba = Self::quad_inner("mult_add_quad_block", a, b)?;
        let product = Product { scale: 1.0, a, trans_a: true, b: &ba, trans_b: false };
        self.accumulate_product("mult_add_quad_block", product, row, col)
    }
}
