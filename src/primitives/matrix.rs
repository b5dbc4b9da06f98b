//! Dense row-major matrix of `f64` values.
//!
//! Every operation writes its result into `self`, reshaping it when the
//! result has a different shape. Reshaping keeps the buffer, so a scratch
//! matrix only reallocates when a result outgrows its capacity. Products
//! and block updates are computed in place. Quadratic forms and the solvers
//! build temporaries of their own.

mod blocks;
mod products;
mod solve;

pub(crate) use products::check_block;

use std::fmt;
use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

use crate::config::SolverConfig;
use crate::error::{MatrixError, Result};

/// A dense 2D matrix of `f64` values (row-major storage).
///
/// # Examples
///
/// ```
/// use matrixlib::Matrix;
///
/// let a = Matrix::from_vec(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0])
///     .expect("data length matches rows * cols");
/// let b = Matrix::from_vec(3, 1, vec![1.0, 0.0, -1.0]).expect("data length matches rows * cols");
///
/// let mut ab = Matrix::default();
/// ab.mult(&a, &b).expect("inner dimensions agree");
/// assert_eq!(ab.shape(), (2, 1));
/// assert_eq!(ab.as_slice(), &[-2.0, -2.0]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawMatrix")]
pub struct Matrix {
    data: Vec<f64>,
    rows: usize,
    cols: usize,
}

/// Unvalidated serde image of [`Matrix`].
#[derive(Deserialize)]
struct RawMatrix {
    data: Vec<f64>,
    rows: usize,
    cols: usize,
}

impl TryFrom<RawMatrix> for Matrix {
    type Error = MatrixError;

    fn try_from(raw: RawMatrix) -> Result<Self> {
        Matrix::from_vec(raw.rows, raw.cols, raw.data)
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Self::zeros(0, 0)
    }
}

impl Matrix {
    /// Creates a matrix of zeros.
    #[must_use]
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self::filled(rows, cols, 0.0)
    }

    /// Creates a matrix whose elements all equal `value`.
    #[must_use]
    pub fn filled(rows: usize, cols: usize, value: f64) -> Self {
        Self {
            data: vec![value; rows * cols],
            rows,
            cols,
        }
    }

    /// Creates an `n`-by-`n` identity matrix.
    #[must_use]
    pub fn identity(n: usize) -> Self {
        Self::identity_rect(n, n)
    }

    /// Creates a rectangular matrix with ones on its main diagonal.
    #[must_use]
    pub fn identity_rect(rows: usize, cols: usize) -> Self {
        let mut m = Self::zeros(rows, cols);
        for i in 0..rows.min(cols) {
            m.data[i * cols + i] = 1.0;
        }
        m
    }

    /// Creates a new matrix from row-major data.
    ///
    /// # Errors
    ///
    /// Returns an error if data length doesn't match rows * cols, including
    /// when rows * cols overflows `usize`.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self> {
        let Some(len) = rows.checked_mul(cols) else {
            return Err(MatrixError::DimensionMismatch {
                expected: format!("{rows}x{cols} elements fitting in usize"),
                actual: format!("{} elements", data.len()),
            });
        };
        if data.len() != len {
            return Err(MatrixError::DimensionMismatch {
                expected: format!("{rows}x{cols} = {len} elements"),
                actual: format!("{} elements", data.len()),
            });
        }
        Ok(Self { data, rows, cols })
    }

    /// Creates a matrix from a list of rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the rows do not all have the same length.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let cols = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(rows.len() * cols);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != cols {
                return Err(MatrixError::DimensionMismatch {
                    expected: format!("row {i} with {cols} columns"),
                    actual: format!("{} columns", row.len()),
                });
            }
            data.extend_from_slice(row);
        }
        Ok(Self {
            data,
            rows: rows.len(),
            cols,
        })
    }

    /// Creates a column vector holding `values`.
    #[must_use]
    pub fn column_vector(values: &[f64]) -> Self {
        Self {
            data: values.to_vec(),
            rows: values.len(),
            cols: 1,
        }
    }

    /// Creates a zero matrix with the same shape as `self`.
    #[must_use]
    pub fn zeros_like(&self) -> Self {
        Self::zeros(self.rows, self.cols)
    }

    /// Returns the shape as (rows, cols).
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.rows
    }

    /// Returns the number of columns.
    #[must_use]
    pub fn n_cols(&self) -> usize {
        self.cols
    }

    /// Returns `rows * cols`.
    #[must_use]
    pub fn num_elements(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` for a 0-by-0 matrix.
    ///
    /// A matrix with one zero dimension (say 0-by-3) still carries a shape
    /// and is not considered empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows == 0 && self.cols == 0
    }

    /// Returns `true` if the matrix has a single column or a single row.
    #[must_use]
    pub fn is_vector(&self) -> bool {
        self.rows == 1 || self.cols == 1
    }

    /// Returns the underlying row-major data.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Returns the underlying row-major data mutably.
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Returns one row as a slice.
    ///
    /// # Panics
    ///
    /// Panics if `row` is out of bounds.
    #[must_use]
    pub fn row(&self, row: usize) -> &[f64] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    #[inline]
    pub(crate) fn at(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.cols + col]
    }

    #[inline]
    pub(crate) fn at_mut(&mut self, row: usize, col: usize) -> &mut f64 {
        &mut self.data[row * self.cols + col]
    }

    fn check_index(&self, row: usize, col: usize) -> Result<()> {
        if row >= self.rows || col >= self.cols {
            return Err(MatrixError::index_out_of_bounds(row, col, self.shape()));
        }
        Ok(())
    }

    /// Returns the element at (row, col).
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::IndexOutOfBounds`] if either index is out of range.
    pub fn get(&self, row: usize, col: usize) -> Result<f64> {
        self.check_index(row, col)?;
        Ok(self.at(row, col))
    }

    /// Returns the element at (row, col), or `NaN` when out of range.
    #[must_use]
    pub fn unsafe_get(&self, row: usize, col: usize) -> f64 {
        if row >= self.rows || col >= self.cols {
            return f64::NAN;
        }
        self.at(row, col)
    }

    /// Assigns the element at (row, col).
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::IndexOutOfBounds`] if either index is out of range.
    pub fn set(&mut self, row: usize, col: usize, value: f64) -> Result<()> {
        self.check_index(row, col)?;
        *self.at_mut(row, col) = value;
        Ok(())
    }

    /// Adds `value` to the element at (row, col).
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::IndexOutOfBounds`] if either index is out of range.
    pub fn add_at(&mut self, row: usize, col: usize, value: f64) -> Result<()> {
        self.check_index(row, col)?;
        *self.at_mut(row, col) += value;
        Ok(())
    }

    /// Changes the shape, keeping values where possible.
    ///
    /// The leading `rows * cols` elements (row-major) are kept when the
    /// matrix shrinks or keeps its element count. Growing past the current
    /// element count zeroes the whole matrix:
    ///
    /// ```
    /// use matrixlib::Matrix;
    ///
    /// let mut m = Matrix::from_vec(2, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
    /// m.reshape(1, 2);
    /// assert_eq!(m.as_slice(), &[1.0, 2.0]);
    /// m.reshape(2, 3);
    /// assert_eq!(m.as_slice(), &[0.0; 6]);
    /// ```
    pub fn reshape(&mut self, rows: usize, cols: usize) {
        let len = rows * cols;
        if len > self.data.len() {
            if !self.data.is_empty() {
                tracing::trace!(
                    from_rows = self.rows,
                    from_cols = self.cols,
                    rows,
                    cols,
                    "reshape grows matrix, previous values discarded"
                );
            }
            self.data.clear();
            self.data.resize(len, 0.0);
        } else {
            self.data.truncate(len);
        }
        self.rows = rows;
        self.cols = cols;
    }

    /// Changes the shape and sets every element to zero.
    pub fn reshape_zeroed(&mut self, rows: usize, cols: usize) {
        self.data.clear();
        self.data.resize(rows * cols, 0.0);
        self.rows = rows;
        self.cols = cols;
    }

    /// Copies `other` into `self`, reshaping it.
    pub fn set_from(&mut self, other: &Matrix) {
        self.data.clear();
        self.data.extend_from_slice(&other.data);
        self.rows = other.rows;
        self.cols = other.cols;
    }

    /// Copies `other` scaled by `alpha` into `self`, reshaping it.
    pub fn scale_from(&mut self, alpha: f64, other: &Matrix) {
        self.data.clear();
        self.data.extend(other.data.iter().map(|v| alpha * v));
        self.rows = other.rows;
        self.cols = other.cols;
    }

    /// Multiplies each element by `alpha`.
    pub fn scale(&mut self, alpha: f64) {
        self.data.iter_mut().for_each(|v| *v *= alpha);
    }

    /// Sets all elements to zero.
    pub fn zero(&mut self) {
        self.fill(0.0);
    }

    /// Sets all elements to `value`.
    pub fn fill(&mut self, value: f64) {
        self.data.iter_mut().for_each(|v| *v = value);
    }

    /// Computes `self = a + b`.
    ///
    /// # Errors
    ///
    /// Returns an error if `a` and `b` differ in shape.
    pub fn add(&mut self, a: &Matrix, b: &Matrix) -> Result<()> {
        self.elementwise(a, b, "add", |x, y| x + y)
    }

    /// Computes `self = a - b`.
    ///
    /// # Errors
    ///
    /// Returns an error if `a` and `b` differ in shape.
    pub fn subtract(&mut self, a: &Matrix, b: &Matrix) -> Result<()> {
        self.elementwise(a, b, "subtract", |x, y| x - y)
    }

    /// Computes `self += a`.
    ///
    /// # Errors
    ///
    /// Returns an error if `a` differs in shape from `self`.
    pub fn add_equals(&mut self, a: &Matrix) -> Result<()> {
        self.require_shape("add_equals", a.shape())?;
        self.data.iter_mut().zip(&a.data).for_each(|(x, y)| *x += y);
        Ok(())
    }

    /// Computes `self -= a`.
    ///
    /// # Errors
    ///
    /// Returns an error if `a` differs in shape from `self`.
    pub fn subtract_equals(&mut self, a: &Matrix) -> Result<()> {
        self.require_shape("subtract_equals", a.shape())?;
        self.data.iter_mut().zip(&a.data).for_each(|(x, y)| *x -= y);
        Ok(())
    }

    fn elementwise(
        &mut self,
        a: &Matrix,
        b: &Matrix,
        context: &str,
        op: impl Fn(f64, f64) -> f64,
    ) -> Result<()> {
        if a.shape() != b.shape() {
            return Err(MatrixError::shape_mismatch(context, a.shape(), b.shape()));
        }
        self.data.clear();
        self.data
            .extend(a.data.iter().zip(&b.data).map(|(&x, &y)| op(x, y)));
        self.rows = a.rows;
        self.cols = a.cols;
        Ok(())
    }

    pub(crate) fn require_shape(&self, context: &str, shape: (usize, usize)) -> Result<()> {
        if self.shape() != shape {
            return Err(MatrixError::shape_mismatch(context, shape, self.shape()));
        }
        Ok(())
    }

    /// Returns the transpose as a new matrix.
    #[must_use]
    pub fn transpose(&self) -> Matrix {
        let mut t = Matrix::default();
        t.set_transpose(self);
        t
    }

    /// Computes `self = a^T`.
    pub fn set_transpose(&mut self, a: &Matrix) {
        self.reshape(a.cols, a.rows);
        for i in 0..a.rows {
            for j in 0..a.cols {
                self.data[j * a.rows + i] = a.data[i * a.cols + j];
            }
        }
    }

    /// Removes a row and shifts the following rows up by one.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::IndexOutOfBounds`] if `row` is out of range.
    pub fn remove_row(&mut self, row: usize) -> Result<()> {
        if row >= self.rows {
            return Err(MatrixError::index_out_of_bounds(row, 0, self.shape()));
        }
        let start = row * self.cols;
        self.data.drain(start..start + self.cols);
        self.rows -= 1;
        Ok(())
    }

    /// Removes a column and shifts the following columns left by one.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::IndexOutOfBounds`] if `col` is out of range.
    pub fn remove_column(&mut self, col: usize) -> Result<()> {
        if col >= self.cols {
            return Err(MatrixError::index_out_of_bounds(0, col, self.shape()));
        }
        let cols = self.cols;
        let mut index = 0;
        self.data.retain(|_| {
            let keep = index % cols != col;
            index += 1;
            keep
        });
        self.cols -= 1;
        Ok(())
    }

    /// Returns `true` if at least one element is `NaN`.
    #[must_use]
    pub fn contains_nan(&self) -> bool {
        self.data.iter().any(|v| v.is_nan())
    }

    /// Smallest element, `None` for a matrix without elements.
    #[must_use]
    pub fn min(&self) -> Option<f64> {
        self.data.iter().copied().reduce(f64::min)
    }

    /// Largest element, `None` for a matrix without elements.
    #[must_use]
    pub fn max(&self) -> Option<f64> {
        self.data.iter().copied().reduce(f64::max)
    }

    /// Sum of all elements.
    #[must_use]
    pub fn sum(&self) -> f64 {
        self.data.iter().sum()
    }

    /// Product of all elements.
    #[must_use]
    pub fn prod(&self) -> f64 {
        self.data.iter().product()
    }

    /// Returns `true` if `other` has the same shape and every element lies
    /// within `precision` of the corresponding element of `self`.
    #[must_use]
    pub fn is_approx(&self, other: &Matrix, precision: f64) -> bool {
        self.shape() == other.shape()
            && self
                .data
                .iter()
                .zip(&other.data)
                .all(|(a, b)| (a - b).abs() <= precision)
    }

    /// [`is_approx`](Self::is_approx) with the configured tolerance.
    #[must_use]
    pub fn is_approx_with(&self, other: &Matrix, config: &SolverConfig) -> bool {
        self.is_approx(other, config.approx_precision)
    }

    /// Formats the matrix with the configured number of digits.
    #[must_use]
    pub fn to_string_with(&self, config: &SolverConfig) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = self.write_formatted(&mut out, config.display_precision);
        out
    }

    fn write_formatted(&self, f: &mut impl fmt::Write, precision: usize) -> fmt::Result {
        writeln!(f, "Matrix ({} x {})", self.rows, self.cols)?;
        let width = precision + 8;
        for i in 0..self.rows {
            for (j, v) in self.row(i).iter().enumerate() {
                if j > 0 {
                    f.write_char(' ')?;
                }
                write!(f, "{v:>width$.precision$e}")?;
            }
            f.write_char('\n')?;
        }
        Ok(())
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_formatted(f, SolverConfig::default().display_precision)
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    fn index(&self, (row, col): (usize, usize)) -> &f64 {
        assert!(
            row < self.rows && col < self.cols,
            "index ({row}, {col}) out of bounds for {}x{} matrix",
            self.rows,
            self.cols
        );
        &self.data[row * self.cols + col]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut f64 {
        assert!(
            row < self.rows && col < self.cols,
            "index ({row}, {col}) out of bounds for {}x{} matrix",
            self.rows,
            self.cols
        );
        &mut self.data[row * self.cols + col]
    }
}

#[cfg(test)]
#[path = "matrix_tests.rs"]
mod tests;
