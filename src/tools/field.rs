//! Matrices embedded in configuration files.
//!
//! A field may hold a scalar, a flat list or a list of rows:
//!
//! ```
//! use matrixlib::tools::MatrixField;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Constraints {
//!     beq: MatrixField,
//!     gain: MatrixField,
//! }
//!
//! let parsed: Constraints = toml::from_str(
//!     "beq = [[1.0, 0.0], [0.0, 1.0]]\ngain = 2.5\n",
//! )
//! .unwrap();
//! let beq = parsed.beq.to_matrix().unwrap().unwrap();
//! assert_eq!(beq.shape(), (2, 2));
//! assert_eq!(parsed.gain.to_matrix().unwrap().unwrap().as_slice(), &[2.5]);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::primitives::Matrix;

/// Serde image of a matrix-valued config field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MatrixField {
    /// A single value, read as a 1x1 matrix.
    Scalar(f64),
    /// A list of rows.
    Rows(Vec<Vec<f64>>),
    /// A flat list, read as a single row.
    Row(Vec<f64>),
}

impl MatrixField {
    /// Converts the field to a matrix. An empty list yields `None`.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::DimensionMismatch`](crate::MatrixError::DimensionMismatch)
    /// when the rows are ragged.
    pub fn to_matrix(&self) -> Result<Option<Matrix>> {
        match self {
            Self::Scalar(v) => Ok(Some(Matrix::filled(1, 1, *v))),
            Self::Rows(rows) if rows.is_empty() => Ok(None),
            Self::Rows(rows) => Matrix::from_rows(rows).map(Some),
            Self::Row(values) if values.is_empty() => Ok(None),
            Self::Row(values) => Matrix::from_vec(1, values.len(), values.clone()).map(Some),
        }
    }

    /// Builds the most compact field for `m`: a scalar for 1x1, a flat list
    /// for a single row, and a list of rows otherwise.
    #[must_use]
    pub fn from_matrix(m: &Matrix) -> Self {
        match m.shape() {
            (1, 1) => Self::Scalar(m[(0, 0)]),
            (1, _) => Self::Row(m.as_slice().to_vec()),
            (rows, _) => Self::Rows((0..rows).map(|i| m.row(i).to_vec()).collect()),
        }
    }
}

impl From<&Matrix> for MatrixField {
    fn from(m: &Matrix) -> Self {
        Self::from_matrix(m)
    }
}
