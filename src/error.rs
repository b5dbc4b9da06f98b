//! Error types for matrix operations.
//!
//! Every operation that can be handed incompatible operands returns
//! [`Result`], carrying enough context to tell which shape was expected.

use thiserror::Error;

/// Main error type for matrixlib operations.
///
/// # Examples
///
/// ```
/// use matrixlib::error::MatrixError;
///
/// let err = MatrixError::shape_mismatch("mult", (3, 4), (3, 5));
/// assert!(err.to_string().contains("dimension mismatch"));
/// ```
#[derive(Debug, Error)]
pub enum MatrixError {
    /// Operand shapes are incompatible for the requested operation.
    #[error("Matrix dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimensions description
        expected: String,
        /// Actual dimensions found
        actual: String,
    },

    /// An element access fell outside the matrix.
    #[error("Index out of bounds. Requested ({row}, {col}). Dimension ({rows}, {cols}).")]
    IndexOutOfBounds {
        /// Requested row
        row: usize,
        /// Requested column
        col: usize,
        /// Number of rows of the accessed matrix
        rows: usize,
        /// Number of columns of the accessed matrix
        cols: usize,
    },

    /// Matrix is singular (a pivot vanished during factorization).
    #[error("Singular matrix detected: pivot = {pivot}, cannot invert")]
    SingularMatrix {
        /// Offending pivot value
        pivot: f64,
    },

    /// Cholesky factorization met a non-positive diagonal.
    #[error("Matrix is not positive definite (failed at diagonal index {index})")]
    NotPositiveDefinite {
        /// Diagonal index where the factorization broke down
        index: usize,
    },

    /// Argument outside the accepted domain (ranges, empty index sets, ...).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Invalid or unreadable solver configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error while reading configuration.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MatrixError {
    /// Create a dimension mismatch error with descriptive context.
    #[must_use]
    pub fn dimension_mismatch(context: &str, expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch {
            expected: format!("{context}={expected}"),
            actual: format!("{actual}"),
        }
    }

    /// Create a dimension mismatch error from two `(rows, cols)` shapes.
    #[must_use]
    pub fn shape_mismatch(context: &str, expected: (usize, usize), actual: (usize, usize)) -> Self {
        Self::DimensionMismatch {
            expected: format!("{context}: {}x{}", expected.0, expected.1),
            actual: format!("{}x{}", actual.0, actual.1),
        }
    }

    /// Create an index out of bounds error for a matrix of the given shape.
    #[must_use]
    pub fn index_out_of_bounds(row: usize, col: usize, shape: (usize, usize)) -> Self {
        Self::IndexOutOfBounds {
            row,
            col,
            rows: shape.0,
            cols: shape.1,
        }
    }

    /// Create an invalid argument error.
    #[must_use]
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}

/// Convenience type alias for Results.
pub type Result<T> = std::result::Result<T, MatrixError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_mismatch_display() {
        let err = MatrixError::DimensionMismatch {
            expected: "100x10".to_string(),
            actual: "100x5".to_string(),
        };
        assert!(err.to_string().contains("dimension mismatch"));
        assert!(err.to_string().contains("100x10"));
        assert!(err.to_string().contains("100x5"));
    }

    #[test]
    fn test_shape_mismatch_helper() {
        let err = MatrixError::shape_mismatch("mult_add", (2, 3), (3, 2));
        let msg = err.to_string();
        assert!(msg.contains("mult_add: 2x3"));
        assert!(msg.contains("got 3x2"));
    }

    #[test]
    fn test_index_out_of_bounds_display() {
        let err = MatrixError::index_out_of_bounds(4, 1, (3, 3));
        assert_eq!(
            err.to_string(),
            "Index out of bounds. Requested (4, 1). Dimension (3, 3)."
        );
    }

    #[test]
    fn test_singular_matrix_display() {
        let err = MatrixError::SingularMatrix { pivot: 0.0 };
        assert!(err.to_string().contains("Singular matrix"));
    }

    #[test]
    fn test_not_positive_definite_display() {
        let err = MatrixError::NotPositiveDefinite { index: 2 };
        assert!(err.to_string().contains("index 2"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.toml");
        let err: MatrixError = io.into();
        assert!(matches!(err, MatrixError::Io(_)));
        assert!(err.to_string().contains("missing.toml"));
    }

    #[test]
    fn test_dimension_mismatch_helper() {
        let err = MatrixError::dimension_mismatch("degrees_of_freedom", 6, 5);
        assert!(err.to_string().contains("degrees_of_freedom=6"));
    }
}
