//! Assertions and random matrix generators for tests.
//!
//! Generators take the caller's RNG so tests stay reproducible with a
//! seeded [`rand::rngs::StdRng`].
//!
//! ```
//! use matrixlib::testing::{assert_matrix_equals, random_symmetric};
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let mut rng = StdRng::seed_from_u64(42);
//! let p = random_symmetric(4, 0.1, 1.0, &mut rng);
//! assert_matrix_equals(&p, &p.transpose(), 0.0);
//! ```

use rand::Rng;

use crate::error::Result;
use crate::primitives::Matrix;

/// Asserts that two matrices have the same shape and agree element-wise
/// within `delta`.
///
/// # Panics
///
/// Panics on a shape mismatch or the first element outside tolerance.
pub fn assert_matrix_equals(expected: &Matrix, actual: &Matrix, delta: f64) {
    assert_matrix_equals_msg("", expected, actual, delta);
}

/// [`assert_matrix_equals`] with a message prefix.
///
/// # Panics
///
/// Panics on a shape mismatch or the first element outside tolerance.
pub fn assert_matrix_equals_msg(message: &str, expected: &Matrix, actual: &Matrix, delta: f64) {
    assert_eq!(expected.n_rows(), actual.n_rows(), "{message} rows");
    assert_eq!(expected.n_cols(), actual.n_cols(), "{message} columns");
    for i in 0..expected.n_rows() {
        for j in 0..expected.n_cols() {
            let (e, a) = (expected[(i, j)], actual[(i, j)]);
            let equal = if e.is_nan() || a.is_nan() {
                e.is_nan() && a.is_nan()
            } else {
                e == a || (e - a).abs() <= delta
            };
            assert!(
                equal,
                "{message} index ({i}, {j}): expected {e}, actual {a}, delta {delta}"
            );
        }
    }
}

/// Asserts that every element lies within `epsilon` of zero.
///
/// # Panics
///
/// Panics on the first element outside tolerance.
pub fn assert_matrix_equals_zero(matrix: &Matrix, epsilon: f64) {
    for i in 0..matrix.n_rows() {
        for j in 0..matrix.n_cols() {
            let v = matrix[(i, j)];
            assert!(
                v.abs() <= epsilon,
                "index ({i}, {j}): expected 0, actual {v}, epsilon {epsilon}"
            );
        }
    }
}

/// Sets `size` diagonal entries starting at (start_row, start_col).
///
/// # Errors
///
/// Returns an error if the diagonal runs past the matrix.
pub fn set_diagonal(
    matrix: &mut Matrix,
    start_row: usize,
    start_col: usize,
    size: usize,
    value: f64,
) -> Result<()> {
    matrix.fill_diagonal(start_row, start_col, size, value)
}

/// Matrix with elements drawn uniformly from `[min, max]`.
///
/// # Panics
///
/// Panics if `min > max`.
pub fn random_rectangle(
    rows: usize,
    cols: usize,
    min: f64,
    max: f64,
    rng: &mut impl Rng,
) -> Matrix {
    let mut m = Matrix::zeros(rows, cols);
    for v in m.as_mut_slice() {
        *v = rng.random_range(min..=max);
    }
    m
}

/// Symmetric matrix with elements drawn uniformly from `[min, max]`.
///
/// # Panics
///
/// Panics if `min > max`.
pub fn random_symmetric(n: usize, min: f64, max: f64, rng: &mut impl Rng) -> Matrix {
    let mut m = Matrix::zeros(n, n);
    for i in 0..n {
        for j in i..n {
            let v = rng.random_range(min..=max);
            m[(i, j)] = v;
            m[(j, i)] = v;
        }
    }
    m
}

/// Diagonal matrix with diagonal entries drawn uniformly from `[min, max]`.
///
/// # Panics
///
/// Panics if `min > max`.
pub fn random_diagonal(n: usize, min: f64, max: f64, rng: &mut impl Rng) -> Matrix {
    let mut m = Matrix::zeros(n, n);
    for i in 0..n {
        m[(i, i)] = rng.random_range(min..=max);
    }
    m
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_assert_matrix_equals_passes_within_delta() {
        let a = Matrix::filled(2, 2, 1.0);
        let b = Matrix::filled(2, 2, 1.0 + 1e-9);
        assert_matrix_equals(&a, &b, 1e-8);
    }

    #[test]
    fn test_assert_matrix_equals_accepts_matching_nan() {
        let a = Matrix::filled(1, 1, f64::NAN);
        assert_matrix_equals(&a, &a.clone(), 1e-12);
    }

    #[test]
    #[should_panic(expected = "index (1, 0)")]
    fn test_assert_matrix_equals_reports_index() {
        let a = Matrix::zeros(2, 1);
        let mut b = Matrix::zeros(2, 1);
        b[(1, 0)] = 1.0;
        assert_matrix_equals(&a, &b, 1e-3);
    }

    #[test]
    #[should_panic(expected = "rows")]
    fn test_assert_matrix_equals_checks_shape() {
        assert_matrix_equals(&Matrix::zeros(2, 1), &Matrix::zeros(1, 1), 1.0);
    }

    #[test]
    #[should_panic(expected = "custom")]
    fn test_assert_matrix_equals_msg_prefix() {
        assert_matrix_equals_msg("custom", &Matrix::zeros(1, 1), &Matrix::filled(1, 1, 1.0), 0.5);
    }

    #[test]
    fn test_assert_matrix_equals_zero() {
        assert_matrix_equals_zero(&Matrix::filled(3, 2, 1e-10), 1e-9);
    }

    #[test]
    #[should_panic(expected = "expected 0")]
    fn test_assert_matrix_equals_zero_fails() {
        assert_matrix_equals_zero(&Matrix::filled(1, 1, 0.1), 1e-3);
    }

    #[test]
    fn test_set_diagonal() {
        let mut m = Matrix::zeros(3, 3);
        set_diagonal(&mut m, 1, 0, 2, 5.0).expect("fits");
        assert_eq!(m[(1, 0)], 5.0);
        assert_eq!(m[(2, 1)], 5.0);
        assert_eq!(m.sum(), 10.0);
        assert!(set_diagonal(&mut m, 2, 2, 2, 1.0).is_err());
    }

    #[test]
    fn test_random_generators_respect_bounds() {
        let mut rng = StdRng::seed_from_u64(86_526_826);
        let r = random_rectangle(4, 7, -1.0, 1.0, &mut rng);
        assert_eq!(r.shape(), (4, 7));
        assert!(r.as_slice().iter().all(|v| (-1.0..=1.0).contains(v)));

        let s = random_symmetric(5, 0.1, 1.0, &mut rng);
        assert_eq!(s, s.transpose());
        assert!(s.as_slice().iter().all(|v| (0.1..=1.0).contains(v)));

        let d = random_diagonal(4, 1.0, 100.0, &mut rng);
        for i in 0..4 {
            for j in 0..4 {
                if i == j {
                    assert!(d[(i, j)] >= 1.0);
                } else {
                    assert_eq!(d[(i, j)], 0.0);
                }
            }
        }
    }

    #[test]
    fn test_random_generators_are_reproducible() {
        let a = random_rectangle(3, 3, 0.0, 1.0, &mut StdRng::seed_from_u64(7));
        let b = random_rectangle(3, 3, 0.0, 1.0, &mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
    }
}
