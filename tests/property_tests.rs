//! Property-based tests using proptest.
//!
//! These tests verify algebraic invariants of the matrix kernels.

use matrixlib::diagonal::{self, Diagonal};
use matrixlib::ops;
use matrixlib::prelude::*;
use matrixlib::tools;
use proptest::prelude::*;

// Strategy for generating matrices of a fixed shape
fn matrix_strategy(rows: usize, cols: usize) -> impl Strategy<Value = Matrix> {
    proptest::collection::vec(-10.0f64..10.0, rows * cols).prop_map(move |data| {
        Matrix::from_vec(rows, cols, data).expect("Test data should be valid")
    })
}

// Strategy for generating matrices of a random shape
fn any_matrix() -> impl Strategy<Value = Matrix> {
    (1usize..7, 1usize..7).prop_flat_map(|(rows, cols)| matrix_strategy(rows, cols))
}

// Two matrices whose product is defined
fn conforming_pair() -> impl Strategy<Value = (Matrix, Matrix)> {
    (1usize..7, 1usize..7, 1usize..7)
        .prop_flat_map(|(m, k, n)| (matrix_strategy(m, k), matrix_strategy(k, n)))
}

// Strictly diagonally dominant, hence nonsingular
fn nonsingular_strategy() -> impl Strategy<Value = Matrix> {
    (1usize..7).prop_flat_map(|n| {
        matrix_strategy(n, n).prop_map(move |mut m| {
            for i in 0..n {
                m[(i, i)] += 10.0 * n as f64 + 1.0;
            }
            m
        })
    })
}

fn product(a: &Matrix, b: &Matrix) -> Matrix {
    let mut c = Matrix::default();
    c.mult(a, b).expect("conforming");
    c
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn test_transpose_is_involution(m in any_matrix()) {
        prop_assert_eq!(m.transpose().transpose(), m);
    }

    #[test]
    fn test_product_transpose_reverses_order((a, b) in conforming_pair()) {
        let left = product(&a, &b).transpose();
        let right = product(&b.transpose(), &a.transpose());
        prop_assert!(left.is_approx(&right, 1e-9));
    }

    #[test]
    fn test_mult_trans_a_matches_explicit_transpose((a, b) in conforming_pair()) {
        let at = a.transpose();
        let mut c = Matrix::default();
        c.mult_trans_a(&at, &b).expect("conforming");
        prop_assert!(c.is_approx(&product(&a, &b), 1e-9));
    }

    #[test]
    fn test_mult_add_scaled_is_affine((a, b) in conforming_pair(), scale in -3.0f64..3.0) {
        let ab = product(&a, &b);
        let base = Matrix::filled(ab.n_rows(), ab.n_cols(), 1.0);
        let mut c = base.clone();
        c.mult_add_scaled(scale, &a, &b).expect("conforming");
        let mut expected = ab;
        expected.scale(scale);
        expected.add_equals(&base).expect("same shape");
        prop_assert!(c.is_approx(&expected, 1e-9));
    }

    #[test]
    fn test_solve_recovers_right_hand_side(a in nonsingular_strategy(), seed in 0u64..1000) {
        let n = a.n_rows();
        let values: Vec<f64> = (0..n).map(|i| (seed + i as u64) as f64).collect();
        let b = Matrix::column_vector(&values);
        let mut x = Matrix::default();
        x.solve(&a, &b).expect("nonsingular");
        prop_assert!(product(&a, &x).is_approx(&b, 1e-8));

        let mut checked = Matrix::default();
        prop_assert!(ops::solve_check(&a, &b, &mut checked).expect("conforming"));
        prop_assert!(checked.is_approx(&x, 1e-8));
    }

    #[test]
    fn test_inverse_is_two_sided(a in nonsingular_strategy()) {
        let mut inv = Matrix::default();
        inv.invert(&a).expect("nonsingular");
        let identity = Matrix::identity(a.n_rows());
        prop_assert!(product(&a, &inv).is_approx(&identity, 1e-9));
        prop_assert!(product(&inv, &a).is_approx(&identity, 1e-9));
    }

    #[test]
    fn test_remove_row_keeps_remaining_rows(m in any_matrix(), pick in 0usize..7) {
        let row = pick % m.n_rows();
        let mut reduced = m.clone();
        reduced.remove_row(row).expect("in range");
        prop_assert_eq!(reduced.n_rows(), m.n_rows() - 1);
        for i in 0..reduced.n_rows() {
            let original = if i < row { i } else { i + 1 };
            prop_assert_eq!(reduced.row(i), m.row(original));
        }
    }

    #[test]
    fn test_swap_rows_twice_restores(m in any_matrix(), i in 0usize..7, j in 0usize..7) {
        let (i, j) = (i % m.n_rows(), j % m.n_rows());
        let mut swapped = m.clone();
        tools::swap_rows(i, j, &mut swapped).expect("in range");
        prop_assert_eq!(swapped.row(i), m.row(j));
        tools::swap_rows(i, j, &mut swapped).expect("in range");
        prop_assert_eq!(swapped, m);
    }

    #[test]
    fn test_reshape_shrinking_keeps_prefix(m in any_matrix()) {
        let len = m.num_elements();
        let mut reshaped = m.clone();
        reshaped.reshape(1, len / 2);
        prop_assert_eq!(reshaped.as_slice(), &m.as_slice()[..len / 2]);
    }

    #[test]
    fn test_diagonal_pre_mult_matches_dense(b in any_matrix(), weight in 0.1f64..5.0) {
        let n = b.n_rows();
        let values: Vec<f64> = (0..n).map(|i| weight + i as f64).collect();
        let mut dense = Matrix::zeros(n, n);
        for (i, v) in values.iter().enumerate() {
            dense[(i, i)] = *v;
        }
        let mut out = Matrix::default();
        diagonal::pre_mult(Diagonal::Vector(&Matrix::column_vector(&values)), &b, &mut out)
            .expect("conforming");
        prop_assert!(out.is_approx(&product(&dense, &b), 1e-12));
    }

    #[test]
    fn test_mult_inner_is_symmetric(j in any_matrix(), weight in 0.1f64..5.0) {
        let mut h = Matrix::default();
        diagonal::mult_inner(&j, Diagonal::Scalar(weight), &mut h).expect("conforming");
        prop_assert_eq!(h.shape(), (j.n_cols(), j.n_cols()));
        prop_assert_eq!(h.transpose(), h);
    }

    #[test]
    fn test_nullspace_projector_agrees_with_ops(
        (a, b) in (1usize..6, 1usize..6, 1usize..6)
            .prop_flat_map(|(rows, constraints, dofs)| {
                (matrix_strategy(rows, dofs), matrix_strategy(constraints, dofs))
            }),
        alpha in 0.1f64..2.0,
    ) {
        let mut projector = NullspaceProjector::new(a.n_cols());
        let mut c = Matrix::default();
        projector.project(&a, &b, &mut c, alpha).expect("damped");
        let mut expected = Matrix::default();
        ops::project_on_nullspace(&a, &b, &mut expected, alpha).expect("damped");
        prop_assert!(c.is_approx(&expected, 1e-8));
    }
}
