use super::*;
use crate::testing::{
    assert_matrix_equals, random_diagonal, random_rectangle, random_symmetric,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const ITERATIONS: usize = 25;
const EPSILON: f64 = 1e-10;

fn dense_mult(a: &Matrix, b: &Matrix) -> Matrix {
    let mut c = Matrix::default();
    c.mult(a, b).expect("conforming");
    c
}

#[test]
fn test_predict_error_covariance_matches_dense() {
    let mut rng = StdRng::seed_from_u64(86_526_826);
    for _ in 0..ITERATIONS {
        let n = rng.random_range(1..=30);
        let f = random_rectangle(n, n, -1.0, 1.0, &mut rng);
        let p = random_symmetric(n, 0.1, 1.0, &mut rng);
        let q = random_diagonal(n, 0.1, 1.0, &mut rng);

        let mut expected = dense_mult(&dense_mult(&f, &p), &f.transpose());
        expected.add_equals(&q).expect("same shape");

        let mut actual = Matrix::default();
        predict_error_covariance(&mut actual, &f, &p, &q).expect("conforming");
        assert_matrix_equals(&expected, &actual, EPSILON);
    }
}

#[test]
fn test_predict_error_covariance_reads_upper_triangle_and_q_diagonal() {
    let f = Matrix::identity(2);
    let upper = Matrix::from_vec(2, 2, vec![2.0, 1.0, -50.0, 3.0]).expect("valid 2x2");
    let q = Matrix::from_vec(2, 2, vec![0.5, 9.0, 9.0, 0.25]).expect("valid 2x2");
    let mut out = Matrix::default();
    predict_error_covariance(&mut out, &f, &upper, &q).expect("conforming");
    let expected = Matrix::from_vec(2, 2, vec![2.5, 1.0, 1.0, 3.25]).expect("valid 2x2");
    assert_matrix_equals(&expected, &out, EPSILON);
}

#[test]
fn test_predict_error_covariance_rejects_mismatched_q() {
    let mut out = Matrix::default();
    let err = predict_error_covariance(
        &mut out,
        &Matrix::identity(3),
        &Matrix::identity(3),
        &Matrix::identity(2),
    )
    .unwrap_err();
    assert!(matches!(err, MatrixError::DimensionMismatch { .. }));
}

#[test]
fn test_compute_kalman_gain_matches_dense() {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..ITERATIONS {
        let n = rng.random_range(1..=20);
        let m = rng.random_range(1..=20);
        let mut p = random_symmetric(n, 0.1, 1.0, &mut rng);
        for i in 0..n {
            p[(i, i)] += n as f64;
        }
        let h = random_rectangle(m, n, -1.0, 1.0, &mut rng);
        let r_dense = random_diagonal(m, 1.0, 100.0, &mut rng);
        let r = Matrix::column_vector(&(0..m).map(|i| r_dense[(i, i)]).collect::<Vec<_>>());

        let pht = dense_mult(&p, &h.transpose());
        let mut to_invert = dense_mult(&h, &pht);
        to_invert.add_equals(&r_dense).expect("same shape");
        let mut inverse = Matrix::default();
        inverse.invert(&to_invert).expect("well conditioned");
        let expected = dense_mult(&pht, &inverse);

        let mut actual = Matrix::default();
        compute_kalman_gain(&mut actual, &p, &h, &r).expect("conforming");
        assert_eq!(actual.shape(), (n, m));
        assert_matrix_equals(&expected, &actual, 1e-8);
    }
}

#[test]
fn test_compute_kalman_gain_rejects_matrix_noise() {
    let mut gain = Matrix::default();
    let err = compute_kalman_gain(
        &mut gain,
        &Matrix::identity(2),
        &Matrix::identity(2),
        &Matrix::identity(2),
    )
    .unwrap_err();
    assert!(matches!(err, MatrixError::DimensionMismatch { .. }));
}

#[test]
fn test_compute_kalman_gain_singular_innovation() {
    let mut gain = Matrix::default();
    let err = compute_kalman_gain(
        &mut gain,
        &Matrix::zeros(2, 2),
        &Matrix::identity(2),
        &Matrix::zeros(2, 1),
    )
    .unwrap_err();
    assert!(matches!(err, MatrixError::SingularMatrix { .. }));
}

#[test]
fn test_compute_kalman_gain_badly_conditioned_innovation_still_solves() {
    // H P H^T + diag(r) = [1 1; 1 1 + eps]: nonsingular, with a pivot at
    // machine precision relative to the largest one.
    let p = Matrix::identity(1);
    let h = Matrix::column_vector(&[1.0, 1.0]);
    let r = Matrix::column_vector(&[0.0, f64::EPSILON]);
    let mut gain = Matrix::default();
    compute_kalman_gain(&mut gain, &p, &h, &r).expect("nonsingular innovation");
    assert_eq!(gain.shape(), (1, 2));
    assert!(gain.as_slice().iter().all(|v| v.is_finite()));
}

#[test]
fn test_update_state_matches_dense() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..ITERATIONS {
        let n = rng.random_range(1..=30);
        let m = rng.random_range(1..=30);
        let x = random_rectangle(n, 1, -1.0, 1.0, &mut rng);
        let k = random_rectangle(n, m, -1.0, 1.0, &mut rng);
        let r = random_rectangle(m, 1, -1.0, 1.0, &mut rng);

        let mut expected = dense_mult(&k, &r);
        expected.add_equals(&x).expect("same shape");

        let mut actual = Matrix::default();
        update_state(&mut actual, &x, &k, &r).expect("conforming");
        assert_matrix_equals(&expected, &actual, EPSILON);
    }
}

#[test]
fn test_update_state_rejects_row_residual() {
    let mut next = Matrix::default();
    let x = Matrix::zeros(2, 1);
    let k = Matrix::zeros(2, 3);
    assert!(update_state(&mut next, &x, &k, &Matrix::zeros(1, 3)).is_err());
}

#[test]
fn test_update_error_covariance_matches_dense() {
    let mut rng = StdRng::seed_from_u64(1234);
    for _ in 0..ITERATIONS {
        let n = rng.random_range(1..=30);
        let m = rng.random_range(1..=30);
        let k = random_rectangle(n, m, -1.0, 1.0, &mut rng);
        let h = random_rectangle(m, n, -1.0, 1.0, &mut rng);
        let p = random_symmetric(n, 0.1, 1.0, &mut rng);

        let mut ikh = Matrix::identity(n);
        ikh.subtract_equals(&dense_mult(&k, &h)).expect("same shape");
        let expected = dense_mult(&ikh, &p);

        let mut actual = Matrix::default();
        update_error_covariance(&mut actual, &k, &h, &p).expect("conforming");
        assert_matrix_equals(&expected, &actual, EPSILON);
    }
}

#[test]
fn test_update_error_covariance_rejects_mismatch() {
    let mut out = Matrix::default();
    assert!(update_error_covariance(
        &mut out,
        &Matrix::zeros(3, 2),
        &Matrix::zeros(2, 2),
        &Matrix::identity(3)
    )
    .is_err());
}

#[test]
fn test_filter_rejects_inconsistent_initial_state() {
    assert!(KalmanFilter::new(Matrix::zeros(3, 1), Matrix::identity(2)).is_err());
}

#[test]
fn test_filter_converges_on_constant_signal() {
    let f = Matrix::identity(1);
    let q = Matrix::filled(1, 1, 1e-6);
    let h = Matrix::identity(1);
    let r = Matrix::column_vector(&[0.1]);
    let truth = 3.0;

    let mut filter =
        KalmanFilter::new(Matrix::zeros(1, 1), Matrix::filled(1, 1, 10.0)).expect("consistent");
    let mut rng = StdRng::seed_from_u64(99);
    for _ in 0..200 {
        filter.predict(&f, &q).expect("conforming");
        let z = Matrix::column_vector(&[truth + rng.random_range(-0.3..0.3)]);
        let residual = filter.residual(&h, &z).expect("conforming");
        filter.update(&h, &r, &residual).expect("conforming");
    }
    assert!((filter.state()[(0, 0)] - truth).abs() < 0.1);
    assert!(filter.covariance()[(0, 0)] < 0.01);
    assert_eq!(filter.gain().shape(), (1, 1));
}

#[test]
fn test_filter_residual_into_matches_residual() {
    let mut filter = KalmanFilter::new(Matrix::column_vector(&[1.0, 2.0]), Matrix::identity(2))
        .expect("consistent");
    let f = Matrix::from_vec(2, 2, vec![1.0, 0.5, 0.0, 1.0]).expect("valid 2x2");
    filter.predict(&f, &Matrix::identity(2)).expect("conforming");

    let h = Matrix::from_vec(1, 2, vec![1.0, -1.0]).expect("valid 1x2");
    let z = Matrix::column_vector(&[4.0]);
    let mut out = Matrix::filled(3, 3, 8.0);
    filter.residual_into(&h, &z, &mut out).expect("conforming");
    assert_eq!(out, filter.residual(&h, &z).expect("conforming"));
    // x = F x0 = [2, 2], so z - H x = 4.
    assert_eq!(out.as_slice(), &[4.0]);

    assert!(filter.residual_into(&h, &Matrix::zeros(2, 1), &mut out).is_err());
}

#[test]
fn test_filter_reused_across_sizes_matches_kernels() {
    let mut rng = StdRng::seed_from_u64(314);
    let n = 4;
    let f = random_rectangle(n, n, -1.0, 1.0, &mut rng);
    let q = random_diagonal(n, 0.1, 1.0, &mut rng);
    let mut filter =
        KalmanFilter::new(Matrix::zeros(n, 1), Matrix::identity(n)).expect("consistent");

    for m in [3, 1, 2] {
        let h = random_rectangle(m, n, -1.0, 1.0, &mut rng);
        let r = Matrix::column_vector(&vec![0.5; m]);
        let z = random_rectangle(m, 1, -1.0, 1.0, &mut rng);

        let mut p_pred = Matrix::default();
        predict_error_covariance(&mut p_pred, &f, filter.covariance(), &q).expect("conforming");
        let mut gain = Matrix::default();
        compute_kalman_gain(&mut gain, &p_pred, &h, &r).expect("nonsingular");
        let mut p_next = Matrix::default();
        update_error_covariance(&mut p_next, &gain, &h, &p_pred).expect("conforming");

        filter.predict(&f, &q).expect("conforming");
        let residual = filter.residual(&h, &z).expect("conforming");
        filter.update(&h, &r, &residual).expect("conforming");
        assert_matrix_equals(&gain, filter.gain(), EPSILON);
        assert_matrix_equals(&p_next, filter.covariance(), EPSILON);
    }
}

#[test]
fn test_filter_update_failure_leaves_state() {
    let state = Matrix::column_vector(&[1.0, 2.0]);
    let mut filter = KalmanFilter::new(state, Matrix::identity(2)).expect("consistent");
    let before = filter.state().clone();
    let err = filter.update(&Matrix::identity(3), &Matrix::zeros(3, 1), &Matrix::zeros(3, 1));
    assert!(err.is_err());
    assert_eq!(filter.state(), &before);
}
