use super::*;
use crate::ops::project_on_nullspace;
use crate::testing::{assert_matrix_equals, assert_matrix_equals_zero, random_rectangle};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const ITERATIONS: usize = 100;
const EPSILON: f64 = 1e-8;

#[test]
fn test_project_matches_common_ops() {
    let mut rng = StdRng::seed_from_u64(40);
    for _ in 0..ITERATIONS {
        let a_rows = rng.random_range(1..=30);
        let dofs = rng.random_range(1..=30);
        let a = random_rectangle(a_rows, dofs, -1.0, 1.0, &mut rng);
        let b = random_rectangle(dofs, dofs, -1.0, 1.0, &mut rng);
        let alpha = 0.5;

        let mut expected = Matrix::default();
        project_on_nullspace(&a, &b, &mut expected, alpha).expect("damped");

        let mut projector = NullspaceProjector::new(dofs);
        let mut actual = Matrix::zeros(1, 1);
        projector.project(&a, &b, &mut actual, alpha).expect("damped");

        assert_eq!(actual.shape(), (a_rows, dofs));
        assert_matrix_equals(&expected, &actual, EPSILON);
    }
}

#[test]
fn test_projector_reuse_across_constraint_sizes() {
    let mut rng = StdRng::seed_from_u64(7);
    let dofs = 6;
    let mut projector = NullspaceProjector::new(dofs);
    let mut actual = Matrix::default();
    let mut expected = Matrix::default();
    for constraints in 1..=8 {
        let a = random_rectangle(3, dofs, -1.0, 1.0, &mut rng);
        let b = random_rectangle(constraints, dofs, -1.0, 1.0, &mut rng);
        projector.project(&a, &b, &mut actual, 0.1).expect("damped");
        project_on_nullspace(&a, &b, &mut expected, 0.1).expect("damped");
        assert_matrix_equals(&expected, &actual, EPSILON);
    }
}

#[test]
fn test_project_small_damping_annihilates_constraint() {
    let mut rng = StdRng::seed_from_u64(11);
    let dofs = 5;
    let a = random_rectangle(4, dofs, -1.0, 1.0, &mut rng);
    let b = random_rectangle(2, dofs, -1.0, 1.0, &mut rng);
    let mut c = Matrix::default();
    NullspaceProjector::new(dofs)
        .project(&a, &b, &mut c, 1e-3)
        .expect("damped");

    let mut bct = Matrix::default();
    bct.mult_trans_b(&b, &c).expect("conforming");
    assert_matrix_equals_zero(&bct, 1e-3);
}

#[test]
fn test_project_default_uses_configured_damping() {
    let mut rng = StdRng::seed_from_u64(3);
    let dofs = 4;
    let a = random_rectangle(2, dofs, -1.0, 1.0, &mut rng);
    let b = random_rectangle(3, dofs, -1.0, 1.0, &mut rng);
    let config = SolverConfig::new().with_default_damping(0.3);

    let mut projector = NullspaceProjector::with_config(dofs, &config);
    assert_eq!(projector.degrees_of_freedom(), dofs);
    assert!((projector.default_damping() - 0.3).abs() < f64::EPSILON);

    let mut by_default = Matrix::default();
    let mut explicit = Matrix::default();
    projector.project_default(&a, &b, &mut by_default).expect("damped");
    projector.project(&a, &b, &mut explicit, 0.3).expect("damped");
    assert_matrix_equals(&explicit, &by_default, 0.0);
}

#[test]
fn test_project_rejects_wrong_dof() {
    let mut projector = NullspaceProjector::new(3);
    let mut c = Matrix::default();

    let err = projector
        .project(&Matrix::zeros(2, 3), &Matrix::zeros(2, 4), &mut c, 0.5)
        .unwrap_err();
    assert!(matches!(err, MatrixError::DimensionMismatch { .. }));

    let err = projector
        .project(&Matrix::zeros(2, 4), &Matrix::zeros(2, 3), &mut c, 0.5)
        .unwrap_err();
    assert!(matches!(err, MatrixError::DimensionMismatch { .. }));
}

#[test]
fn test_project_undamped_rank_deficient_fails() {
    let mut projector = NullspaceProjector::new(3);
    let b = Matrix::from_vec(1, 3, vec![0.0, 0.0, 1.0]).expect("valid 1x3");
    let mut c = Matrix::default();
    let err = projector
        .project(&Matrix::identity(3), &b, &mut c, 0.0)
        .unwrap_err();
    assert!(matches!(err, MatrixError::NotPositiveDefinite { .. }));
}

#[test]
fn test_project_recovers_after_factorization_failure() {
    let mut projector = NullspaceProjector::new(3);
    let b = Matrix::from_vec(1, 3, vec![0.0, 0.0, 1.0]).expect("valid 1x3");
    let a = Matrix::identity(3);
    let mut c = Matrix::default();
    assert!(projector.project(&a, &b, &mut c, 0.0).is_err());

    let mut expected = Matrix::default();
    project_on_nullspace(&a, &b, &mut expected, 0.1).expect("damped");
    projector.project(&a, &b, &mut c, 0.1).expect("damped");
    assert_matrix_equals(&expected, &c, EPSILON);
}
