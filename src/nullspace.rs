//! Damped nullspace projection with a reusable workspace.
//!
//! [`NullspaceProjector`] computes the same projection as
//! [`ops::project_on_nullspace`](crate::ops::project_on_nullspace) but keeps
//! its intermediate matrices and Cholesky storage between calls. Once sized,
//! [`project`](NullspaceProjector::project) does not allocate as long as
//! the shapes of `b` and `c` stay the same.
//!
//! ```
//! use matrixlib::nullspace::NullspaceProjector;
//! use matrixlib::Matrix;
//!
//! let a = Matrix::from_vec(1, 3, vec![1.0, 1.0, 1.0]).unwrap();
//! let b = Matrix::from_vec(1, 3, vec![0.0, 0.0, 1.0]).unwrap();
//! let mut c = Matrix::default();
//!
//! let mut projector = NullspaceProjector::new(3);
//! projector.project(&a, &b, &mut c, 1e-4).unwrap();
//! assert_eq!(c.shape(), (1, 3));
//! assert!((c[(0, 0)] - 1.0).abs() < 1e-12);
//! assert!(c[(0, 2)].abs() < 1e-6);
//! ```

use crate::config::SolverConfig;
use crate::error::{MatrixError, Result};
use crate::linalg::Cholesky;
use crate::primitives::Matrix;

/// Projects matrices onto the nullspace of a constraint matrix `B`.
///
/// The projection is `c = a N` with the damped projector
/// `N = I - (B^T B + alpha^2 I)^-1 B^T B`, so that `B c^T ~= 0`. A positive
/// `alpha` lets the nullspace grow gradually as `B` approaches a singular
/// configuration. With `alpha = 0`, `B^T B` itself must be positive definite.
#[derive(Debug, Clone)]
pub struct NullspaceProjector {
    dof: usize,
    damping: f64,
    identity: Matrix,
    btb: Matrix,
    outer: Matrix,
    projector: Matrix,
    llt: Cholesky,
}

impl NullspaceProjector {
    /// Creates a projector for `dof` degrees of freedom with zero default
    /// damping.
    #[must_use]
    pub fn new(dof: usize) -> Self {
        Self::with_config(dof, &SolverConfig::default())
    }

    /// Creates a projector whose default damping comes from `config`.
    #[must_use]
    pub fn with_config(dof: usize, config: &SolverConfig) -> Self {
        Self {
            dof,
            damping: config.default_damping,
            identity: Matrix::identity(dof),
            btb: Matrix::zeros(dof, dof),
            outer: Matrix::zeros(dof, dof),
            projector: Matrix::zeros(dof, dof),
            llt: Cholesky::default(),
        }
    }

    /// Number of degrees of freedom this projector was sized for.
    #[must_use]
    pub fn degrees_of_freedom(&self) -> usize {
        self.dof
    }

    /// Damping used by [`project_default`](Self::project_default).
    #[must_use]
    pub fn default_damping(&self) -> f64 {
        self.damping
    }

    /// Projects `a` onto the nullspace of `b` with damping `alpha`.
    ///
    /// `c` is reshaped to `a.n_rows() x dof`.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::DimensionMismatch`] unless both `a` and `b`
    /// have `dof` columns, and [`MatrixError::NotPositiveDefinite`] when
    /// `B^T B + alpha^2 I` cannot be factored.
    pub fn project(&mut self, a: &Matrix, b: &Matrix, c: &mut Matrix, alpha: f64) -> Result<()> {
        if b.n_cols() != self.dof {
            return Err(MatrixError::dimension_mismatch(
                "nullspace projector B columns",
                self.dof,
                b.n_cols(),
            ));
        }
        if a.n_cols() != self.dof {
            return Err(MatrixError::dimension_mismatch(
                "nullspace projector A columns",
                self.dof,
                a.n_cols(),
            ));
        }
        tracing::trace!(dof = self.dof, rows = a.n_rows(), alpha, "nullspace projection");

        self.btb.mult_trans_a(b, b)?;
        self.outer.set_from(&self.btb);
        let damping = alpha * alpha;
        for i in 0..self.dof {
            self.outer[(i, i)] += damping;
        }

        let (dof, llt) = (self.dof, &mut self.llt);
        llt.refactor(&self.outer).inspect_err(|_| {
            tracing::debug!(dof, alpha, "damped B^T B is not positive definite");
        })?;
        // N = I - (B^T B + alpha^2 I)^-1 B^T B
        self.projector.set_from(&self.btb);
        llt.solve_matrix_in_place(&mut self.projector)?;
        self.projector.scale(-1.0);
        self.projector.add_equals(&self.identity)?;
        c.mult(a, &self.projector)
    }

    /// Projects with the configured default damping.
    ///
    /// # Errors
    ///
    /// See [`project`](Self::project).
    pub fn project_default(&mut self, a: &Matrix, b: &Matrix, c: &mut Matrix) -> Result<()> {
        self.project(a, b, c, self.damping)
    }
}

#[cfg(test)]
#[path = "nullspace_tests.rs"]
mod tests;
