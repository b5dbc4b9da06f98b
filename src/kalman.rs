//! Kalman filter kernels.
//!
//! The four stateless kernels cover the covariance-heavy steps of a linear
//! Kalman filter. Error covariances are symmetric and only their upper
//! triangle is read. Process noise `Q` contributes its diagonal only and
//! measurement noise is passed as a column holding the diagonal of `R`.
//!
//! [`KalmanFilter`] chains the kernels for the common predict/update loop:
//!
//! ```
//! use matrixlib::kalman::KalmanFilter;
//! use matrixlib::Matrix;
//!
//! // Constant-velocity model, position measured.
//! let f = Matrix::from_vec(2, 2, vec![1.0, 0.1, 0.0, 1.0]).unwrap();
//! let q = Matrix::identity(2);
//! let h = Matrix::from_vec(1, 2, vec![1.0, 0.0]).unwrap();
//! let r = Matrix::column_vector(&[0.5]);
//!
//! let mut filter = KalmanFilter::new(Matrix::zeros(2, 1), Matrix::identity(2)).unwrap();
//! filter.predict(&f, &q).unwrap();
//! let residual = filter.residual(&h, &Matrix::column_vector(&[1.0])).unwrap();
//! filter.update(&h, &r, &residual).unwrap();
//! assert!(filter.state()[(0, 0)] > 0.0);
//! ```

use crate::config::SolverConfig;
use crate::error::{MatrixError, Result};
use crate::linalg::{require_column, require_square, symmetric_from_upper_into, Lu};
use crate::primitives::Matrix;

fn require_shape(context: &str, m: &Matrix, shape: (usize, usize)) -> Result<()> {
    if m.shape() != shape {
        return Err(MatrixError::shape_mismatch(context, shape, m.shape()));
    }
    Ok(())
}

/// Intermediate matrices shared by the covariance kernels.
#[derive(Debug, Clone, Default)]
struct Workspace {
    sym: Matrix,
    product: Matrix,
    innovation: Matrix,
    inverse: Matrix,
    lu: Lu,
}

/// Computes the predicted error covariance `F P F^T + diag(Q)`.
///
/// `F`, `P` and `Q` must all be `n x n`. The result is written into `out`.
///
/// # Errors
///
/// Returns [`MatrixError::DimensionMismatch`] when the operands are not all
/// square of the same size.
pub fn predict_error_covariance(
    out: &mut Matrix,
    f: &Matrix,
    p: &Matrix,
    q: &Matrix,
) -> Result<()> {
    predict_error_covariance_with(&mut Workspace::default(), out, f, p, q)
}

fn predict_error_covariance_with(
    ws: &mut Workspace,
    out: &mut Matrix,
    f: &Matrix,
    p: &Matrix,
    q: &Matrix,
) -> Result<()> {
    let n = require_square("predict_error_covariance F", f)?;
    require_shape("predict_error_covariance P", p, (n, n))?;
    require_shape("predict_error_covariance Q", q, (n, n))?;

    symmetric_from_upper_into(p, &mut ws.sym)?;
    ws.product.mult(f, &ws.sym)?;
    out.mult_trans_b(&ws.product, f)?;
    for i in 0..n {
        out[(i, i)] += q[(i, i)];
    }
    Ok(())
}

/// Computes the Kalman gain `P H^T (H P H^T + diag(r))^-1`.
///
/// `H` is `m x n`, `P` is `n x n` and `r` is an `m x 1` column holding the
/// measurement noise variances. The gain is `n x m`.
///
/// # Errors
///
/// Returns [`MatrixError::DimensionMismatch`] on inconsistent shapes and
/// [`MatrixError::SingularMatrix`] when the innovation covariance cannot be
/// inverted.
pub fn compute_kalman_gain(gain: &mut Matrix, p: &Matrix, h: &Matrix, r: &Matrix) -> Result<()> {
    compute_kalman_gain_with(&mut Workspace::default(), gain, p, h, r)
}

fn compute_kalman_gain_with(
    ws: &mut Workspace,
    gain: &mut Matrix,
    p: &Matrix,
    h: &Matrix,
    r: &Matrix,
) -> Result<()> {
    let n = require_square("compute_kalman_gain P", p)?;
    if h.n_cols() != n {
        return Err(MatrixError::dimension_mismatch(
            "compute_kalman_gain H columns",
            n,
            h.n_cols(),
        ));
    }
    let m = h.n_rows();
    require_column("compute_kalman_gain r", r, m)?;

    symmetric_from_upper_into(p, &mut ws.sym)?;
    let pht = &mut ws.product;
    pht.mult_trans_b(&ws.sym, h)?;
    ws.innovation.mult(h, pht)?;
    for i in 0..m {
        ws.innovation[(i, i)] += r[(i, 0)];
    }

    ws.lu
        .refactor(&ws.innovation)
        .inspect_err(|_| tracing::debug!(m, "innovation covariance is singular"))?;
    if !ws.lu.is_well_conditioned(SolverConfig::default().rank_threshold_for(m)) {
        tracing::debug!(m, "innovation covariance is badly conditioned");
    }
    ws.lu.inverse_into(&mut ws.inverse);
    gain.mult(&ws.product, &ws.inverse)
}

/// Computes the corrected state `x + K r`.
///
/// # Errors
///
/// Returns [`MatrixError::DimensionMismatch`] unless `x` is `n x 1`, `K` is
/// `n x m` and `r` is `m x 1`.
pub fn update_state(next: &mut Matrix, x: &Matrix, k: &Matrix, r: &Matrix) -> Result<()> {
    require_column("update_state x", x, k.n_rows())?;
    require_column("update_state r", r, k.n_cols())?;
    next.set_from(x);
    next.mult_add(k, r)
}

/// Computes the corrected error covariance `(I - K H) P`.
///
/// `K` is `n x m`, `H` is `m x n` and `P` is `n x n`.
///
/// # Errors
///
/// Returns [`MatrixError::DimensionMismatch`] on inconsistent shapes.
pub fn update_error_covariance(
    out: &mut Matrix,
    k: &Matrix,
    h: &Matrix,
    p: &Matrix,
) -> Result<()> {
    update_error_covariance_with(&mut Workspace::default(), out, k, h, p)
}

fn update_error_covariance_with(
    ws: &mut Workspace,
    out: &mut Matrix,
    k: &Matrix,
    h: &Matrix,
    p: &Matrix,
) -> Result<()> {
    let n = require_square("update_error_covariance P", p)?;
    require_shape("update_error_covariance K", k, (n, h.n_rows()))?;
    require_shape("update_error_covariance H", h, (k.n_cols(), n))?;

    symmetric_from_upper_into(p, &mut ws.sym)?;
    let ikh = &mut ws.product;
    ikh.reshape_zeroed(n, n);
    for i in 0..n {
        ikh[(i, i)] = 1.0;
    }
    ikh.mult_add_scaled(-1.0, k, h)?;
    out.mult(ikh, &ws.sym)
}

/// Linear Kalman filter holding a state estimate and its error covariance.
///
/// Outputs, intermediate products and the LU factorization of the
/// innovation covariance are kept between steps. Once a filter of fixed
/// size has run a full cycle, [`predict`](Self::predict),
/// [`residual_into`](Self::residual_into) and [`update`](Self::update) do
/// not allocate.
#[derive(Debug, Clone)]
pub struct KalmanFilter {
    state: Matrix,
    covariance: Matrix,
    gain: Matrix,
    next_state: Matrix,
    next_covariance: Matrix,
    workspace: Workspace,
}

impl KalmanFilter {
    /// Creates a filter from an `n x 1` initial state and an `n x n`
    /// covariance.
    ///
    /// # Errors
    ///
    /// Returns an error if the shapes do not agree.
    pub fn new(state: Matrix, covariance: Matrix) -> Result<Self> {
        let n = require_square("KalmanFilter covariance", &covariance)?;
        require_column("KalmanFilter state", &state, n)?;
        Ok(Self {
            state,
            covariance,
            gain: Matrix::default(),
            next_state: Matrix::default(),
            next_covariance: Matrix::default(),
            workspace: Workspace::default(),
        })
    }

    /// Current state estimate.
    #[must_use]
    pub fn state(&self) -> &Matrix {
        &self.state
    }

    /// Current error covariance.
    #[must_use]
    pub fn covariance(&self) -> &Matrix {
        &self.covariance
    }

    /// Gain computed by the last [`update`](Self::update).
    #[must_use]
    pub fn gain(&self) -> &Matrix {
        &self.gain
    }

    /// Propagates the state with `x = F x` and the covariance with
    /// [`predict_error_covariance`].
    ///
    /// # Errors
    ///
    /// Returns an error if `F` or `Q` do not match the state size.
    pub fn predict(&mut self, f: &Matrix, q: &Matrix) -> Result<()> {
        predict_error_covariance_with(
            &mut self.workspace,
            &mut self.next_covariance,
            f,
            &self.covariance,
            q,
        )?;
        self.next_state.mult(f, &self.state)?;
        std::mem::swap(&mut self.state, &mut self.next_state);
        std::mem::swap(&mut self.covariance, &mut self.next_covariance);
        tracing::trace!(n = self.state.n_rows(), "kalman predict");
        Ok(())
    }

    /// Computes the measurement residual `z - H x` for the current state.
    ///
    /// # Errors
    ///
    /// Returns an error if `H` or `z` do not match the state size.
    pub fn residual(&self, h: &Matrix, z: &Matrix) -> Result<Matrix> {
        let mut residual = Matrix::default();
        self.residual_into(h, z, &mut residual)?;
        Ok(residual)
    }

    /// Writes the measurement residual `z - H x` into `out`.
    ///
    /// # Errors
    ///
    /// Returns an error if `H` or `z` do not match the state size.
    pub fn residual_into(&self, h: &Matrix, z: &Matrix, out: &mut Matrix) -> Result<()> {
        require_column("KalmanFilter residual z", z, h.n_rows())?;
        out.set_from(z);
        out.mult_add_scaled(-1.0, h, &self.state)
    }

    /// Corrects the estimate with a measurement residual.
    ///
    /// `r` holds the measurement noise variances as a column.
    ///
    /// # Errors
    ///
    /// Returns an error on inconsistent shapes or a singular innovation
    /// covariance. State and covariance are left unchanged in that case.
    pub fn update(&mut self, h: &Matrix, r: &Matrix, residual: &Matrix) -> Result<()> {
        let ws = &mut self.workspace;
        compute_kalman_gain_with(ws, &mut self.gain, &self.covariance, h, r)?;
        update_state(&mut self.next_state, &self.state, &self.gain, residual)?;
        update_error_covariance_with(
            ws,
            &mut self.next_covariance,
            &self.gain,
            h,
            &self.covariance,
        )?;
        std::mem::swap(&mut self.state, &mut self.next_state);
        std::mem::swap(&mut self.covariance, &mut self.next_covariance);
        tracing::trace!(
            n = self.state.n_rows(),
            measurements = h.n_rows(),
            "kalman update"
        );
        Ok(())
    }
}

#[cfg(test)]
#[path = "kalman_tests.rs"]
mod tests;
