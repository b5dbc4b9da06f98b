//! Convenience re-exports for common usage.
//!
//! # Usage
//!
//! ```
//! use matrixlib::prelude::*;
//! ```

pub use crate::config::SolverConfig;
pub use crate::diagonal::Diagonal;
pub use crate::error::{MatrixError, Result};
pub use crate::kalman::KalmanFilter;
pub use crate::linalg::{Cholesky, FullPivLu, HouseholderQr, Lu};
pub use crate::nullspace::NullspaceProjector;
pub use crate::primitives::Matrix;
