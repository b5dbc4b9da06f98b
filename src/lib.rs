//! Matrixlib: dense row-major matrix kernels in pure Rust.
//!
//! Matrixlib targets real-time estimation and control code that multiplies,
//! solves and projects small-to-medium dense matrices in a tight loop. Every
//! operation writes into a caller-owned [`Matrix`] and reshapes it without
//! giving up its buffer. Plain products write straight into that buffer.
//! [`kalman::KalmanFilter`] and [`nullspace::NullspaceProjector`] also keep
//! their intermediates and factorizations, so a loop of fixed size does not
//! allocate after its first pass. Quadratic forms and the one-shot solvers
//! in [`ops`] use temporaries.
//!
//! # Quick Start
//!
//! ```
//! use matrixlib::prelude::*;
//!
//! let a = Matrix::from_rows(&[vec![4.0, 1.0], vec![1.0, 3.0]]).unwrap();
//! let b = Matrix::column_vector(&[1.0, 2.0]);
//!
//! let mut x = Matrix::default();
//! x.solve(&a, &b).unwrap();
//!
//! let mut check = Matrix::default();
//! check.mult(&a, &x).unwrap();
//! assert!(check.is_approx(&b, 1e-12));
//! ```
//!
//! # Modules
//!
//! - [`primitives`]: The [`Matrix`] type with in-place products, block
//!   operations and solvers
//! - [`linalg`]: LU, full-pivot LU, Cholesky and Householder QR factorizations
//! - [`ops`]: Common operations as free functions (robust and damped solves,
//!   nullspace projection)
//! - [`kalman`]: Kalman filter kernels and a small filter driver
//! - [`nullspace`]: Damped nullspace projector with a reusable workspace
//! - [`diagonal`]: Products with diagonal matrices
//! - [`tools`]: Row, column, block and 3D helpers on matrices
//! - [`config`]: Solver tolerances loaded from code or TOML
//! - [`testing`]: Assertions and random generators for tests

pub mod config;
pub mod diagonal;
pub mod error;
pub mod kalman;
pub mod linalg;
pub mod nullspace;
pub mod ops;
pub mod prelude;
pub mod primitives;
pub mod testing;
pub mod tools;

pub use config::SolverConfig;
pub use error::{MatrixError, Result};
pub use primitives::Matrix;
