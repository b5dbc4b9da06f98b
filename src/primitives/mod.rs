//! Core compute primitive: the dense [`Matrix`].

mod matrix;

pub(crate) use matrix::check_block;
pub use matrix::Matrix;
