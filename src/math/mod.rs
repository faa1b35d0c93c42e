//! Mathematical utilities: nonlinear least squares.

pub mod levmar;

pub use levmar::*;
