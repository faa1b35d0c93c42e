//! Peak fitting orchestration.
//!
//! This layer owns everything between raw spectra and finished peaks: the
//! initial guess for each mode, the per-column Levenberg–Marquardt run, and
//! the reduction of each covariance matrix to a scalar fitting error.

pub mod fitter;

pub use fitter::*;
