//! Lorentzian lineshape implementation.
//!
//! The model is implemented as small, pure functions so that fitting/plotting
//! code can stay generic.

pub mod lorentzian;

pub use lorentzian::*;
