//! Data sources.
//!
//! - synthetic spectra generation (`sample`)

pub mod sample;

pub use sample::*;
