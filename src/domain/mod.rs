//! Core data types shared by every stage of the fitter.
//!
//! Home of the Lorentzian parameter set (`PeakParams`), the per-mode fit
//! outputs (`PeakFit`, `SpectrumAnalysis`), and the dataset container and
//! run configuration (`SpectrumData`, `FitConfig`).

pub mod types;

pub use types::*;
