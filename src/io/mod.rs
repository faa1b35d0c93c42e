//! File formats the fitter reads and writes.
//!
//! `ingest` loads and validates spectra CSVs, `export` writes the
//! fitted-peak CSV, and `results` round-trips the JSON results document.

pub mod export;
pub mod ingest;
pub mod results;

pub use export::*;
pub use ingest::*;
pub use results::*;
