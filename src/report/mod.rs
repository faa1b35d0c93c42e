//! Terminal reporting.
//!
//! Covers the per-peak report blocks in the fixed layout consumers expect,
//! the run summary with dataset stats and fitted/skipped counts, and the
//! width annotation stamped onto figures.

pub mod format;

pub use format::*;
