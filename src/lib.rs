//! `phonofit` library crate.
//!
//! The binary is a thin shim over this library: the fitting core stays
//! testable without spawning a process, and the modules remain usable from
//! other frontends.

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod plot;
pub mod report;
pub mod tui;
