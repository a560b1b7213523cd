//! `power-signals` library crate.
//!
//! The binary (`psig`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the numeric modules (`math`, `signal`, `formula`, `fit`) are reusable
//!   from other front-ends

pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod formula;
pub mod io;
pub mod math;
pub mod models;
pub mod report;
pub mod signal;
