//! Reporting utilities: human-readable summaries of each analysis.

pub mod format;

pub use format::*;
