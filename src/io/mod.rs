//! Input/output helpers.
//!
//! - CSV data-set ingest (`ingest`)
//! - JSON reports and CSV series exports (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
