//! Domain types used throughout the toolkit.
//!
//! This module defines:
//!
//! - sampled data (`Series`, `TimeBase`, `DataSet`)
//! - the name lookup seam (`SeriesSource`)
//! - unit standardization (`UnitStandardizer`)

pub mod types;
pub mod units;

pub use types::*;
pub use units::*;
