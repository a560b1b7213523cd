//! Signal processing over gap-ridden series.
//!
//! - gap filling (`gapfill`)
//! - normalized cross-correlation (`xcorr`)
//! - symmetry-based peak localization (`peak`)
//! - shift estimation and fractional shifting (`shift`)
//! - energy totals (`energy`)

pub mod energy;
pub mod gapfill;
pub mod peak;
pub mod shift;
pub mod xcorr;

pub use energy::*;
pub use gapfill::{fix, fix_values, zero_fill};
pub use peak::*;
pub use shift::*;
pub use xcorr::*;
