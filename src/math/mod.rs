//! Mathematical utilities: index lookup, golden-section search and the
//! Gauss-Newton normal equations.

pub mod golden;
pub mod normal_eq;
pub mod search;

pub use golden::*;
pub use normal_eq::*;
pub use search::*;
