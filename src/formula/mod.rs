//! Derived signals from `+`/`-` formulas over named series.

pub mod eval;
pub mod parser;

pub use eval::*;
pub use parser::*;
