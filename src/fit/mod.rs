//! Nonlinear curve fitting.
//!
//! Responsibilities:
//!
//! - iterate Gauss-Newton steps for any `CurveModel`
//! - fit exponential decays over a time window of a data set

pub mod decay;
pub mod gauss_newton;

pub use decay::*;
pub use gauss_newton::*;
