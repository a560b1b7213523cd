//! Curve models for nonlinear fitting.
//!
//! Models are implemented as small, pure functions behind the `CurveModel`
//! trait so that the solver can stay generic.

pub mod exp_decay;
pub mod model;

pub use exp_decay::*;
pub use model::*;
