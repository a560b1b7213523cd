//! The curve-model seam used by the Gauss-Newton solver.
//!
//! The solver relies on three primitive operations:
//! - evaluate `y = f(x; p)` (for residuals and fitted curves)
//! - fill a Jacobian row `∂f/∂p` at `x` (for the normal equations)
//! - produce a starting parameter vector from the data
//!
//! Models implement these as small, pure functions so the solver stays generic.

use crate::error::SignalError;

pub trait CurveModel {
    /// Human-readable formula, e.g. `a·e^(b·x) + c`.
    fn name(&self) -> &'static str;

    /// Length of the parameter vector.
    fn param_count(&self) -> usize;

    /// Model value at `x`.
    fn value(&self, x: f64, params: &[f64]) -> f64;

    /// Fill `out` with the partial derivatives of `value` w.r.t. each parameter.
    ///
    /// `out` has length `param_count()`.
    fn fill_jacobian_row(&self, x: f64, params: &[f64], out: &mut [f64]);

    /// Closed-form starting point for the iteration.
    fn initial_estimate(&self, xs: &[f64], ys: &[f64]) -> Result<Vec<f64>, SignalError>;
}
