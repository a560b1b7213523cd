//! Gauss-Newton nonlinear least squares.
//!
//! Given samples `(x_i, y_i)` and a [`CurveModel`], starting from the model's
//! closed-form estimate we repeat:
//!
//! - residuals `r_i = y_i - f(x_i; p)`
//! - Jacobian of the residuals `J_i = -∂f/∂p (x_i; p)`
//! - solve `(JᵀJ) step = -Jᵀr` and update `p += step`
//!
//! until `‖step‖ < min_step` or `max_iter` iterations have run. A singular
//! system aborts the fit with `NumericDegeneracy`.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::error::SignalError;
use crate::math::solve_normal_equations;
use crate::models::CurveModel;

pub const MAX_ITER: usize = 20;
pub const MIN_STEP: f64 = 1.0e-9;

/// Solver settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussNewton {
    pub max_iter: usize,
    pub min_step: f64,
}

impl Default for GaussNewton {
    fn default() -> Self {
        Self {
            max_iter: MAX_ITER,
            min_step: MIN_STEP,
        }
    }
}

/// Solved parameters plus convergence diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitOutcome {
    pub params: Vec<f64>,
    pub iterations: usize,
    /// `true` if the last step was shorter than `min_step`.
    pub converged: bool,
    pub last_step: f64,
    pub sse: f64,
    pub rmse: f64,
}

impl GaussNewton {
    pub fn solve<M>(&self, model: &M, xs: &[f64], ys: &[f64]) -> Result<FitOutcome, SignalError>
    where
        M: CurveModel + ?Sized,
    {
        if xs.len() != ys.len() {
            return Err(SignalError::LengthMismatch {
                left: xs.len(),
                right: ys.len(),
            });
        }
        if xs.is_empty() {
            return Err(SignalError::EmptyInput);
        }
        let p = model.param_count();
        let n = xs.len();
        if n < p {
            return Err(SignalError::malformed(format!(
                "{} needs at least {p} samples, got {n}",
                model.name()
            )));
        }
        if xs.iter().chain(ys.iter()).any(|v| !v.is_finite()) {
            return Err(SignalError::malformed("non-finite sample in fit input"));
        }

        let mut params = DVector::from_vec(model.initial_estimate(xs, ys)?);
        log::debug!("{}: initial estimate {:?}", model.name(), params.as_slice());

        let mut jacobian = DMatrix::<f64>::zeros(n, p);
        let mut residuals = DVector::<f64>::zeros(n);
        let mut row = vec![0.0; p];
        let mut iterations = 0;
        let mut last_step = f64::INFINITY;

        while iterations < self.max_iter {
            for i in 0..n {
                model.fill_jacobian_row(xs[i], params.as_slice(), &mut row);
                for j in 0..p {
                    jacobian[(i, j)] = -row[j];
                }
                residuals[i] = ys[i] - model.value(xs[i], params.as_slice());
            }

            let step = solve_normal_equations(&jacobian, &residuals).ok_or_else(|| {
                SignalError::degenerate(format!(
                    "singular normal equations in iteration {}",
                    iterations + 1
                ))
            })?;
            params += &step;
            iterations += 1;
            last_step = step.norm();
            log::debug!("iteration {iterations}: norm step {last_step:e}");

            if !params.iter().all(|v| v.is_finite()) {
                return Err(SignalError::degenerate("fit diverged to non-finite parameters"));
            }
            if last_step < self.min_step {
                break;
            }
        }

        let sse: f64 = xs
            .iter()
            .zip(ys.iter())
            .map(|(&x, &y)| {
                let r = y - model.value(x, params.as_slice());
                r * r
            })
            .sum();

        Ok(FitOutcome {
            params: params.iter().copied().collect(),
            iterations,
            converged: last_step < self.min_step,
            last_step,
            sse,
            rmse: (sse / n as f64).sqrt(),
        })
    }
}
