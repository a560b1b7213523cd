//! Exponential decay with offset: `y = a·e^(b·x) + c`.
//!
//! Parameter order is `[a, b, c]` (amplitude, rate, level).
//!
//! Initial estimate: take the samples at the smallest and largest `x`. The
//! level `c` is placed slightly beyond the far-end value,
//! `c = y_far - 0.1·(y_near - y_far)`, so neither `y - c` below is zero. Then
//! `b` follows from the log-ratio of the two `y - c` values over the `x` span,
//! and `a` is the mean of the amplitudes implied by each end.

use serde::{Deserialize, Serialize};

use crate::error::SignalError;
use crate::models::CurveModel;

/// Fraction of the end-to-end drop the level is placed beyond the far end.
const LEVEL_BIAS: f64 = 0.1;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpDecay;

/// Named view of a solved `[a, b, c]` vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExpDecayParams {
    pub amplitude: f64,
    pub rate: f64,
    pub offset: f64,
}

impl ExpDecayParams {
    pub fn from_slice(params: &[f64]) -> Option<Self> {
        match params {
            [amplitude, rate, offset] => Some(Self {
                amplitude: *amplitude,
                rate: *rate,
                offset: *offset,
            }),
            _ => None,
        }
    }

    pub fn to_vec(self) -> Vec<f64> {
        vec![self.amplitude, self.rate, self.offset]
    }

    /// `-ln 2 / b`: time for the decaying part to halve (negative for growth).
    pub fn half_life(&self) -> f64 {
        -std::f64::consts::LN_2 / self.rate
    }

    pub fn value(&self, x: f64) -> f64 {
        self.amplitude * (self.rate * x).exp() + self.offset
    }
}

impl CurveModel for ExpDecay {
    fn name(&self) -> &'static str {
        "a.e**(b.x) + c"
    }

    fn param_count(&self) -> usize {
        3
    }

    fn value(&self, x: f64, params: &[f64]) -> f64 {
        params[0] * (params[1] * x).exp() + params[2]
    }

    fn fill_jacobian_row(&self, x: f64, params: &[f64], out: &mut [f64]) {
        let fac = (params[1] * x).exp();
        out[0] = fac;
        out[1] = params[0] * fac * x;
        out[2] = 1.0;
    }

    fn initial_estimate(&self, xs: &[f64], ys: &[f64]) -> Result<Vec<f64>, SignalError> {
        if xs.len() != ys.len() {
            return Err(SignalError::LengthMismatch {
                left: xs.len(),
                right: ys.len(),
            });
        }
        let (i_near, i_far) = extreme_indices(xs).ok_or(SignalError::EmptyInput)?;
        let (x_near, x_far) = (xs[i_near], xs[i_far]);
        let (y_near, y_far) = (ys[i_near], ys[i_far]);

        let c = y_far - LEVEL_BIAS * (y_near - y_far);
        let b = ((y_far - c) / (y_near - c)).ln() / (x_far - x_near);
        let a = ((y_far - c) / (b * x_far).exp() + (y_near - c) / (b * x_near).exp()) / 2.0;

        let params = vec![a, b, c];
        if params.iter().all(|p| p.is_finite()) {
            Ok(params)
        } else {
            Err(SignalError::degenerate(format!(
                "no decay estimate from ({x_near}, {y_near}) and ({x_far}, {y_far})"
            )))
        }
    }
}

/// Indices of the first minimum and first maximum of `xs`.
fn extreme_indices(xs: &[f64]) -> Option<(usize, usize)> {
    let first = xs.first()?;
    let mut lo = (0, *first);
    let mut hi = (0, *first);
    for (i, &x) in xs.iter().enumerate().skip(1) {
        if x < lo.1 {
            lo = (i, x);
        }
        if x > hi.1 {
            hi = (i, x);
        }
    }
    Some((lo.0, hi.0))
}
